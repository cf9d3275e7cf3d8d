//! Entry points that chain prompt building, the model call, normalization
//! and reconciliation.
//!
//! Generation never fails: any model or parse error yields the fallback
//! config. Modification has no fallback and reports the error, leaving the
//! caller's current config untouched.

use tracing::{error, info, warn};

use crate::errors::AppGenError;
use crate::merge;
use crate::normalize::normalize;
use crate::prompt::{self, PromptLimits};
use crate::provider::DynProvider;
use crate::schema::{AppConfig, APP_CONFIG};
use crate::wire::{GenerationRequest, ModelRequest, ModificationRequest};

/// Deterministic config built from the request identity alone.
pub fn fallback_config(app_name: &str, primary_color: &str) -> AppConfig {
    AppConfig::defaults(app_name, primary_color)
}

/// Where a generated config came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Model,
    Fallback(AppGenError),
}

/// What was sent to and received from the model, for artifact logging.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    pub prompt: String,
    pub raw: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub config: AppConfig,
    pub source: ConfigSource,
    pub transcript: Transcript,
}

pub struct Generator {
    provider: DynProvider,
    limits: PromptLimits,
    constrained_output: bool,
}

impl Generator {
    pub fn new(provider: DynProvider, limits: PromptLimits, constrained_output: bool) -> Self {
        Self { provider, limits, constrained_output }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Prompt → model → normalize. Records the raw reply in `transcript`.
    async fn invoke(&self, transcript: &mut Transcript) -> Result<serde_json::Value, AppGenError> {
        let response_schema = (self.constrained_output && self.provider.supports_response_schema())
            .then(|| APP_CONFIG.response_schema());
        let req = ModelRequest { prompt: transcript.prompt.clone(), response_schema };
        let raw = self.provider.send(&req).await?;
        transcript.raw = Some(raw);
        normalize(transcript.raw.as_deref().unwrap_or_default())
    }

    pub async fn generate(&self, req: &GenerationRequest) -> Generated {
        let baseline = fallback_config(&req.app_name, &req.primary_color);
        let mut transcript = Transcript {
            prompt: prompt::generation_prompt(req, &self.limits),
            raw: None,
        };
        info!(
            app_name = %req.app_name,
            provider = self.provider.name(),
            store = req.store_context.is_some(),
            "generating app config"
        );

        match self.invoke(&mut transcript).await {
            Ok(candidate) => {
                let config = merge::reconcile(&candidate, &baseline);
                info!(app_name = %config.app_name, "app config generated");
                Generated { config, source: ConfigSource::Model, transcript }
            }
            Err(e) => {
                warn!(
                    error = %e,
                    raw_len = e.raw_output().map(str::len),
                    "generation failed; using fallback config"
                );
                Generated { config: baseline, source: ConfigSource::Fallback(e), transcript }
            }
        }
    }

    /// Apply a modification. The transcript is returned alongside the
    /// result so failed attempts can still be logged.
    pub async fn modify(
        &self,
        req: &ModificationRequest,
    ) -> (Transcript, Result<AppConfig, AppGenError>) {
        if req.modification_prompt.trim().is_empty() {
            let e = AppGenError::ModificationFailed("modification prompt is required".into());
            return (Transcript::default(), Err(e));
        }

        let baseline = merge::repair(&req.current_config);
        let mut transcript = Transcript {
            prompt: prompt::modification_prompt(req, &baseline, &self.limits),
            raw: None,
        };
        info!(
            app_name = %baseline.app_name,
            provider = self.provider.name(),
            "modifying app config"
        );

        let result = match self.invoke(&mut transcript).await {
            Ok(candidate) => Ok(merge::reconcile(&candidate, &baseline)),
            Err(e) => {
                error!(error = %e, "modification failed; current config left unchanged");
                Err(e)
            }
        };
        (transcript, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    enum Reply {
        Text(&'static str),
        Fail,
    }

    #[derive(Clone)]
    struct StubProvider {
        reply: Reply,
        schema_support: bool,
        calls: Arc<AtomicUsize>,
        last: Arc<Mutex<Option<ModelRequest>>>,
    }

    impl StubProvider {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                schema_support: true,
                calls: Arc::new(AtomicUsize::new(0)),
                last: Arc::new(Mutex::new(None)),
            }
        }
    }

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            "stub"
        }

        fn supports_response_schema(&self) -> bool {
            self.schema_support
        }

        async fn send(&self, req: &ModelRequest) -> Result<String, AppGenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(req.clone());
            match self.reply {
                Reply::Text(t) => Ok(t.to_string()),
                Reply::Fail => Err(AppGenError::ModelUnavailable("stub: connection refused".into())),
            }
        }
    }

    fn generator(stub: &StubProvider) -> Generator {
        Generator::new(Box::new(stub.clone()), PromptLimits::default(), true)
    }

    fn acme_request() -> GenerationRequest {
        GenerationRequest {
            prompt: "clothing store".into(),
            app_name: "Acme".into(),
            primary_color: "#112233".into(),
            store_context: None,
        }
    }

    #[tokio::test]
    async fn failing_model_yields_fallback() {
        let stub = StubProvider::new(Reply::Fail);
        let out = generator(&stub).generate(&acme_request()).await;

        assert!(matches!(out.source, ConfigSource::Fallback(AppGenError::ModelUnavailable(_))));
        assert_eq!(out.config.app_name, "Acme");
        assert_eq!(out.config.primary_color, "#112233");
        assert_eq!(out.config.navigation.tabs.len(), 4);
        assert!(out.config.preview_data.featured_products.len() >= 4);
        assert!(out.transcript.raw.is_none());
    }

    #[tokio::test]
    async fn malformed_output_yields_fallback_with_raw_text() {
        let stub = StubProvider::new(Reply::Text("Sorry, I can't do JSON today."));
        let out = generator(&stub).generate(&acme_request()).await;

        match &out.source {
            ConfigSource::Fallback(e) => assert_eq!(e.raw_output(), Some("Sorry, I can't do JSON today.")),
            other => panic!("expected fallback, got {other:?}"),
        }
        assert_eq!(out.config, fallback_config("Acme", "#112233"));
        assert_eq!(out.transcript.raw.as_deref(), Some("Sorry, I can't do JSON today."));
    }

    #[test]
    fn fallback_is_deterministic() {
        let a = serde_json::to_string(&fallback_config("Acme", "#112233")).unwrap();
        let b = serde_json::to_string(&fallback_config("Acme", "#112233")).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn fenced_partial_output_is_merged_over_defaults() {
        let stub = StubProvider::new(Reply::Text(
            "```json\n{\"appName\": \"Acme Trails\", \"features\": {\"socialSharing\": true, \"reviews\": false}, \"layout\": {\"productDisplay\": {\"gridColumns\": 3}}}\n```",
        ));
        let out = generator(&stub).generate(&acme_request()).await;

        assert_eq!(out.source, ConfigSource::Model);
        assert_eq!(out.config.app_name, "Acme Trails");
        assert!(out.config.features.social_sharing);
        assert!(!out.config.features.reviews);
        assert_eq!(out.config.layout.product_display.grid_columns, 3);
        assert_eq!(out.config.layout.hero_section.title, "Welcome to Acme");
    }

    #[tokio::test]
    async fn response_schema_sent_only_when_supported() {
        let stub = StubProvider::new(Reply::Text("{}"));
        generator(&stub).generate(&acme_request()).await;
        let sent = stub.last.lock().unwrap().clone().unwrap();
        assert!(sent.response_schema.is_some());
        assert!(sent.prompt.contains("User Description: \"clothing store\""));

        let mut plain = StubProvider::new(Reply::Text("{}"));
        plain.schema_support = false;
        generator(&plain).generate(&acme_request()).await;
        assert!(plain.last.lock().unwrap().clone().unwrap().response_schema.is_none());
    }

    fn modification(prompt: &str) -> ModificationRequest {
        let mut current = fallback_config("Acme", "#112233");
        current.features.social_sharing = false;
        current.layout.hero_section.title = "Gear up".into();
        modification_of(&current, prompt)
    }

    fn modification_of(current: &AppConfig, prompt: &str) -> ModificationRequest {
        ModificationRequest {
            current_config: serde_json::to_value(current).unwrap(),
            modification_prompt: prompt.into(),
            store_context: None,
        }
    }

    #[tokio::test]
    async fn modification_preserves_omitted_groups() {
        let stub = StubProvider::new(Reply::Text(
            r#"{"layout": {"heroSection": {"backgroundType": "color"}}}"#,
        ));
        let out = generator(&stub).modify(&modification("use a solid hero")).await.1.unwrap();

        assert!(!out.features.social_sharing);
        assert_eq!(out.layout.hero_section.title, "Gear up");
        assert_eq!(out.layout.hero_section.background_type, crate::schema::BackgroundType::Color);
    }

    #[tokio::test]
    async fn modification_surfaces_model_errors() {
        let stub = StubProvider::new(Reply::Fail);
        let err = generator(&stub).modify(&modification("dark theme")).await.1.unwrap_err();
        assert!(matches!(err, AppGenError::ModelUnavailable(_)));

        let stub = StubProvider::new(Reply::Text("no json here"));
        let (transcript, result) = generator(&stub).modify(&modification("dark theme")).await;
        assert!(matches!(result, Err(AppGenError::MalformedModelOutput { .. })));
        assert_eq!(transcript.raw.as_deref(), Some("no json here"));
    }

    #[tokio::test]
    async fn blank_modification_prompt_is_rejected_before_calling_model() {
        let stub = StubProvider::new(Reply::Text("{}"));
        let (transcript, result) = generator(&stub).modify(&modification("   ")).await;
        assert!(matches!(result, Err(AppGenError::ModificationFailed(_))));
        assert!(transcript.prompt.is_empty());
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unrelated_blank_field_survives_modification() {
        let mut current = fallback_config("Acme", "#112233");
        current.layout.hero_section.subtitle = String::new();
        let stub = StubProvider::new(Reply::Text(r#"{"features": {"reviews": false}}"#));

        let out = generator(&stub).modify(&modification_of(&current, "turn off reviews")).await.1.unwrap();

        assert!(!out.features.reviews);
        assert_eq!(out.layout.hero_section.subtitle, "");
    }

    #[tokio::test]
    async fn model_can_clear_a_text_field() {
        let mut current = fallback_config("Acme", "#112233");
        current.layout.hero_section.subtitle = "Shop now".into();
        let stub = StubProvider::new(Reply::Text(r#"{"layout": {"heroSection": {"subtitle": ""}}}"#));

        let out = generator(&stub).modify(&modification_of(&current, "remove the subtitle")).await.1.unwrap();

        assert_eq!(out.layout.hero_section.subtitle, "");
        assert_eq!(out.layout.hero_section.title, "Welcome to Acme");
    }

    #[tokio::test]
    async fn partial_stored_config_is_repaired_before_modifying() {
        let stub = StubProvider::new(Reply::Text(r#"{"features": {"wishlist": false}}"#));
        let req = ModificationRequest {
            current_config: serde_json::json!({
                "appName": "Acme",
                "primaryColor": "#112233",
                "layout": { "productDisplay": { "gridColumns": 0 } }
            }),
            modification_prompt: "hide the wishlist".into(),
            store_context: None,
        };

        let out = generator(&stub).modify(&req).await.1.unwrap();

        assert!(!out.features.wishlist);
        assert_eq!(out.layout.product_display.grid_columns, 2);
        assert_eq!(out.navigation.tabs.len(), 4);
        assert_eq!(out.primary_color, "#112233");
    }
}
