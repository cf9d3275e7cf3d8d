use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Display;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::AppGenError;
use crate::wire::ModelRequest;

pub mod gemini;
pub mod openai;

/// A generative model backend. Any failure, including an empty reply, is
/// reported as [`AppGenError::ModelUnavailable`]; nothing is retried here.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `ModelRequest::response_schema` is honored.
    fn supports_response_schema(&self) -> bool;

    async fn send(&self, req: &ModelRequest) -> Result<String, AppGenError>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> Result<DynProvider> {
    match cfg.provider {
        ProviderKind::Gemini => Ok(Box::new(gemini::GeminiProvider::new(
            cfg.model.clone(),
            cfg.api_base.clone(),
            cfg.temperature,
        )?)),
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            cfg.api_base.clone(),
            cfg.temperature,
        )?)),
    }
}

pub(crate) fn unavailable(provider: &str, e: impl Display) -> AppGenError {
    AppGenError::ModelUnavailable(format!("{provider}: {e}"))
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Shared tail of every backend: empty text is an outage, anything else is
/// logged and handed back untouched.
pub(crate) fn finish(provider: &str, text: Option<String>) -> Result<String, AppGenError> {
    match text {
        Some(t) if !t.trim().is_empty() => {
            tracing::debug!(provider, raw = %t, "raw model response");
            Ok(t)
        }
        _ => Err(unavailable(provider, "empty response from model")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_rejects_blank_text() {
        assert!(matches!(finish("gemini", None), Err(AppGenError::ModelUnavailable(_))));
        assert!(matches!(
            finish("gemini", Some("  \n".into())),
            Err(AppGenError::ModelUnavailable(_))
        ));
        assert_eq!(finish("gemini", Some("{}".into())).unwrap(), "{}");
    }

    #[test]
    fn make_provider_follows_config() {
        let mut cfg = Config::default();
        assert_eq!(make_provider(&cfg).unwrap().name(), "gemini");
        cfg.provider = ProviderKind::OpenAI;
        let p = make_provider(&cfg).unwrap();
        assert_eq!(p.name(), "openai");
        assert!(!p.supports_response_schema());
    }
}
