use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{finish, non_empty_env, unavailable, Provider};
use crate::errors::AppGenError;
use crate::wire::ModelRequest;

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    model: String,
    api_base: String,
    temperature: f32,
    client: Client,
}

impl GeminiProvider {
    pub fn new(model: String, api_base: Option<String>, temperature: f32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("appgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building gemini http client")?;
        Ok(Self {
            model,
            api_base: api_base
                .map(|b| b.trim().trim_end_matches('/').to_string())
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            temperature,
            client,
        })
    }

    fn api_key() -> Option<String> {
        non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }

    fn endpoint(&self) -> String {
        let model = self.model.trim();
        let model_path = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }

    fn body(&self, req: &ModelRequest) -> Value {
        let mut generation_config = json!({ "temperature": self.temperature });
        if let Some(schema) = &req.response_schema {
            generation_config["responseMimeType"] = json!("application/json");
            generation_config["responseSchema"] = schema.clone();
        }
        json!({
            "contents": [{ "role": "user", "parts": [{ "text": req.prompt }] }],
            "generationConfig": generation_config,
        })
    }

    async fn call(&self, req: &ModelRequest) -> Result<Option<String>> {
        let api_key = Self::api_key().ok_or_else(|| anyhow!("GEMINI_API_KEY or GOOGLE_API_KEY not set"))?;
        let url = self.endpoint();
        tracing::debug!(%url, constrained = req.response_schema.is_some(), "POST generateContent");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&self.body(req))
            .send()
            .await
            .context("gemini request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("gemini read body failed")?;
        if !status.is_success() {
            bail!("gemini API error ({status}): {text}");
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| anyhow!("gemini response parse error: {e}"))?;
        if let Some(reason) = payload
            .pointer("/promptFeedback/blockReason")
            .and_then(Value::as_str)
        {
            bail!("prompt blocked by gemini: {reason}");
        }
        Ok(extract_text(&payload))
    }
}

/// Concatenated text parts of the first candidate.
pub(crate) fn extract_text(payload: &Value) -> Option<String> {
    let parts = payload
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
        .collect();
    Some(text)
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn supports_response_schema(&self) -> bool {
        true
    }

    async fn send(&self, req: &ModelRequest) -> Result<String, AppGenError> {
        let text = self
            .call(req)
            .await
            .map_err(|e| unavailable(self.name(), format!("{e:#}")))?;
        finish(self.name(), text)
    }
}
