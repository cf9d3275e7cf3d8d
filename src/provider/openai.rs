use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{finish, non_empty_env, unavailable, Provider};
use crate::errors::AppGenError;
use crate::wire::ModelRequest;

const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions backend. The prompt goes out as a
/// single user message; JSON mode is requested but no schema is sent.
pub struct OpenAIProvider {
    model: String,
    api_base: String,
    temperature: f32,
    client: Client,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

impl OpenAIProvider {
    pub fn new(model: String, api_base: Option<String>, temperature: f32) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("appgen/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building openai http client")?;
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

    async fn call(&self, req: &ModelRequest) -> Result<Option<String>> {
        let api_key = non_empty_env("OPENAI_API_KEY")
            .ok_or_else(|| anyhow!("OPENAI_API_KEY env var is not set"))?;

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": req.prompt }],
            "temperature": self.temperature,
            "response_format": { "type": "json_object" }
        });

        let url = format!("{}/chat/completions", self.api_base);
        tracing::debug!(%url, "POST chat completions");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("openai request failed")?;

        let status = resp.status();
        let text = resp.text().await.context("openai read body failed")?;
        if !status.is_success() {
            bail!("OpenAI API error ({status}): {text}");
        }
        parse_content(&text)
    }
}

fn parse_content(body: &str) -> Result<Option<String>> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| anyhow!("failed to parse OpenAI response: {e}"))?;
    Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content))
}

#[async_trait]
impl Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn supports_response_schema(&self) -> bool {
        false
    }

    async fn send(&self, req: &ModelRequest) -> Result<String, AppGenError> {
        let text = self
            .call(req)
            .await
            .map_err(|e| unavailable(self.name(), format!("{e:#}")))?;
        finish(self.name(), text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_first_choice_content() {
        let body = r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"appName\":\"X\"}"}}]}"#;
        assert_eq!(parse_content(body).unwrap().as_deref(), Some("{\"appName\":\"X\"}"));
    }

    #[test]
    fn missing_content_is_none_and_garbage_is_error() {
        assert_eq!(parse_content(r#"{"choices":[]}"#).unwrap(), None);
        assert_eq!(
            parse_content(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap(),
            None
        );
        assert!(parse_content("<html>bad gateway</html>").is_err());
    }
}
