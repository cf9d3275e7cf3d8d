use anyhow::{Context, Result};
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::ProviderKind;
use crate::prompt::PromptLimits;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    /// Override for the provider's API base URL.
    pub api_base: Option<String>,
    pub temperature: f32,
    /// Ask the model for schema-constrained JSON when the provider supports it.
    pub constrained_output: bool,
    pub timeout_secs: u64,
    pub max_sample_products: usize,
    pub max_sample_collections: usize,
    pub artifacts_dir: String,
    pub save_artifacts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini,
            model: "gemini-1.5-flash".into(),
            api_base: None,
            temperature: 0.4,
            constrained_output: true,
            timeout_secs: 120,
            max_sample_products: 10,
            max_sample_collections: 10,
            artifacts_dir: ".appgen".into(),
            save_artifacts: false,
        }
    }
}

impl Config {
    /// Defaults, overlaid with the TOML file at `path` when one is given.
    /// API keys are never read from here; providers take them from the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)?;
        let cfg: Config = toml::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn prompt_limits(&self) -> PromptLimits {
        PromptLimits {
            max_products: self.max_sample_products,
            max_collections: self.max_sample_collections,
        }
    }
}
