use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(ValueEnum, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google")]
    Gemini,
    #[value(name = "openai", alias = "open-ai")]
    OpenAI,
}

#[derive(Parser, Debug)]
#[command(name = "appgen", version, about = "Generate and modify mobile storefront app configs with an LLM")]
pub struct Args {
    /// TOML config file; flags below override it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderKind>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Write the resulting config here instead of stdout.
    #[arg(long, global = true)]
    pub out: Option<String>,

    #[arg(long, default_value_t = false, global = true)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a fresh config from a generation request (JSON or YAML).
    Generate {
        #[arg(long)]
        request: String,
        /// Persisted store snapshot (JSON); overrides the request's storeContext.
        #[arg(long)]
        store: Option<String>,
    },
    /// Apply a modification request to an existing config.
    Modify {
        #[arg(long)]
        request: String,
        #[arg(long)]
        store: Option<String>,
    },
    /// Print the fallback config for a name and color.
    Defaults {
        #[arg(long)]
        app_name: String,
        #[arg(long, default_value = "#4F46E5")]
        primary_color: String,
    },
    /// Print the response schema sent for constrained decoding.
    Schema,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_generate_with_global_flags() {
        let args = Args::try_parse_from([
            "appgen", "generate", "--request", "req.json", "--provider", "openai", "--debug",
        ])
        .unwrap();
        assert!(matches!(args.provider, Some(ProviderKind::OpenAI)));
        assert!(args.debug);
        match args.command {
            Command::Generate { request, store } => {
                assert_eq!(request, "req.json");
                assert!(store.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn defaults_color_has_default() {
        let args = Args::try_parse_from(["appgen", "defaults", "--app-name", "Acme"]).unwrap();
        match args.command {
            Command::Defaults { app_name, primary_color } => {
                assert_eq!(app_name, "Acme");
                assert_eq!(primary_color, "#4F46E5");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
