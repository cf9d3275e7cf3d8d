use anyhow::{Context, Result};
use clap::Parser;
use fs_err as fs;
use serde::de::DeserializeOwned;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;
use uuid::Uuid;

mod cli;
mod config;
mod errors;
mod generator;
mod log;
mod merge;
mod normalize;
mod prompt;
mod provider;
mod schema;
mod ux;
mod wire;

use cli::Command;
use errors::AppGenError;
use generator::{ConfigSource, Generator};
use schema::{AppConfig, APP_CONFIG};
use wire::{GenerationRequest, ModificationRequest, StoreContext, StoreSnapshot};

/// Read a request file; `.yaml`/`.yml` go through serde_yaml, anything else is JSON.
fn load_request<T: DeserializeOwned>(path: &str) -> Result<T> {
    let text = fs::read_to_string(path)?;
    let is_yaml = Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));
    if is_yaml {
        serde_yaml::from_str(&text).with_context(|| format!("parsing YAML request {path}"))
    } else {
        serde_json::from_str(&text).with_context(|| format!("parsing JSON request {path}"))
    }
}

fn load_store(path: Option<&str>) -> Result<Option<StoreContext>> {
    let Some(path) = path else { return Ok(None) };
    let snapshot: StoreSnapshot = load_request(path)?;
    Ok(Some(StoreContext::from_snapshot(&snapshot)))
}

/// Print to stdout, or write atomically to `out` via a sibling temp file.
fn emit(value: &impl serde::Serialize, out: Option<&str>) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    let Some(out) = out else {
        println!("{text}");
        return Ok(());
    };
    let target = Path::new(out);
    let dir = target
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).with_context(|| format!("creating temp file in {}", dir.display()))?;
    tmp.write_all(text.as_bytes())?;
    tmp.write_all(b"\n")?;
    tmp.persist(target).with_context(|| format!("writing {out}"))?;
    eprintln!("config written to {out}");
    Ok(())
}

/// What the modify stage would have sent, for logging a timed-out attempt.
fn modify_timeout_transcript(req: &ModificationRequest, cfg: &config::Config) -> generator::Transcript {
    let baseline = merge::repair(&req.current_config);
    generator::Transcript {
        prompt: prompt::modification_prompt(req, &baseline, &cfg.prompt_limits()),
        raw: None,
    }
}

fn save_artifacts(
    enabled: bool,
    debug: bool,
    stage: &str,
    transcript: &generator::Transcript,
    config: Option<&AppConfig>,
    tx: Uuid,
    cfg: &config::Config,
) -> Result<()> {
    if !enabled {
        return Ok(());
    }
    let saved = log::save_stage(stage, transcript, config, tx, cfg)?;
    if debug {
        log::print_saved_paths(stage, &saved);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();
    log::init_tracing(args.debug);

    let mut cfg = config::Config::load(args.config.as_deref().map(Path::new))?;
    if let Some(p) = args.provider {
        cfg.provider = p;
    }
    if let Some(m) = &args.model {
        cfg.model = m.clone();
    }
    if let Some(t) = args.timeout_secs {
        cfg.timeout_secs = t;
    }
    cfg.save_artifacts |= args.save_artifacts;

    let txid = Uuid::new_v4();
    let timeout = Duration::from_secs(cfg.timeout_secs.max(1));

    match &args.command {
        Command::Schema => emit(&APP_CONFIG.response_schema(), args.out.as_deref()),

        Command::Defaults { app_name, primary_color } => {
            emit(&generator::fallback_config(app_name, primary_color), args.out.as_deref())
        }

        Command::Generate { request, store } => {
            let mut req: GenerationRequest = load_request(request)?;
            if let Some(ctx) = load_store(store.as_deref())? {
                req.store_context = Some(ctx);
            }
            let pipeline = Generator::new(provider::make_provider(&cfg)?, cfg.prompt_limits(), cfg.constrained_output);

            let pb = ux::spinner(args.progress, "generating app config");
            let out = match tokio::time::timeout(timeout, pipeline.generate(&req)).await {
                Ok(out) => out,
                Err(_) => {
                    let e = AppGenError::ModelUnavailable(format!(
                        "{}: no response within {}s",
                        pipeline.provider_name(),
                        timeout.as_secs()
                    ));
                    tracing::warn!(error = %e, "generation timed out; using fallback config");
                    generator::Generated {
                        config: generator::fallback_config(&req.app_name, &req.primary_color),
                        source: ConfigSource::Fallback(e),
                        transcript: generator::Transcript {
                            prompt: prompt::generation_prompt(&req, &cfg.prompt_limits()),
                            raw: None,
                        },
                    }
                }
            };
            pb.finish_and_clear();

            save_artifacts(cfg.save_artifacts, args.debug, "generate", &out.transcript, Some(&out.config), txid, &cfg)?;
            ux::print_config_summary(&out.config, Some(&out.source));
            emit(&out.config, args.out.as_deref())
        }

        Command::Modify { request, store } => {
            let mut req: ModificationRequest = load_request(request)?;
            if let Some(ctx) = load_store(store.as_deref())? {
                req.store_context = Some(ctx);
            }
            let pipeline = Generator::new(provider::make_provider(&cfg)?, cfg.prompt_limits(), cfg.constrained_output);

            let pb = ux::spinner(args.progress, "modifying app config");
            let (transcript, result) = match tokio::time::timeout(timeout, pipeline.modify(&req)).await {
                Ok(r) => r,
                Err(_) => {
                    let e = AppGenError::ModelUnavailable(format!(
                        "{}: no response within {}s",
                        pipeline.provider_name(),
                        timeout.as_secs()
                    ));
                    tracing::error!(error = %e, "modification timed out");
                    (modify_timeout_transcript(&req, &cfg), Err(e))
                }
            };
            pb.finish_and_clear();

            save_artifacts(cfg.save_artifacts, args.debug, "modify", &transcript, result.as_ref().ok(), txid, &cfg)?;
            let config = result.context("modification failed; current config left unchanged")?;
            ux::print_config_summary(&config, None);
            emit(&config, args.out.as_deref())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_json_and_yaml_requests() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("req.json");
        fs::write(&json_path, r#"{"prompt":"clothing store","appName":"Acme"}"#).unwrap();
        let yaml_path = dir.path().join("req.yaml");
        fs::write(&yaml_path, "prompt: clothing store\nappName: Acme\nprimaryColor: \"#112233\"\n").unwrap();

        let a: GenerationRequest = load_request(json_path.to_str().unwrap()).unwrap();
        let b: GenerationRequest = load_request(yaml_path.to_str().unwrap()).unwrap();
        assert_eq!(a.app_name, "Acme");
        assert_eq!(a.primary_color, "#4F46E5");
        assert_eq!(b.primary_color, "#112233");
    }

    #[test]
    fn timed_out_modification_still_records_prompt() {
        let req = ModificationRequest {
            current_config: serde_json::to_value(generator::fallback_config("Acme", "#112233")).unwrap(),
            modification_prompt: "dark theme".into(),
            store_context: None,
        };
        let t = modify_timeout_transcript(&req, &config::Config::default());
        assert!(t.prompt.contains("\"dark theme\""));
        assert!(t.prompt.contains("\"Welcome to Acme\""));
        assert!(t.raw.is_none());
    }

    #[test]
    fn bad_request_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_request::<GenerationRequest>(path.to_str().unwrap()).unwrap_err();
        assert!(format!("{err:#}").contains("broken.json"));
    }

    #[test]
    fn emit_writes_target_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("app.json");
        let cfg = generator::fallback_config("Acme", "#112233");
        emit(&cfg, out.to_str()).unwrap();
        let back: AppConfig = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(back, cfg);
    }
}
