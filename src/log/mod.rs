use crate::config::Config;
use crate::generator::Transcript;
use crate::schema::AppConfig;
use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Install the global subscriber. `RUST_LOG` wins; otherwise `info`, or
/// `debug` for this crate when `debug` is set.
pub fn init_tracing(debug: bool) {
    let fallback = if debug { "appgen=debug,info" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub prompt: PathBuf,
    pub raw: Option<PathBuf>,
    pub config: Option<PathBuf>,
}

fn tx_dir(root: &Path, tx: Uuid) -> PathBuf {
    root.join("tx").join(tx.to_string())
}

/// Persist one pipeline stage under `<artifacts_dir>/tx/<tx>/`. The raw
/// model text and the resulting config are written only when present.
pub fn save_stage(
    stage: &str,
    transcript: &Transcript,
    config: Option<&AppConfig>,
    tx: Uuid,
    cfg: &Config,
) -> anyhow::Result<SavedPaths> {
    let dir = tx_dir(Path::new(&cfg.artifacts_dir), tx);
    fs::create_dir_all(&dir)?;

    let prompt_path = dir.join(format!("{stage}.prompt.txt"));
    fs::write(&prompt_path, &transcript.prompt)?;

    let mut raw_path = None;
    if let Some(raw) = &transcript.raw {
        let p = dir.join(format!("{stage}.raw.txt"));
        fs::write(&p, raw)?;
        raw_path = Some(p);
    }

    let mut config_path = None;
    if let Some(c) = config {
        let p = dir.join(format!("{stage}.config.json"));
        fs::write(&p, to_string_pretty(c)?)?;
        config_path = Some(p);
    }

    let manifest = json!({
        "tx": tx,
        "stage": stage,
        "savedAt": Utc::now(),
        "provider": cfg.provider,
        "model": cfg.model,
        "preview": config.map(AppConfig::preview_summary),
    });
    fs::write(dir.join(format!("{stage}.manifest.json")), to_string_pretty(&manifest)?)?;

    Ok(SavedPaths { dir, prompt: prompt_path, raw: raw_path, config: config_path })
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    eprintln!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    eprintln!("debug[{stage}]: prompt saved at: {}", saved.prompt.display());
    match &saved.raw {
        Some(p) => eprintln!("debug[{stage}]: raw response saved at: {}", p.display()),
        None => eprintln!("debug[{stage}]: no raw response (model not reached)"),
    }
    match &saved.config {
        Some(p) => eprintln!("debug[{stage}]: config saved at: {}", p.display()),
        None => eprintln!("debug[{stage}]: no config produced"),
    }
}
