use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::generator::ConfigSource;
use crate::schema::AppConfig;

/// Spinner on stderr while the model call is in flight. Hidden unless
/// `enabled`, so callers can hold one unconditionally.
pub fn spinner(enabled: bool, msg: &'static str) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg} ({elapsed})") {
        pb.set_style(style);
    }
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn on_off(v: bool) -> colored::ColoredString {
    if v { "on".green() } else { "off".dimmed() }
}

/// Compact summary of a produced config, printed to stderr so stdout stays
/// machine-readable.
pub fn print_config_summary(cfg: &AppConfig, source: Option<&ConfigSource>) {
    eprintln!(
        "\n{}",
        "┏━━━━━━━━━━━━━━━━━━━━━━━━ App Config ━━━━━━━━━━━━━━━━━━━━━━━━┓".bold()
    );
    eprintln!("  {}: {}   {}: {}", "App".bold(), cfg.app_name, "Color".bold(), cfg.primary_color);
    let tabs = cfg.navigation.tabs.iter().map(|t| t.name.as_str()).collect::<Vec<_>>();
    eprintln!(
        "  {}: {}",
        "Tabs".bold(),
        if tabs.is_empty() { "(none)".to_string() } else { tabs.join(" · ") }
    );
    eprintln!(
        "  {}: {}   {}: {} cols",
        "Hero".bold(),
        cfg.layout.hero_section.title,
        "Grid".bold(),
        cfg.layout.product_display.grid_columns
    );
    let f = &cfg.features;
    eprintln!(
        "  wishlist {}  reviews {}  filters {}  notifications {}  account {}  sharing {}",
        on_off(f.wishlist),
        on_off(f.reviews),
        on_off(f.filters),
        on_off(f.notifications),
        on_off(f.user_account),
        on_off(f.social_sharing)
    );
    eprintln!("{}", "┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┛".bold());

    if let Some(ConfigSource::Fallback(e)) = source {
        eprintln!("{} {}", "[FALLBACK]".yellow().bold(), e);
    }
}
