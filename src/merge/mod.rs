use serde_json::{Map, Value};
use tracing::warn;

use crate::schema::{is_hex_color, AppConfig, Field, Rule, APP_CONFIG};

/// Merge an untrusted, possibly partial model object over a valid baseline.
///
/// Every leaf is coalesced independently according to [`APP_CONFIG`]. The
/// result is always a valid config; a candidate that is not an object
/// yields the baseline unchanged.
pub fn reconcile(candidate: &Value, baseline: &AppConfig) -> AppConfig {
    if !candidate.is_object() {
        return baseline.clone();
    }
    let base = match serde_json::to_value(baseline) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "baseline config did not serialize; keeping it as-is");
            return baseline.clone();
        }
    };
    let merged = coalesce(Some(candidate), &base, &APP_CONFIG);
    match serde_json::from_value::<AppConfig>(merged) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Only reachable if the rule table and AppConfig disagree.
            warn!(error = %e, "reconciled value did not match AppConfig; keeping baseline");
            baseline.clone()
        }
    }
}

/// Turn a stored config into a valid one. Fields that are present and
/// valid are kept as-is, blank strings included; only missing or invalid
/// fields take the defaults for the config's own name and color.
pub fn repair(stored: &Value) -> AppConfig {
    let text = |key: &str| stored.get(key).and_then(Value::as_str).unwrap_or_default();
    reconcile(stored, &AppConfig::defaults(text("appName"), text("primaryColor")))
}

fn coalesce(candidate: Option<&Value>, baseline: &Value, rule: &Rule) -> Value {
    match rule {
        Rule::Group(fields) => {
            let cand = candidate.and_then(Value::as_object);
            let base = baseline.as_object();
            let mut out = Map::new();
            for f in fields.iter() {
                let b = base.and_then(|o| o.get(f.key)).unwrap_or(&Value::Null);
                let v = coalesce(cand.and_then(|o| o.get(f.key)), b, &f.rule);
                if !v.is_null() {
                    out.insert(f.key.to_string(), v);
                }
            }
            Value::Object(out)
        }
        Rule::List { item, non_empty } => match candidate.and_then(Value::as_array) {
            Some(items) if !(*non_empty && items.is_empty()) => items
                .iter()
                .map(|el| conform(el, item))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
                .unwrap_or_else(|| baseline.clone()),
            _ => baseline.clone(),
        },
        leaf => candidate
            .and_then(|c| accept_leaf(c, leaf))
            .unwrap_or_else(|| baseline.clone()),
    }
}

fn accept_leaf(v: &Value, rule: &Rule) -> Option<Value> {
    match rule {
        Rule::Text | Rule::OptionalText => v.as_str().map(|s| Value::String(s.to_string())),
        Rule::Color => v
            .as_str()
            .filter(|s| is_hex_color(s))
            .map(|s| Value::String(s.trim().to_string())),
        Rule::Flag => v.as_bool().map(Value::Bool),
        Rule::Count { min, max } => v
            .as_u64()
            .filter(|n| n >= min && n <= max)
            .map(Value::from),
        Rule::OneOf(names) => v
            .as_str()
            .filter(|s| names.contains(s))
            .map(|s| Value::String(s.to_string())),
        Rule::Group(_) | Rule::List { .. } => None,
    }
}

/// A list element is kept only when every required item field is valid.
/// Unknown keys are dropped; optional fields may be absent or null.
fn conform(el: &Value, item: &[Field]) -> Option<Value> {
    let obj = el.as_object()?;
    let mut out = Map::new();
    for f in item {
        match (obj.get(f.key), &f.rule) {
            (None | Some(Value::Null), Rule::OptionalText) => {}
            (Some(v), rule) => {
                out.insert(f.key.to_string(), accept_leaf(v, rule)?);
            }
            (None, _) => return None,
        }
    }
    Some(Value::Object(out))
}
