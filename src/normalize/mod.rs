use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use crate::errors::AppGenError;

fn fence_open() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^```[A-Za-z0-9_+-]*[ \t]*\r?\n?").expect("valid regex"))
}

fn fence_close() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*```\s*$").expect("valid regex"))
}

/// Remove a surrounding markdown code fence, with or without a language tag.
pub fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(m) = fence_open().find(trimmed) else {
        return trimmed;
    };
    let body = &trimmed[m.end()..];
    match fence_close().find(body) {
        Some(close) => body[..close.start()].trim(),
        None => body.trim(),
    }
}

/// Turn raw model text into a JSON object.
///
/// Tries the fence-stripped text as-is first, then every balanced `{...}`
/// span in order until one parses as an object.
pub fn normalize(raw: &str) -> Result<Value, AppGenError> {
    let body = strip_fences(raw);
    if body.is_empty() {
        return Err(malformed("empty model output", raw));
    }

    let direct_err = match serde_json::from_str::<Value>(body) {
        Ok(v) if v.is_object() => return Ok(v),
        Ok(_) => "top-level JSON value is not an object".to_string(),
        Err(e) => e.to_string(),
    };

    let mut from = 0usize;
    while let Some((start, end)) = next_object_span(body, from) {
        if let Ok(v) = serde_json::from_str::<Value>(&body[start..=end]) {
            if v.is_object() {
                return Ok(v);
            }
        }
        from = start + 1;
    }

    Err(malformed(&direct_err, raw))
}

fn malformed(reason: &str, raw: &str) -> AppGenError {
    AppGenError::MalformedModelOutput { reason: reason.to_string(), raw: raw.to_string() }
}

/// Byte range of the first balanced `{...}` span starting at or after
/// `from`. Braces inside JSON strings do not count.
fn next_object_span(s: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let start = from + s.get(from..)?.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, i));
                }
            }
            _ => {}
        }
    }
    None
}
