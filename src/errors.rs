use thiserror::Error;

/// Failures the generation pipeline can surface to its caller.
///
/// Reconciliation has no variant here: it is total and always produces a
/// valid config.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppGenError {
    #[error("generation unavailable: {0}")]
    ModelUnavailable(String),
    #[error("model output was not a JSON object: {reason}")]
    MalformedModelOutput { reason: String, raw: String },
    #[error("modification failed: {0}")]
    ModificationFailed(String),
}

impl AppGenError {
    /// Raw model text attached to the error, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedModelOutput { raw, .. } => Some(raw.as_str()),
            _ => None,
        }
    }
}
