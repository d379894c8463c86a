use thiserror::Error;

/// Raised by the normalizer when a raw document does not fit its schema tree.
///
/// `path` is dot-joined from the definition root, list elements are addressed
/// by index (`configuration.storage.input.tables.0`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid configuration for path \"{path}\": {reason}")]
pub struct ConfigurationInvalid {
    pub path: String,
    pub reason: String,
}

impl ConfigurationInvalid {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
