/// Convenience result type used across quotereel.
pub type QuoteReelResult<T> = Result<T, QuoteReelError>;

/// Top-level error taxonomy for the import/export boundaries.
///
/// Nothing on the per-frame visual path returns this type: evaluation clamps instead of failing,
/// and audio failures are downgraded to notices at the audio controller boundary.
#[derive(thiserror::Error, Debug)]
pub enum QuoteReelError {
    /// Invalid user-provided settings or composition data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while evaluating or exporting timeline state.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Audio boundary failure surfaced to a caller that asked for it explicitly.
    #[error("audio error: {0}")]
    Audio(#[from] crate::audio::sink::AudioError),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Filesystem errors at the import/export boundary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl QuoteReelError {
    /// Build a [`QuoteReelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`QuoteReelError::Evaluation`] value.
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`QuoteReelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for QuoteReelError {
    fn from(value: serde_json::Error) -> Self {
        Self::serde(value.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
