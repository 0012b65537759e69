//! Error types for fixture generation

use thiserror::Error;

/// Result type for fixture operations
pub type GenerationResult<T> = Result<T, GenerationError>;

/// Errors raised while generating or converting fixtures
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The requested fixture kind is not one the generator knows about
    #[error("unsupported fixture kind '{kind}' (expected one of: project, buildType, user, server)")]
    UnsupportedKind { kind: String },

    /// An override replaced a field with a value of the wrong shape
    #[error("override for {kind} fixture does not fit its field set: {source}")]
    InvalidOverride {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}
