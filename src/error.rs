//! Error types for the pedometer core.
//!
//! Numeric processing never fails. Errors only come from the motion source
//! collaborator (permission, availability) and from configuration input.

/// Errors reported by a [`MotionSource`](crate::source::MotionSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("motion permission denied: {reason}")]
    PermissionDenied { reason: String },

    #[error("motion sensor unavailable: {0}")]
    Unavailable(String),
}

/// All errors surfaced by the public pedometer API.
#[derive(Debug, thiserror::Error)]
pub enum PedometerError {
    // ─────────────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("motion source unavailable: {0}")]
    SourceUnavailable(String),

    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<SourceError> for PedometerError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::PermissionDenied { reason } => PedometerError::PermissionDenied(reason),
            SourceError::Unavailable(details) => PedometerError::SourceUnavailable(details),
        }
    }
}

pub type Result<T> = std::result::Result<T, PedometerError>;
