//! Common error infrastructure.
//!
//! Domain-specific errors live next to the actions they validate; this
//! module provides the shared classification surface.

/// Severity level of an error, used for categorization and logging
/// priorities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorSeverity {
    /// Invalid input; rejecting it left the state untouched.
    Validation,
    /// Unexpected state inconsistency. These indicate bugs and should be
    /// investigated.
    Internal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal)
    }
}

/// Common trait for engine errors.
///
/// Failures here are deterministic given the same state: nothing is meant
/// to be retried, the caller chooses different inputs instead.
pub trait EngineError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// A static identifier for the error variant, for categorization and
    /// testing.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
