//! Error types for bring-up operations.

use thiserror::Error;

/// Result type alias for bring-up operations.
pub type Result<T> = std::result::Result<T, EqosError>;

/// Errors that can occur while bringing up or tearing down the MAC.
///
/// Every failure is local to one bring-up attempt: partially acquired
/// resources are unwound before the error is returned, so no variant leaves
/// shared state behind.
#[derive(Debug, Error)]
pub enum EqosError {
    /// Mapping or allocation failed. Fatal to this attempt.
    #[error("out of resources: {reason}")]
    ResourceExhausted {
        /// What could not be allocated or mapped.
        reason: String,
    },

    /// A required resource is absent or malformed. Fatal.
    #[error("configuration error: {reason}")]
    ConfigurationError {
        /// What was missing or malformed.
        reason: String,
    },

    /// Silicon version or capability outside the supported set.
    /// Not retryable without a driver update.
    #[error("unsupported hardware: {reason}")]
    UnsupportedHardware {
        /// Which gate rejected the part.
        reason: String,
    },

    /// A bounded hardware wait expired. Fatal to this attempt; the host may
    /// retry with a later arrival event.
    #[error("{operation} timed out after {polls} polls")]
    Timeout {
        /// The operation that was being waited on.
        operation: String,
        /// Number of polls performed before giving up.
        polls: u32,
    },

    /// Entry point exists but is not implemented in this layer.
    #[error("{operation} is not implemented")]
    Unimplemented {
        /// The unimplemented entry point.
        operation: &'static str,
    },
}

impl EqosError {
    /// Create a resource exhaustion error.
    pub fn resource_exhausted(reason: impl Into<String>) -> Self {
        Self::ResourceExhausted {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::ConfigurationError {
            reason: reason.into(),
        }
    }

    /// Create an unsupported hardware error.
    pub fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedHardware {
            reason: reason.into(),
        }
    }

    /// Create an unimplemented entry-point error.
    pub const fn unimplemented(operation: &'static str) -> Self {
        Self::Unimplemented { operation }
    }

    /// Short stable tag for structured diagnostic records.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ResourceExhausted { .. } => "resource-exhausted",
            Self::ConfigurationError { .. } => "configuration-error",
            Self::UnsupportedHardware { .. } => "unsupported-hardware",
            Self::Timeout { .. } => "timeout",
            Self::Unimplemented { .. } => "unimplemented",
        }
    }
}
