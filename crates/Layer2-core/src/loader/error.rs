//! Error types for the module loader
//!
//! ResolveError covers every way a unit name can fail to reach the `Defined`
//! state. Cached failures are handed out to every later caller, so the type
//! is `Clone` and carries reasons as strings.

use ignite_foundation::Error as FoundationError;
use thiserror::Error;

/// Result type for resolution
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving a unit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No bytes exist for the name
    #[error("unit not found: {0}")]
    UnitNotFound(String),

    /// Bytes were found but do not form a usable unit
    #[error("failed to define unit '{name}': {reason}")]
    DefinitionError { name: String, reason: String },

    /// A service unit declares only one of its two entry points
    #[error("lifecycle mismatch in '{name}': {reason}")]
    LifecycleMismatch { name: String, reason: String },

    /// A transformer raised an error
    #[error("transformer '{transformer}' failed on '{name}': {reason}")]
    TransformFailure {
        name: String,
        transformer: String,
        reason: String,
    },
}

impl ResolveError {
    /// The unit name the failure is about
    pub fn name(&self) -> &str {
        match self {
            Self::UnitNotFound(name) => name,
            Self::DefinitionError { name, .. }
            | Self::LifecycleMismatch { name, .. }
            | Self::TransformFailure { name, .. } => name,
        }
    }

    /// Whether the failure goes into the loader's permanent bad-set
    ///
    /// Lifecycle mismatches are re-validated on every attempt.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::LifecycleMismatch { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnitNotFound(_))
    }
}

// ============================================================================
// ignite_foundation::Error conversion
// ============================================================================

impl From<ResolveError> for FoundationError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::UnitNotFound(name) => FoundationError::NotFound(format!("unit {}", name)),
            ResolveError::DefinitionError { .. } => FoundationError::Format(err.to_string()),
            ResolveError::LifecycleMismatch { .. } => FoundationError::Bootstrap(err.to_string()),
            ResolveError::TransformFailure { .. } => FoundationError::Resolve(err.to_string()),
        }
    }
}
