//! Error types for bootstrap
//!
//! Any failure concerning a unit the scanner already classified as a service
//! aborts bootstrap; BootstrapError says which bundle and which unit.

use crate::loader::ResolveError;
use ignite_foundation::Error as FoundationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort bootstrap
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// The bundle could not be opened or scanned
    #[error("bundle {}: {source}", .location.display())]
    Bundle {
        location: PathBuf,
        #[source]
        source: FoundationError,
    },

    /// A service declares only one of its entry points
    #[error("lifecycle mismatch in {name} ({}): {reason}", .bundle.display())]
    LifecycleMismatch {
        bundle: PathBuf,
        name: String,
        reason: String,
    },

    /// A scanned service failed to resolve
    #[error("service {name} ({}) could not be resolved: {source}", .bundle.display())]
    ServiceUnresolved {
        bundle: PathBuf,
        name: String,
        #[source]
        source: ResolveError,
    },

    /// A scanned service has neither entry point
    #[error("{name} ({}) is flagged as a service but declares no startService/stopService", .bundle.display())]
    NotServiceCapable { bundle: PathBuf, name: String },
}

impl BootstrapError {
    /// The offending bundle
    pub fn bundle(&self) -> &std::path::Path {
        match self {
            Self::Bundle { location, .. } => location,
            Self::LifecycleMismatch { bundle, .. }
            | Self::ServiceUnresolved { bundle, .. }
            | Self::NotServiceCapable { bundle, .. } => bundle,
        }
    }

    /// Wrap a resolution failure for service `name`
    pub(crate) fn from_resolve(bundle: PathBuf, name: &str, err: ResolveError) -> Self {
        match err {
            ResolveError::LifecycleMismatch { name, reason } => {
                Self::LifecycleMismatch { bundle, name, reason }
            }
            source => Self::ServiceUnresolved {
                bundle,
                name: name.to_string(),
                source,
            },
        }
    }
}

// ============================================================================
// ignite_foundation::Error conversion
// ============================================================================

impl From<BootstrapError> for FoundationError {
    fn from(err: BootstrapError) -> Self {
        match err {
            BootstrapError::Bundle { source, .. } if source.is_bundle_fault() => {
                FoundationError::Archive(source.to_string())
            }
            other => FoundationError::Bootstrap(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_mismatch_unwrapped() {
        let err = BootstrapError::from_resolve(
            PathBuf::from("a.bundle"),
            "demo.Svc",
            ResolveError::LifecycleMismatch {
                name: "demo.Svc".into(),
                reason: "missing stopService".into(),
            },
        );
        assert!(matches!(err, BootstrapError::LifecycleMismatch { ref reason, .. } if reason == "missing stopService"));
        assert_eq!(err.bundle(), std::path::Path::new("a.bundle"));
    }

    #[test]
    fn test_other_failures_wrapped() {
        let err = BootstrapError::from_resolve(
            PathBuf::from("a.bundle"),
            "demo.Svc",
            ResolveError::UnitNotFound("demo.Svc".into()),
        );
        assert!(matches!(err, BootstrapError::ServiceUnresolved { .. }));

        let foundation: FoundationError = err.into();
        assert!(foundation.is_fatal());
    }
}
