//! Error types for Ignite
//!
//! Foundation-level errors shared by every layer. Higher layers keep their own
//! detailed enums and convert into [`Error`] at crate boundaries.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Ignite foundation error type
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // Wire formats
    // ========================================================================
    #[error("Malformed unit: {0}")]
    Format(String),

    #[error("Archive error: {0}")]
    Archive(String),

    // ========================================================================
    // Loading / bootstrap
    // ========================================================================
    #[error("Resolution failed: {0}")]
    Resolve(String),

    #[error("Bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("Lifecycle failure: {0}")]
    Lifecycle(String),

    // ========================================================================
    // General
    // ========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // External error conversions
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML write error: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("Encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    // ========================================================================
    // Other
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the error came from bad bundle contents rather than the host
    pub fn is_bundle_fault(&self) -> bool {
        matches!(self, Error::Format(_) | Error::Archive(_) | Error::Bincode(_))
    }

    /// Whether the error must abort process startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::Bootstrap(_) | Error::Internal(_)
        )
    }

    /// Malformed unit helper
    pub fn format(message: impl Into<String>) -> Self {
        Error::Format(message.into())
    }

    /// Archive error helper
    pub fn archive(message: impl Into<String>) -> Self {
        Error::Archive(message.into())
    }
}

// ============================================================================
// Additional From conversions
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundle_fault_classification() {
        assert!(Error::format("bad magic").is_bundle_fault());
        assert!(Error::archive("truncated").is_bundle_fault());
        assert!(!Error::Config("x".into()).is_bundle_fault());
    }

    #[test]
    fn test_fatal_classification() {
        assert!(Error::Bootstrap("x".into()).is_fatal());
        assert!(!Error::Lifecycle("x".into()).is_fatal());
    }
}
