//! Boot Configuration - bootstrap settings read from `ignite.toml`
//!
//! Every field has a default, so a missing file (or a missing key) falls back
//! to the stock layout: bundles in `./services`, log lines appended to
//! `./console.log`, no monitor socket.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default config file name
pub const BOOT_CONFIG_FILE: &str = "ignite.toml";

/// Default bundle directory
pub const DEFAULT_SERVICES_DIR: &str = "services";

/// Default log file
pub const DEFAULT_LOG_FILE: &str = "./console.log";

// ============================================================================
// BootConfig
// ============================================================================

/// Bootstrap settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BootConfig {
    /// Directory scanned for `*.bundle` files
    pub services_dir: PathBuf,

    /// Log file appended to in addition to stderr (empty = disabled)
    pub log_file: String,

    /// Port for the local monitor socket
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitor_port: Option<u16>,

    /// Bootstrap bundles on the rayon pool instead of one by one
    pub parallel_bootstrap: bool,

    /// Extra prefixes delegated to the host resolver
    pub loader_exceptions: Vec<String>,

    /// Extra prefixes loaded without running transformers
    pub transformer_exceptions: Vec<String>,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            services_dir: PathBuf::from(DEFAULT_SERVICES_DIR),
            log_file: DEFAULT_LOG_FILE.to_string(),
            monitor_port: None,
            parallel_bootstrap: true,
            loader_exceptions: Vec::new(),
            transformer_exceptions: Vec::new(),
        }
    }
}

impl BootConfig {
    /// Load from `path`, or defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        let config = Self::parse(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

        info!("Loaded boot config from {}", path.display());
        Ok(config)
    }

    /// Parse TOML text
    pub fn parse(raw: &str) -> Result<Self> {
        let config: BootConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write the config as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Reject values the loader cannot use
    pub fn validate(&self) -> Result<()> {
        if self.monitor_port == Some(0) {
            return Err(Error::Config("monitor-port must be non-zero".to_string()));
        }

        let prefixes = self
            .loader_exceptions
            .iter()
            .chain(self.transformer_exceptions.iter());
        for prefix in prefixes {
            if prefix.trim().is_empty() {
                return Err(Error::Config("delegation prefix must not be empty".to_string()));
            }
        }

        Ok(())
    }

    /// Log file path, if file logging is enabled
    pub fn log_file_path(&self) -> Option<PathBuf> {
        let trimmed = self.log_file.trim();
        (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = BootConfig::load(&dir.path().join(BOOT_CONFIG_FILE)).unwrap();
        assert_eq!(config, BootConfig::default());
        assert!(config.parallel_bootstrap);
        assert_eq!(config.monitor_port, None);
    }

    #[test]
    fn test_parse_partial() {
        let config = BootConfig::parse(
            r#"
            services-dir = "plugins"
            monitor-port = 4711
            loader-exceptions = ["vendor.shared."]
            "#,
        )
        .unwrap();

        assert_eq!(config.services_dir, PathBuf::from("plugins"));
        assert_eq!(config.monitor_port, Some(4711));
        assert_eq!(config.loader_exceptions, vec!["vendor.shared.".to_string()]);
        assert_eq!(config.log_file, DEFAULT_LOG_FILE);
    }

    #[test]
    fn test_rejects_empty_prefix() {
        let err = BootConfig::parse("transformer-exceptions = [\" \"]").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join(BOOT_CONFIG_FILE);

        let mut config = BootConfig::default();
        config.parallel_bootstrap = false;
        config.save(&path).unwrap();

        assert_eq!(BootConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_log_file_disabled() {
        let mut config = BootConfig::default();
        config.log_file = String::new();
        assert!(config.log_file_path().is_none());
    }
}
