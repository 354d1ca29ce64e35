//! Config - bootstrap configuration
//!
//! - `boot.rs` - BootConfig (`ignite.toml`)

mod boot;

pub use boot::{BootConfig, BOOT_CONFIG_FILE, DEFAULT_LOG_FILE, DEFAULT_SERVICES_DIR};
