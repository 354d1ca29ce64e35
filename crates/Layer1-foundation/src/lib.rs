//! # ignite-foundation
//!
//! Foundation layer for Ignite:
//! - Error: shared error type
//! - Config: bootstrap settings (`ignite.toml`)
//! - Format: compiled unit images and bundle archives
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  bundle file (IGNB)                                     │
//! │  ├── demo/app/Main.unit   (IGNU: tags + functions)      │
//! │  ├── demo/app/Clock.unit                                │
//! │  └── META/notes.txt       (resource, ignored)           │
//! │                     │                                   │
//! │                     ▼                                   │
//! │      ArchiveReader ──► scanner / module loader          │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod format;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config
// ============================================================================
pub use config::{BootConfig, BOOT_CONFIG_FILE, DEFAULT_LOG_FILE, DEFAULT_SERVICES_DIR};

// ============================================================================
// Format
// ============================================================================
pub use format::{
    unit_name_from_path, unit_path_for_name, Access, ArchiveEntry, ArchiveReader, BundleWriter,
    FunctionDecl, Instruction, MetadataTag, UnitImage, Visibility, BUNDLE_EXTENSION,
    SERVICE_TAG, TRACKABLE_TAG, UNIT_SUFFIX,
};
