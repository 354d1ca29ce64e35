//! Lifecycle adapters - uniform start/stop over a plugin's entry points

use super::synthesizer::{START_ENTRY, STOP_ENTRY};
use crate::runtime::LoadedUnit;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ============================================================================
// UnitHandle
// ============================================================================

/// Identifies the unit an adapter was synthesized from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnitHandle {
    /// Location of the owning bundle
    pub bundle: PathBuf,
    /// Dotted unit name
    pub name: String,
}

impl UnitHandle {
    pub fn new(bundle: &Path, name: impl Into<String>) -> Self {
        Self {
            bundle: bundle.to_path_buf(),
            name: name.into(),
        }
    }
}

impl fmt::Display for UnitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.bundle.display())
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// The lifecycle interface every service is driven through
pub trait Lifecycle: Send + Sync {
    fn start(&self) -> anyhow::Result<()>;

    fn stop(&self) -> anyhow::Result<()>;

    /// The unit this adapter forwards to
    fn base_unit(&self) -> &UnitHandle;
}

impl fmt::Debug for dyn Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("unit", &self.base_unit().name)
            .finish()
    }
}

// ============================================================================
// ServiceAdapter
// ============================================================================

/// Forwards `start`/`stop` to a defined unit's `startService`/`stopService`
pub struct ServiceAdapter {
    handle: UnitHandle,
    unit: Arc<LoadedUnit>,
}

impl ServiceAdapter {
    pub fn new(handle: UnitHandle, unit: Arc<LoadedUnit>) -> Self {
        Self { handle, unit }
    }

    /// The defined unit calls are forwarded to
    pub fn unit(&self) -> &Arc<LoadedUnit> {
        &self.unit
    }
}

impl Lifecycle for ServiceAdapter {
    fn start(&self) -> anyhow::Result<()> {
        Ok(self.unit.invoke(START_ENTRY)?)
    }

    fn stop(&self) -> anyhow::Result<()> {
        Ok(self.unit.invoke(STOP_ENTRY)?)
    }

    fn base_unit(&self) -> &UnitHandle {
        &self.handle
    }
}

impl fmt::Debug for ServiceAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAdapter")
            .field("unit", &self.handle.name)
            .field("bundle", &self.handle.bundle)
            .finish()
    }
}
