//! Per-bundle service record

use super::adapter::Lifecycle;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Collected while the scanner walks a bundle
#[derive(Debug, Clone)]
pub struct ServiceRecordBuilder {
    bundle: PathBuf,
    services: BTreeSet<String>,
    trackables: BTreeSet<String>,
    scanned: usize,
}

impl ServiceRecordBuilder {
    pub fn new(bundle: &Path) -> Self {
        Self {
            bundle: bundle.to_path_buf(),
            services: BTreeSet::new(),
            trackables: BTreeSet::new(),
            scanned: 0,
        }
    }

    pub fn add_service(&mut self, name: impl Into<String>) {
        self.services.insert(name.into());
    }

    pub fn add_trackable(&mut self, name: impl Into<String>) {
        self.trackables.insert(name.into());
    }

    pub(crate) fn note_scanned(&mut self) {
        self.scanned += 1;
    }

    pub fn build(self) -> ServiceRecord {
        ServiceRecord {
            bundle: self.bundle,
            services: self.services,
            trackables: self.trackables,
            scanned: self.scanned,
            adapters: Mutex::new(Vec::new()),
        }
    }
}

/// Service and trackable names of one bundle, plus its adapters
///
/// The name sets are frozen once the scan finishes; only the adapter list
/// grows afterwards.
pub struct ServiceRecord {
    bundle: PathBuf,
    services: BTreeSet<String>,
    trackables: BTreeSet<String>,
    scanned: usize,
    adapters: Mutex<Vec<Arc<dyn Lifecycle>>>,
}

impl ServiceRecord {
    pub fn bundle(&self) -> &Path {
        &self.bundle
    }

    pub fn services(&self) -> &BTreeSet<String> {
        &self.services
    }

    pub fn trackables(&self) -> &BTreeSet<String> {
        &self.trackables
    }

    pub fn is_service(&self, name: &str) -> bool {
        self.services.contains(name)
    }

    /// Number of units the scanner visited
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    /// Register an adapter; `false` if one already exists for the same unit
    pub fn add_adapter(&self, adapter: Arc<dyn Lifecycle>) -> bool {
        let mut adapters = self.adapters.lock();
        if adapters
            .iter()
            .any(|a| a.base_unit().name == adapter.base_unit().name)
        {
            return false;
        }
        adapters.push(adapter);
        true
    }

    pub fn has_adapter(&self, unit: &str) -> bool {
        self.adapters
            .lock()
            .iter()
            .any(|a| a.base_unit().name == unit)
    }

    /// Snapshot of the adapters in registration order
    pub fn adapters(&self) -> Vec<Arc<dyn Lifecycle>> {
        self.adapters.lock().clone()
    }

    pub fn adapter_count(&self) -> usize {
        self.adapters.lock().len()
    }
}

impl std::fmt::Debug for ServiceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceRecord")
            .field("bundle", &self.bundle)
            .field("services", &self.services)
            .field("trackables", &self.trackables)
            .field("scanned", &self.scanned)
            .field("adapters", &self.adapter_count())
            .finish()
    }
}
