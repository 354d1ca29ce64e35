//! # Orchestrator
//!
//! Bootstraps bundles and drives the adapters they produce.
//!
//! Per bundle: open → scan → build loader → register synthesizer → force
//! resolution of every service. Bundles share no mutable state, so they are
//! bootstrapped on the rayon pool when `parallel_bootstrap` is set.

mod error;
mod report;

pub use error::BootstrapError;
pub use report::{BundleSummary, LifecycleFailure, LifecyclePhase, LifecycleReport};

use crate::bundle::Bundle;
use crate::loader::{ModuleLoader, OuterResolver, UnitSource};
use crate::runtime::HostRuntime;
use crate::scanner::MetadataScanner;
use crate::service::{Lifecycle, LifecycleSynthesizer, ServiceRecord, UnitHandle};
use ignite_foundation::BootConfig;
use parking_lot::RwLock;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info};

// ============================================================================
// OrchestratorConfig
// ============================================================================

/// Bootstrap settings taken from `BootConfig`
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel_bootstrap: bool,
    /// Appended to the default loader-exceptions
    pub loader_exceptions: Vec<String>,
    /// Appended to the default transformer-exceptions
    pub transformer_exceptions: Vec<String>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel_bootstrap: true,
            loader_exceptions: Vec::new(),
            transformer_exceptions: Vec::new(),
        }
    }
}

impl From<&BootConfig> for OrchestratorConfig {
    fn from(config: &BootConfig) -> Self {
        Self {
            parallel_bootstrap: config.parallel_bootstrap,
            loader_exceptions: config.loader_exceptions.clone(),
            transformer_exceptions: config.transformer_exceptions.clone(),
        }
    }
}

// ============================================================================
// BundleRuntime
// ============================================================================

/// A bootstrapped bundle: its loader, scanner and service record
pub struct BundleRuntime {
    bundle: Arc<Bundle>,
    loader: ModuleLoader,
    scanner: MetadataScanner,
    record: Arc<ServiceRecord>,
}

impl BundleRuntime {
    pub fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    pub fn loader(&self) -> &ModuleLoader {
        &self.loader
    }

    pub fn scanner(&self) -> &MetadataScanner {
        &self.scanner
    }

    pub fn record(&self) -> &Arc<ServiceRecord> {
        &self.record
    }

    pub fn location(&self) -> &Path {
        self.bundle.location()
    }

    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            bundle: self.bundle.name(),
            location: self.location().display().to_string(),
            units: self.bundle.unit_count(),
            services: self.record.services().iter().cloned().collect(),
            trackables: self.record.trackables().iter().cloned().collect(),
            adapters: self
                .record
                .adapters()
                .iter()
                .map(|a| a.base_unit().name.clone())
                .collect(),
        }
    }
}

impl std::fmt::Debug for BundleRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BundleRuntime")
            .field("bundle", &self.bundle)
            .field("loader", &self.loader)
            .field("record", &self.record)
            .finish()
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

pub struct Orchestrator {
    host: Arc<HostRuntime>,
    config: OrchestratorConfig,
    bundles: RwLock<Vec<Arc<BundleRuntime>>>,
}

impl Orchestrator {
    pub fn new(host: Arc<HostRuntime>, config: OrchestratorConfig) -> Self {
        Self {
            host,
            config,
            bundles: RwLock::new(Vec::new()),
        }
    }

    pub fn host(&self) -> &Arc<HostRuntime> {
        &self.host
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Bootstrap every bundle and return all adapters
    ///
    /// The first failing bundle aborts the whole bootstrap; nothing from
    /// this call is registered in that case.
    pub fn bootstrap(&self, locations: &[PathBuf]) -> Result<Vec<Arc<dyn Lifecycle>>, BootstrapError> {
        info!("Bootstrapping {} bundle(s)", locations.len());

        let runtimes: Vec<BundleRuntime> = if self.config.parallel_bootstrap {
            locations
                .par_iter()
                .map(|location| self.bootstrap_bundle(location))
                .collect::<Result<_, _>>()?
        } else {
            locations
                .iter()
                .map(|location| self.bootstrap_bundle(location))
                .collect::<Result<_, _>>()?
        };

        self.bundles
            .write()
            .extend(runtimes.into_iter().map(Arc::new));

        let adapters = self.adapters();
        info!("Bootstrap complete: {} adapter(s)", adapters.len());
        Ok(adapters)
    }

    fn bootstrap_bundle(&self, location: &Path) -> Result<BundleRuntime, BootstrapError> {
        let bundle_error = |source| BootstrapError::Bundle {
            location: location.to_path_buf(),
            source,
        };

        let bundle = Arc::new(Bundle::open(location).map_err(bundle_error)?);
        let scanner = MetadataScanner::new();
        let record = Arc::new(scanner.inspect_all(&bundle).map_err(bundle_error)?);

        let source: Arc<dyn UnitSource> = bundle.clone();
        let outer: Arc<dyn OuterResolver> = self.host.clone();
        let mut builder = ModuleLoader::builder(source, outer, self.host.symbols());
        for prefix in &self.config.loader_exceptions {
            builder = builder.loader_exception(prefix.as_str());
        }
        for prefix in &self.config.transformer_exceptions {
            builder = builder.transformer_exception(prefix.as_str());
        }
        let loader = builder.build();
        loader.add_transformer(Arc::new(LifecycleSynthesizer::new(Arc::clone(&record))));

        for name in record.services() {
            debug!("Forcing resolution of service {}", name);
            loader
                .resolve(name)
                .map_err(|e| BootstrapError::from_resolve(location.to_path_buf(), name, e))?;

            if !record.has_adapter(name) {
                return Err(BootstrapError::NotServiceCapable {
                    bundle: location.to_path_buf(),
                    name: name.clone(),
                });
            }
        }

        info!(
            "Bundle {} ready: {} service(s), {} trackable(s)",
            bundle.name(),
            record.services().len(),
            record.trackables().len()
        );

        Ok(BundleRuntime {
            bundle,
            loader,
            scanner,
            record,
        })
    }

    /// Bootstrapped bundles in bootstrap order
    pub fn bundles(&self) -> Vec<Arc<BundleRuntime>> {
        self.bundles.read().clone()
    }

    /// Every adapter across all bundles
    pub fn adapters(&self) -> Vec<Arc<dyn Lifecycle>> {
        self.bundles
            .read()
            .iter()
            .flat_map(|b| b.record().adapters())
            .collect()
    }

    /// Start every adapter; failures are collected, never short-circuit
    pub fn start_all(&self) -> LifecycleReport {
        self.drive(LifecyclePhase::Start)
    }

    /// Stop every adapter; failures are collected, never short-circuit
    pub fn stop_all(&self) -> LifecycleReport {
        self.drive(LifecyclePhase::Stop)
    }

    fn drive(&self, phase: LifecyclePhase) -> LifecycleReport {
        let mut report = LifecycleReport::new(phase);

        for adapter in self.adapters() {
            let unit = adapter.base_unit();
            info!("{} {}", phase, unit);
            let result = match phase {
                LifecyclePhase::Start => adapter.start(),
                LifecyclePhase::Stop => adapter.stop(),
            };
            if let Err(e) = &result {
                error!("Failed to {} {}: {:#}", phase, unit, e);
            }
            report.record(unit, result);
        }

        report
    }

    /// Trackable units across all bundles
    pub fn trackables(&self) -> Vec<UnitHandle> {
        self.bundles
            .read()
            .iter()
            .flat_map(|b| {
                b.record()
                    .trackables()
                    .iter()
                    .map(|name| UnitHandle::new(b.location(), name.as_str()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn summary(&self) -> Vec<BundleSummary> {
        self.bundles.read().iter().map(|b| b.summary()).collect()
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("bundles", &self.bundles.read().len())
            .finish()
    }
}
