//! Host Runtime - the shared outer resolver
//!
//! Units in the platform namespace (`ignite.runtime.` and friends) are never
//! loaded from bundles. Every module loader delegates them here, so all
//! bundles observe the same instances.

use super::symbols::SymbolTable;
use super::unit::{LoadedUnit, UnitOrigin};
use crate::loader::{OuterResolver, ResolveError};
use ignite_foundation::UnitImage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Built-in no-op symbol
pub const NOOP_SYMBOL: &str = "ignite.runtime.noop";

/// Process-wide units and symbols
pub struct HostRuntime {
    symbols: Arc<SymbolTable>,
    units: RwLock<HashMap<String, Arc<LoadedUnit>>>,
}

impl HostRuntime {
    pub fn new(symbols: Arc<SymbolTable>) -> Self {
        Self {
            symbols,
            units: RwLock::new(HashMap::new()),
        }
    }

    /// Runtime with the built-in symbols registered
    pub fn with_builtins() -> Self {
        let symbols = Arc::new(SymbolTable::new());
        symbols.register(NOOP_SYMBOL, || Ok(()));
        Self::new(symbols)
    }

    pub fn symbols(&self) -> Arc<SymbolTable> {
        Arc::clone(&self.symbols)
    }

    /// Define a host unit from an image
    pub fn define_unit(&self, image: &UnitImage) -> Result<Arc<LoadedUnit>, ResolveError> {
        let bytes = image.encode().map_err(|e| ResolveError::DefinitionError {
            name: image.name.clone(),
            reason: e.to_string(),
        })?;
        let unit = Arc::new(LoadedUnit::define(
            &image.name,
            &bytes,
            &self.symbols,
            UnitOrigin::Host,
        )?);

        self.units
            .write()
            .insert(image.name.clone(), Arc::clone(&unit));
        info!("Defined host unit {}", image.name);
        Ok(unit)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.read().contains_key(name)
    }

    pub fn unit_count(&self) -> usize {
        self.units.read().len()
    }
}

impl Default for HostRuntime {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl OuterResolver for HostRuntime {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedUnit>, ResolveError> {
        let found = self.units.read().get(name).cloned();
        match found {
            Some(unit) => Ok(unit),
            None => {
                debug!("Host runtime has no unit {}", name);
                Err(ResolveError::UnitNotFound(name.to_string()))
            }
        }
    }
}
