//! Symbol Table - native functions units can bind to

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A host-provided native function
pub type NativeFn = Arc<dyn Fn() -> anyhow::Result<()> + Send + Sync>;

/// Native symbols shared by every loader in the process
#[derive(Default)]
pub struct SymbolTable {
    symbols: RwLock<HashMap<String, NativeFn>>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a symbol; an existing binding is replaced
    pub fn register<F>(&self, symbol: impl Into<String>, f: F)
    where
        F: Fn() -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let symbol = symbol.into();
        let mut symbols = self.symbols.write();
        if symbols.insert(symbol.clone(), Arc::new(f)).is_some() {
            warn!("Symbol {} re-registered, previous binding dropped", symbol);
        } else {
            debug!("Registered symbol {}", symbol);
        }
    }

    pub fn get(&self, symbol: &str) -> Option<NativeFn> {
        self.symbols.read().get(symbol).cloned()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.read().contains_key(symbol)
    }

    /// Registered symbol names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.symbols.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.symbols.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.read().is_empty()
    }
}

impl std::fmt::Debug for SymbolTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SymbolTable")
            .field("symbols", &self.names())
            .finish()
    }
}
