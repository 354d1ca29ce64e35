//! # Module Loader
//!
//! Per-bundle, isolated name-to-unit resolution.
//!
//! ```text
//! resolve(name)
//!   ├─ bad-set hit ─────────────► UnitNotFound
//!   ├─ loader-exception ────────► outer resolver (no cache, no chain)
//!   ├─ already Defined ─────────► cached Arc<LoadedUnit>
//!   └─ slot lock (single-flight)
//!        ├─ raw bytes (looked up at most once)
//!        ├─ transformer chain   (skipped for transformer-exceptions)
//!        ├─ define ──► Bad on failure
//!        └─ on_defined hooks ──► Defined
//! ```

mod cache;
mod error;
mod rules;
mod source;
mod transformer;

pub use cache::{UnitCache, UnitState};
pub use error::{ResolveError, ResolveResult};
pub use rules::{DelegationRules, Route, DEFAULT_LOADER_EXCEPTIONS, DEFAULT_TRANSFORMER_EXCEPTIONS};
pub use source::{OuterResolver, UnitSource};
pub use transformer::{FnTransformer, TransformError, Transformed, Transformer, TransformerChain};

use crate::runtime::{LoadedUnit, SymbolTable, UnitOrigin};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace, warn};

// ============================================================================
// Builder
// ============================================================================

/// Builds a [`ModuleLoader`]; delegation rules are frozen by `build`
pub struct ModuleLoaderBuilder {
    source: Arc<dyn UnitSource>,
    outer: Arc<dyn OuterResolver>,
    symbols: Arc<SymbolTable>,
    rules: DelegationRules,
}

impl ModuleLoaderBuilder {
    /// Extra prefix delegated to the outer resolver
    pub fn loader_exception(mut self, prefix: impl Into<String>) -> Self {
        self.rules.add_loader_exception(prefix);
        self
    }

    /// Extra prefix loaded without transformation
    pub fn transformer_exception(mut self, prefix: impl Into<String>) -> Self {
        self.rules.add_transformer_exception(prefix);
        self
    }

    /// Replace the rule set entirely (defaults included)
    pub fn rules(mut self, rules: DelegationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn build(self) -> ModuleLoader {
        debug!(
            "Module loader for {} ({} loader-exceptions, {} transformer-exceptions)",
            self.source.location().display(),
            self.rules.loader_exceptions().len(),
            self.rules.transformer_exceptions().len()
        );
        ModuleLoader {
            source: self.source,
            outer: self.outer,
            symbols: self.symbols,
            rules: self.rules,
            chain: TransformerChain::new(),
            cache: UnitCache::new(),
        }
    }
}

// ============================================================================
// ModuleLoader
// ============================================================================

pub struct ModuleLoader {
    source: Arc<dyn UnitSource>,
    outer: Arc<dyn OuterResolver>,
    symbols: Arc<SymbolTable>,
    rules: DelegationRules,
    chain: TransformerChain,
    cache: UnitCache,
}

impl ModuleLoader {
    /// Start building a loader with the default delegation rules
    pub fn builder(
        source: Arc<dyn UnitSource>,
        outer: Arc<dyn OuterResolver>,
        symbols: Arc<SymbolTable>,
    ) -> ModuleLoaderBuilder {
        ModuleLoaderBuilder {
            source,
            outer,
            symbols,
            rules: DelegationRules::with_defaults(),
        }
    }

    /// Storage location of the owning bundle
    pub fn location(&self) -> &Path {
        self.source.location()
    }

    pub fn rules(&self) -> &DelegationRules {
        &self.rules
    }

    /// Append a transformer; it sees every resolution that snapshots the
    /// chain after this call
    pub fn add_transformer(&self, transformer: Arc<dyn Transformer>) {
        self.chain.push(transformer);
    }

    pub fn transformer_count(&self) -> usize {
        self.chain.len()
    }

    pub fn transformer_names(&self) -> Vec<String> {
        self.chain.names()
    }

    pub fn state(&self, name: &str) -> UnitState {
        self.cache.state(name)
    }

    pub fn defined_count(&self) -> usize {
        self.cache.defined_count()
    }

    /// Resolve `name` to its defined form
    pub fn resolve(&self, name: &str) -> ResolveResult<Arc<LoadedUnit>> {
        trace!("[{}] resolve {}", self.location().display(), name);

        if self.cache.is_bad(name) {
            debug!("{} is in the bad-set, not retrying", name);
            return Err(ResolveError::UnitNotFound(name.to_string()));
        }

        let route = self.rules.route(name);
        if route == Route::Delegate {
            debug!("{} delegated to outer resolver", name);
            return self.outer.resolve(name);
        }

        if let Some(unit) = self.cache.defined(name) {
            trace!("{} already defined", name);
            return Ok(unit);
        }

        let slot = self.cache.slot(name);
        let mut outcome = slot.lock();
        if let Some(done) = outcome.as_ref() {
            trace!("{} resolved by a concurrent caller", name);
            return done.clone();
        }

        let transformers = match route {
            Route::Untransformed => Vec::new(),
            _ => self.chain.snapshot(),
        };

        let result = self.load(name, route, &transformers);
        match &result {
            Ok(unit) => {
                debug!("Defined {} ({} functions)", name, unit.function_names().len());
                for transformer in &transformers {
                    transformer.on_defined(unit);
                }
                self.cache.insert_defined(Arc::clone(unit));
                *outcome = Some(result.clone());
            }
            Err(err) if err.is_cacheable() => {
                debug!("{} marked bad: {}", name, err);
                self.cache.mark_bad(name);
                *outcome = Some(result.clone());
            }
            Err(err) => {
                warn!("{} failed without caching: {}", name, err);
            }
        }
        result
    }

    /// Define `name` from `bytes` directly, bypassing the bundle and the chain
    pub fn define_synthetic(&self, name: &str, bytes: &[u8]) -> ResolveResult<Arc<LoadedUnit>> {
        if self.rules.route(name) == Route::Delegate {
            return Err(ResolveError::DefinitionError {
                name: name.to_string(),
                reason: "name is delegated to the outer resolver".to_string(),
            });
        }

        let slot = self.cache.slot(name);
        let mut outcome = slot.lock();
        if outcome.is_some() || self.cache.is_bad(name) {
            return Err(ResolveError::DefinitionError {
                name: name.to_string(),
                reason: "name already resolved by this loader".to_string(),
            });
        }

        let unit = Arc::new(LoadedUnit::define(name, bytes, &self.symbols, self.origin())?);
        debug!("Defined synthetic unit {}", name);
        self.cache.insert_defined(Arc::clone(&unit));
        *outcome = Some(Ok(Arc::clone(&unit)));
        Ok(unit)
    }

    fn origin(&self) -> UnitOrigin {
        UnitOrigin::Bundle(self.location().to_path_buf())
    }

    /// Steps 4 and 5; caller holds the name's slot lock
    fn load(
        &self,
        name: &str,
        route: Route,
        transformers: &[Arc<dyn Transformer>],
    ) -> ResolveResult<Arc<LoadedUnit>> {
        let raw = self
            .cache
            .raw_bytes(name, || {
                trace!("Looking up raw bytes for {}", name);
                self.source.find_bytes(name)
            })
            .ok_or_else(|| ResolveError::UnitNotFound(name.to_string()))?;

        let bytes = match route {
            Route::Untransformed => {
                trace!("{} matches a transformer-exception, chain skipped", name);
                Cow::Borrowed(&raw[..])
            }
            _ => self.run_chain(name, &raw, transformers)?,
        };

        LoadedUnit::define(name, &bytes, &self.symbols, self.origin()).map(Arc::new)
    }

    fn run_chain<'a>(
        &self,
        name: &str,
        input: &'a [u8],
        transformers: &[Arc<dyn Transformer>],
    ) -> ResolveResult<Cow<'a, [u8]>> {
        let mut current = Cow::Borrowed(input);

        for transformer in transformers {
            match transformer.transform(name, &current) {
                Ok(Transformed::Unchanged) => {
                    trace!("{}: {} unchanged", transformer.name(), name);
                }
                Ok(Transformed::Rewritten(bytes)) => {
                    trace!("{}: {} rewritten ({} bytes)", transformer.name(), name, bytes.len());
                    current = Cow::Owned(bytes);
                }
                Err(TransformError::LifecycleMismatch(reason)) => {
                    return Err(ResolveError::LifecycleMismatch {
                        name: name.to_string(),
                        reason,
                    });
                }
                Err(TransformError::Failed(reason)) => {
                    return Err(ResolveError::TransformFailure {
                        name: name.to_string(),
                        transformer: transformer.name().to_string(),
                        reason,
                    });
                }
            }
        }

        Ok(current)
    }
}

impl std::fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("location", &self.location())
            .field("rules", &self.rules)
            .field("transformers", &self.chain.names())
            .field("defined", &self.cache.defined_count())
            .finish()
    }
}
