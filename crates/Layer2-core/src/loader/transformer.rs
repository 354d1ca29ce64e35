//! Transformer Chain - ordered, append-only byte rewriters

use crate::runtime::LoadedUnit;
use parking_lot::RwLock;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Outcome of one transformer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transformed {
    /// Pass the input through untouched
    Unchanged,
    /// Replace the bytes
    Rewritten(Vec<u8>),
}

/// Errors a transformer may raise
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    /// Only one of the paired lifecycle entry points exists
    #[error("{0}")]
    LifecycleMismatch(String),

    #[error("{0}")]
    Failed(String),
}

impl From<ignite_foundation::Error> for TransformError {
    fn from(err: ignite_foundation::Error) -> Self {
        TransformError::Failed(err.to_string())
    }
}

/// A binary rewriter run on every transformed unit
///
/// Transformers may have side effects beyond the returned bytes.
pub trait Transformer: Send + Sync {
    /// Name used in logs and errors
    fn name(&self) -> &str;

    fn transform(&self, unit: &str, bytes: &[u8]) -> Result<Transformed, TransformError>;

    /// Called once the unit this transformer rewrote is defined, before any
    /// other caller can observe it. Not called when resolution fails.
    fn on_defined(&self, _unit: &Arc<LoadedUnit>) {}
}

// ============================================================================
// FnTransformer
// ============================================================================

/// Closure-backed transformer
pub struct FnTransformer<F> {
    name: String,
    f: F,
}

impl<F> FnTransformer<F>
where
    F: Fn(&str, &[u8]) -> Result<Transformed, TransformError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self { name: name.into(), f }
    }
}

impl<F> Transformer for FnTransformer<F>
where
    F: Fn(&str, &[u8]) -> Result<Transformed, TransformError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn transform(&self, unit: &str, bytes: &[u8]) -> Result<Transformed, TransformError> {
        (self.f)(unit, bytes)
    }
}

// ============================================================================
// TransformerChain
// ============================================================================

/// Registration-ordered transformers
#[derive(Default)]
pub struct TransformerChain {
    entries: RwLock<Vec<Arc<dyn Transformer>>>,
}

impl TransformerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append; resolutions already past their snapshot are unaffected
    pub fn push(&self, transformer: Arc<dyn Transformer>) {
        debug!("Adding transformer {}", transformer.name());
        self.entries.write().push(transformer);
    }

    /// Copy of the current chain
    pub fn snapshot(&self) -> Vec<Arc<dyn Transformer>> {
        self.entries.read().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries
            .read()
            .iter()
            .map(|t| t.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
