//! Collaborators the module loader resolves against

use super::error::ResolveError;
use crate::runtime::LoadedUnit;
use std::path::Path;
use std::sync::Arc;

/// Raw-byte provider for one bundle
pub trait UnitSource: Send + Sync {
    /// Storage location identifying the bundle
    fn location(&self) -> &Path;

    /// Raw compiled bytes for `name`, if the bundle contains it
    fn find_bytes(&self, name: &str) -> Option<Arc<[u8]>>;
}

/// Shared resolver that loader-exception names are delegated to
pub trait OuterResolver: Send + Sync {
    fn resolve(&self, name: &str) -> Result<Arc<LoadedUnit>, ResolveError>;
}
