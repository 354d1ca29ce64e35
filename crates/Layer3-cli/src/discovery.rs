//! Bundle discovery - `*.bundle` files in the services directory

use ignite_foundation::BUNDLE_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Bundle files directly inside `dir`, sorted by path
///
/// A missing directory is created and yields no bundles.
pub fn discover_bundles(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        info!("Created services directory {}", dir.display());
        return Ok(Vec::new());
    }

    let mut bundles = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == BUNDLE_EXTENSION) {
            debug!("Found bundle {}", path.display());
            bundles.push(path);
        }
    }
    bundles.sort();

    info!("Discovered {} bundle(s) in {}", bundles.len(), dir.display());
    Ok(bundles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_dir_is_created() {
        let dir = TempDir::new().unwrap();
        let services = dir.path().join("services");

        assert!(discover_bundles(&services).unwrap().is_empty());
        assert!(services.is_dir());
    }

    #[test]
    fn test_only_bundles_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.bundle", "a.bundle", "notes.txt", "c.bundle.bak"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        fs::create_dir(dir.path().join("nested.bundle")).unwrap();

        let found = discover_bundles(dir.path()).unwrap();
        let names: Vec<_> = found
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.bundle", "b.bundle"]);
    }
}
