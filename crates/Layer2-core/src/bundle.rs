//! Bundle - one plugin archive on disk

use crate::loader::UnitSource;
use ignite_foundation::{ArchiveReader, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// An opened bundle archive with its unit bytes indexed by name
pub struct Bundle {
    location: PathBuf,
    units: HashMap<String, Arc<[u8]>>,
    resources: usize,
}

impl Bundle {
    /// Read the archive at `location`
    ///
    /// When two entries map to the same unit name, the first one wins.
    pub fn open(location: &Path) -> Result<Self> {
        let mut units: HashMap<String, Arc<[u8]>> = HashMap::new();
        let mut resources = 0;

        for entry in ArchiveReader::open(location)? {
            let entry = entry?;
            match entry.unit_name() {
                Some(name) => {
                    if units.contains_key(&name) {
                        warn!("{}: duplicate unit {} ignored", location.display(), name);
                        continue;
                    }
                    units.insert(name, Arc::from(entry.data));
                }
                None => resources += 1,
            }
        }

        debug!(
            "Opened bundle {} ({} units, {} resources)",
            location.display(),
            units.len(),
            resources
        );

        Ok(Self {
            location: location.to_path_buf(),
            units,
            resources,
        })
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// File stem of the archive
    pub fn name(&self) -> String {
        self.location
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.location.display().to_string())
    }

    /// Contained unit names, sorted
    pub fn unit_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.units.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains_unit(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn resource_count(&self) -> usize {
        self.resources
    }
}

impl UnitSource for Bundle {
    fn location(&self) -> &Path {
        &self.location
    }

    fn find_bytes(&self, name: &str) -> Option<Arc<[u8]>> {
        self.units.get(name).cloned()
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("location", &self.location)
            .field("units", &self.units.len())
            .field("resources", &self.resources)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_foundation::{BundleWriter, UnitImage};
    use tempfile::TempDir;

    #[test]
    fn test_open_indexes_units() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("demo.bundle");

        let mut writer = BundleWriter::create(&path).unwrap();
        writer.add_unit(&UnitImage::new("demo.app.Main")).unwrap();
        writer.add_unit(&UnitImage::new("demo.app.Clock")).unwrap();
        writer.add_entry("META/notes.txt", b"hello").unwrap();
        writer.finish().unwrap();

        let bundle = Bundle::open(&path).unwrap();
        assert_eq!(bundle.name(), "demo");
        assert_eq!(bundle.unit_names(), vec!["demo.app.Clock", "demo.app.Main"]);
        assert_eq!(bundle.resource_count(), 1);
        assert!(bundle.find_bytes("demo.app.Main").is_some());
        assert!(bundle.find_bytes("demo.app.Other").is_none());
    }

    #[test]
    fn test_first_duplicate_wins() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dup.bundle");

        let first = UnitImage::new("demo.A").with_tag("first").encode().unwrap();
        let mut writer = BundleWriter::create(&path).unwrap();
        writer.add_unit_bytes("demo.A", &first).unwrap();
        writer.add_unit(&UnitImage::new("demo.A")).unwrap();
        writer.finish().unwrap();

        let bundle = Bundle::open(&path).unwrap();
        assert_eq!(bundle.unit_count(), 1);
        assert_eq!(&*bundle.find_bytes("demo.A").unwrap(), &first[..]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(Bundle::open(&dir.path().join("nope.bundle")).is_err());
    }
}
