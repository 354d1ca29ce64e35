//! # Metadata Scanner
//!
//! Walks a bundle archive entry by entry and classifies compiled units by
//! their metadata tags. Units are decoded only; nothing is defined, linked,
//! or cached, so a scan never affects the bundle's module loader.

use crate::bundle::Bundle;
use crate::service::{ServiceRecord, ServiceRecordBuilder};
use ignite_foundation::{ArchiveReader, Result, UnitImage, SERVICE_TAG, TRACKABLE_TAG};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Visitor called once per compiled unit during a scan
pub trait UnitInspector: Send + Sync {
    fn name(&self) -> &str;

    fn inspect(&self, unit: &str, image: &UnitImage, record: &mut ServiceRecordBuilder);
}

/// Sorts units into the service and trackable sets by exact tag match
#[derive(Debug, Default, Clone, Copy)]
pub struct ServiceClassifier;

impl UnitInspector for ServiceClassifier {
    fn name(&self) -> &str {
        "service-classifier"
    }

    fn inspect(&self, unit: &str, image: &UnitImage, record: &mut ServiceRecordBuilder) {
        for tag in &image.tags {
            match tag.descriptor.as_str() {
                SERVICE_TAG => {
                    debug!("{} is a service", unit);
                    record.add_service(unit);
                }
                TRACKABLE_TAG => {
                    debug!("{} is trackable", unit);
                    record.add_trackable(unit);
                }
                _ => {}
            }
        }
    }
}

// ============================================================================
// MetadataScanner
// ============================================================================

pub struct MetadataScanner {
    inspectors: Vec<Arc<dyn UnitInspector>>,
}

impl MetadataScanner {
    /// Scanner with the service classifier registered
    pub fn new() -> Self {
        Self {
            inspectors: vec![Arc::new(ServiceClassifier)],
        }
    }

    pub fn with_inspector(mut self, inspector: Arc<dyn UnitInspector>) -> Self {
        self.add_inspector(inspector);
        self
    }

    pub fn add_inspector(&mut self, inspector: Arc<dyn UnitInspector>) {
        debug!("Registered unit inspector {}", inspector.name());
        self.inspectors.push(inspector);
    }

    pub fn inspector_count(&self) -> usize {
        self.inspectors.len()
    }

    /// Visit every compiled unit in `bundle` once
    pub fn inspect_all(&self, bundle: &Bundle) -> Result<ServiceRecord> {
        let location = bundle.location();
        let mut record = ServiceRecordBuilder::new(location);
        let mut seen = HashSet::new();

        for entry in ArchiveReader::open(location)? {
            let entry = entry?;
            let Some(unit) = entry.unit_name() else {
                continue;
            };
            if !seen.insert(unit.clone()) {
                continue;
            }

            record.note_scanned();
            let image = match UnitImage::decode(&entry.data) {
                Ok(image) => image,
                Err(e) => {
                    warn!("{}: skipping unreadable unit {}: {}", location.display(), unit, e);
                    continue;
                }
            };

            for inspector in &self.inspectors {
                inspector.inspect(&unit, &image, &mut record);
            }
        }

        let record = record.build();
        info!(
            "Scanned {}: {} units, {} services, {} trackables",
            location.display(),
            record.scanned(),
            record.services().len(),
            record.trackables().len()
        );
        Ok(record)
    }
}

impl Default for MetadataScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_foundation::{BundleWriter, MetadataTag};
    use parking_lot::Mutex;
    use tempfile::TempDir;

    struct Recorder(Mutex<Vec<String>>);

    impl UnitInspector for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn inspect(&self, unit: &str, _: &UnitImage, _: &mut ServiceRecordBuilder) {
            self.0.lock().push(unit.to_string());
        }
    }

    fn write_bundle(dir: &TempDir, build: impl FnOnce(&mut BundleWriter<std::io::BufWriter<std::fs::File>>)) -> Bundle {
        let path = dir.path().join("scan.bundle");
        let mut writer = BundleWriter::create(&path).unwrap();
        build(&mut writer);
        writer.finish().unwrap();
        Bundle::open(&path).unwrap()
    }

    #[test]
    fn test_classification() {
        let dir = TempDir::new().unwrap();
        let bundle = write_bundle(&dir, |w| {
            w.add_unit(&UnitImage::new("demo.Both").with_tag(SERVICE_TAG).with_tag(TRACKABLE_TAG))
                .unwrap();
            w.add_unit(
                &UnitImage::new("demo.Odd")
                    .with_metadata(MetadataTag::new("other.Service").with_value("k", "v")),
            )
            .unwrap();
            w.add_entry("readme.txt", b"not a unit").unwrap();
        });

        let record = MetadataScanner::new().inspect_all(&bundle).unwrap();
        assert!(record.is_service("demo.Both"));
        assert!(record.trackables().contains("demo.Both"));
        assert!(!record.is_service("demo.Odd"));
        assert_eq!(record.scanned(), 2);
    }

    #[test]
    fn test_undecodable_unit_skipped() {
        let dir = TempDir::new().unwrap();
        let bundle = write_bundle(&dir, |w| {
            w.add_unit_bytes("demo.Broken", b"garbage").unwrap();
            w.add_unit(&UnitImage::new("demo.Ok").with_tag(SERVICE_TAG)).unwrap();
        });

        let record = MetadataScanner::new().inspect_all(&bundle).unwrap();
        assert_eq!(record.services().iter().collect::<Vec<_>>(), vec!["demo.Ok"]);
        assert_eq!(record.scanned(), 2);
    }

    #[test]
    fn test_every_unit_visited_once() {
        let dir = TempDir::new().unwrap();
        let bundle = write_bundle(&dir, |w| {
            w.add_unit(&UnitImage::new("demo.A")).unwrap();
            w.add_unit(&UnitImage::new("demo.A")).unwrap();
            w.add_unit(&UnitImage::new("demo.B")).unwrap();
        });

        let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
        let scanner = MetadataScanner::new().with_inspector(recorder.clone());
        assert_eq!(scanner.inspector_count(), 2);

        scanner.inspect_all(&bundle).unwrap();
        assert_eq!(*recorder.0.lock(), vec!["demo.A".to_string(), "demo.B".to_string()]);
    }

    #[test]
    fn test_empty_bundle() {
        let dir = TempDir::new().unwrap();
        let bundle = write_bundle(&dir, |_| {});
        let record = MetadataScanner::new().inspect_all(&bundle).unwrap();
        assert!(record.services().is_empty());
        assert!(record.trackables().is_empty());
        assert_eq!(record.scanned(), 0);
    }
}
