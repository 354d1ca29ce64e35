//! `ignite inspect` - scan one bundle without loading it

use ignite_core::{Bundle, MetadataScanner};
use serde::Serialize;
use std::path::Path;

/// What a scan of one bundle found
#[derive(Debug, Serialize)]
pub struct InspectReport {
    pub bundle: String,
    pub units: Vec<String>,
    pub services: Vec<String>,
    pub trackables: Vec<String>,
}

impl InspectReport {
    pub fn collect(path: &Path) -> anyhow::Result<Self> {
        let bundle = Bundle::open(path)?;
        let record = MetadataScanner::new().inspect_all(&bundle)?;

        Ok(Self {
            bundle: bundle.name(),
            units: bundle.unit_names(),
            services: record.services().iter().cloned().collect(),
            trackables: record.trackables().iter().cloned().collect(),
        })
    }

    pub fn render_text(&self) -> String {
        let mut out = format!("Bundle {} ({} units)\n", self.bundle, self.units.len());
        for unit in &self.units {
            let mut marks = Vec::new();
            if self.services.contains(unit) {
                marks.push("service");
            }
            if self.trackables.contains(unit) {
                marks.push("trackable");
            }
            if marks.is_empty() {
                out.push_str(&format!("  {}\n", unit));
            } else {
                out.push_str(&format!("  {} [{}]\n", unit, marks.join(", ")));
            }
        }
        out
    }
}

pub fn inspect_bundle(path: &Path, json: bool) -> anyhow::Result<()> {
    let report = InspectReport::collect(path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_foundation::{BundleWriter, UnitImage, SERVICE_TAG, TRACKABLE_TAG};

    #[test]
    fn test_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clock.bundle");
        let mut writer = BundleWriter::create(&path).unwrap();
        writer
            .add_unit(&UnitImage::new("demo.Clock").with_tag(SERVICE_TAG).with_tag(TRACKABLE_TAG))
            .unwrap();
        writer.add_unit(&UnitImage::new("demo.Util")).unwrap();
        writer.finish().unwrap();

        let report = InspectReport::collect(&path).unwrap();
        assert_eq!(report.bundle, "clock");
        assert_eq!(report.services, vec!["demo.Clock"]);
        assert_eq!(
            report.render_text(),
            "Bundle clock (2 units)\n  demo.Clock [service, trackable]\n  demo.Util\n"
        );
    }
}
