//! `ignite pack` - build a bundle from a TOML manifest
//!
//! ```toml
//! [[units]]
//! name = "demo.Clock"
//! tags = [{ descriptor = "ignite.Service" }]
//!
//! [[units.functions]]
//! name = "startService"
//! access = { visibility = "Public", is_static = true }
//! body = [{ Log = { message = "clock started" } }]
//!
//! [[resources]]
//! path = "META/readme.txt"
//! file = "readme.txt"      # relative to the manifest
//! ```

use anyhow::{bail, Context};
use ignite_foundation::{BundleWriter, UnitImage, UNIT_SUFFIX};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct PackManifest {
    #[serde(default)]
    pub units: Vec<UnitImage>,

    #[serde(default)]
    pub resources: Vec<ResourceSpec>,
}

/// A non-unit file carried in the bundle
#[derive(Debug, Deserialize)]
pub struct ResourceSpec {
    /// Entry path inside the archive
    pub path: String,
    /// Source file, relative to the manifest
    pub file: PathBuf,
}

impl PackManifest {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let manifest: PackManifest = toml::from_str(raw)?;

        let mut names = HashSet::new();
        for unit in &manifest.units {
            if unit.name.trim().is_empty() {
                bail!("unit with an empty name");
            }
            if !names.insert(unit.name.as_str()) {
                bail!("unit {} declared twice", unit.name);
            }
        }
        for resource in &manifest.resources {
            if resource.path.ends_with(UNIT_SUFFIX) {
                bail!("resource path {} uses the unit suffix", resource.path);
            }
        }

        Ok(manifest)
    }
}

/// Write the bundle; returns the number of units packed
pub fn pack_manifest(manifest_path: &Path, output: &Path) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;
    let manifest = PackManifest::parse(&raw)
        .with_context(|| format!("invalid manifest {}", manifest_path.display()))?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut writer = BundleWriter::create(output)?;
    for unit in &manifest.units {
        debug!("Packing unit {}", unit.name);
        writer.add_unit(unit)?;
    }
    for resource in &manifest.resources {
        let source = base.join(&resource.file);
        let data = std::fs::read(&source)
            .with_context(|| format!("reading resource {}", source.display()))?;
        writer.add_entry(&resource.path, &data)?;
    }
    writer.finish()?;

    Ok(manifest.units.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_core::Bundle;
    use ignite_foundation::{Instruction, Visibility, SERVICE_TAG};

    const MANIFEST: &str = r#"
[[units]]
name = "demo.Clock"
tags = [{ descriptor = "ignite.Service" }]

[[units.functions]]
name = "startService"
access = { visibility = "Private", is_static = true }
body = [{ Log = { message = "tick" } }, { Invoke = { symbol = "ignite.runtime.noop" } }]

[[units.functions]]
name = "stopService"
access = { visibility = "Public", is_static = true }

[[units]]
name = "demo.Util"

[[resources]]
path = "META/readme.txt"
file = "readme.txt"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = PackManifest::parse(MANIFEST).unwrap();
        let clock = &manifest.units[0];
        assert!(clock.has_tag(SERVICE_TAG));

        let start = clock.function("startService").unwrap();
        assert_eq!(start.access.visibility, Visibility::Private);
        assert!(start.is_parameterless_static());
        assert_eq!(start.body[0], Instruction::log("tick"));
        assert_eq!(manifest.units[1].functions.len(), 0);
    }

    #[test]
    fn test_duplicate_units_rejected() {
        let raw = "[[units]]\nname = \"a.B\"\n[[units]]\nname = \"a.B\"\n";
        assert!(PackManifest::parse(raw).is_err());
    }

    #[test]
    fn test_pack_writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("clock.toml");
        std::fs::write(&manifest, MANIFEST).unwrap();
        std::fs::write(dir.path().join("readme.txt"), "hello").unwrap();

        let output = dir.path().join("clock.bundle");
        assert_eq!(pack_manifest(&manifest, &output).unwrap(), 2);

        let bundle = Bundle::open(&output).unwrap();
        assert_eq!(bundle.unit_names(), vec!["demo.Clock", "demo.Util"]);
        assert_eq!(bundle.resource_count(), 1);
    }

    #[test]
    fn test_missing_resource_file() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("m.toml");
        std::fs::write(&manifest, "[[resources]]\npath = \"x.txt\"\nfile = \"nope.txt\"\n").unwrap();

        let err = pack_manifest(&manifest, &dir.path().join("out.bundle")).unwrap_err();
        assert!(format!("{:#}", err).contains("nope.txt"));
    }
}
