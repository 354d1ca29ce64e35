//! CLI integration tests - drives the `ignite` binary
//!
//! `cargo test -p ignite-cli --test cli_test`

use std::path::Path;
use std::process::{Command, Output};

const MANIFEST: &str = r#"
[[units]]
name = "demo.Clock"
tags = [{ descriptor = "ignite.Service" }, { descriptor = "ignite.TrackableUnit" }]

[[units.functions]]
name = "startService"
access = { visibility = "Public", is_static = true }
body = [{ Log = { message = "clock started" } }]

[[units.functions]]
name = "stopService"
access = { visibility = "Public", is_static = true }

[[units]]
name = "demo.Helper"
"#;

fn ignite(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ignite"))
        .current_dir(cwd)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run ignite")
}

#[test]
fn test_pack_then_inspect_json() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clock.toml"), MANIFEST).unwrap();

    let packed = ignite(dir.path(), &["pack", "clock.toml", "-o", "clock.bundle"]);
    assert!(packed.status.success(), "{}", String::from_utf8_lossy(&packed.stderr));
    assert!(dir.path().join("clock.bundle").is_file());

    let inspected = ignite(dir.path(), &["inspect", "clock.bundle", "--json"]);
    assert!(inspected.status.success());

    let report: serde_json::Value = serde_json::from_slice(&inspected.stdout).unwrap();
    assert_eq!(report["bundle"], "clock");
    assert_eq!(report["services"], serde_json::json!(["demo.Clock"]));
    assert_eq!(report["trackables"], serde_json::json!(["demo.Clock"]));
    assert_eq!(report["units"].as_array().unwrap().len(), 2);
}

#[test]
fn test_init_creates_config_and_services() {
    let dir = tempfile::tempdir().unwrap();

    let out = ignite(dir.path(), &["init", "--services-dir", "plugins"]);
    assert!(out.status.success());

    let config = std::fs::read_to_string(dir.path().join("ignite.toml")).unwrap();
    assert!(config.contains("services-dir = \"plugins\""));
    assert!(dir.path().join("plugins").is_dir());
}

#[test]
fn test_invalid_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ignite.toml"), "monitor-port = 0\n").unwrap();

    let out = ignite(dir.path(), &["inspect", "whatever.bundle"]);
    assert!(!out.status.success());
}
