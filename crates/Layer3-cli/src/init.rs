//! `ignite init` - default config and services directory

use ignite_foundation::BootConfig;
use std::fs;
use std::path::Path;

/// Write `config` to `config_path` and create its services directory
pub fn init_project(config_path: &Path, config: &BootConfig, force: bool) -> anyhow::Result<()> {
    if config_path.exists() && !force {
        println!("✓ {} already exists.", config_path.display());
        println!("  Use --force to overwrite it.");
        return Ok(());
    }

    config.save(config_path)?;
    println!("  Created {}", config_path.display());

    fs::create_dir_all(&config.services_dir)?;
    println!("  Created {}/", config.services_dir.display());

    println!("\n✓ Ignite initialized. Drop *.bundle files into {} and run `ignite`.", config.services_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ignite_foundation::BOOT_CONFIG_FILE;

    #[test]
    fn test_init_writes_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOOT_CONFIG_FILE);
        let config = BootConfig {
            services_dir: dir.path().join("plugins"),
            monitor_port: Some(7070),
            ..BootConfig::default()
        };

        init_project(&path, &config, false).unwrap();
        assert!(config.services_dir.is_dir());
        assert_eq!(BootConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BOOT_CONFIG_FILE);
        fs::write(&path, "parallel-bootstrap = false\n").unwrap();

        init_project(&path, &BootConfig::default(), false).unwrap();
        assert!(!BootConfig::load(&path).unwrap().parallel_bootstrap);

        let config = BootConfig {
            services_dir: dir.path().join("services"),
            ..BootConfig::default()
        };
        init_project(&path, &config, true).unwrap();
        assert!(BootConfig::load(&path).unwrap().parallel_bootstrap);
    }
}
