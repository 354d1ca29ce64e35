//! Ignite CLI - Main entry point

mod discovery;
mod init;
mod inspect;
mod logging;
mod monitor;
mod pack;

use clap::{Parser, Subcommand};
use ignite_core::{HostRuntime, Orchestrator, OrchestratorConfig};
use ignite_foundation::{BootConfig, BOOT_CONFIG_FILE};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Ignite - discovers plugin bundles and runs their services
#[derive(Parser, Debug)]
#[command(name = "ignite")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Boot configuration file
    #[arg(long, global = true, default_value = BOOT_CONFIG_FILE)]
    config: PathBuf,

    /// Directory scanned for bundles (overrides the config file)
    #[arg(long, global = true)]
    services_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bootstrap all bundles and run until Ctrl-C (default)
    Run,
    /// Scan one bundle and list its services and trackables
    Inspect {
        /// Bundle file
        bundle: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write a default config file and create the services directory
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
    /// Build a bundle from a TOML manifest
    Pack {
        /// Manifest file
        manifest: PathBuf,

        /// Output bundle path
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = BootConfig::load(&args.config)?;
    if let Some(dir) = args.services_dir {
        config.services_dir = dir;
    }

    match args.command.unwrap_or(Command::Run) {
        Command::Init { force } => init::init_project(&args.config, &config, force),
        Command::Inspect { bundle, json } => {
            logging::init(args.debug, None)?;
            inspect::inspect_bundle(&bundle, json)
        }
        Command::Pack { manifest, output } => {
            logging::init(args.debug, None)?;
            let count = pack::pack_manifest(&manifest, &output)?;
            println!("✓ Packed {} unit(s) into {}", count, output.display());
            Ok(())
        }
        Command::Run => run(config, args.debug).await,
    }
}

async fn run(config: BootConfig, debug: bool) -> anyhow::Result<()> {
    logging::init(debug, config.log_file_path().as_deref())?;
    info!("Ignite {} starting", env!("CARGO_PKG_VERSION"));

    let host = Arc::new(HostRuntime::with_builtins());
    let orchestrator = Arc::new(Orchestrator::new(host, OrchestratorConfig::from(&config)));

    let monitor = match config.monitor_port {
        Some(port) => {
            let listener = monitor::bind(port).await?;
            Some(monitor::spawn(listener, Arc::clone(&orchestrator)))
        }
        None => None,
    };

    let locations = discovery::discover_bundles(&config.services_dir)?;
    if locations.is_empty() {
        warn!("No bundles found in {}", config.services_dir.display());
    }

    let booting = Arc::clone(&orchestrator);
    let bootstrap = tokio::task::spawn_blocking(move || booting.bootstrap(&locations)).await?;
    if let Err(e) = bootstrap {
        error!("Bootstrap failed: {}", e);
        return Err(e.into());
    }

    let starting = Arc::clone(&orchestrator);
    let report = tokio::task::spawn_blocking(move || starting.start_all()).await?;
    if report.is_success() {
        info!("{}", report);
    } else {
        error!("{}", report);
    }

    info!("Running; press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    let stopping = Arc::clone(&orchestrator);
    let report = tokio::task::spawn_blocking(move || stopping.stop_all()).await?;
    info!("{}", report);

    if let Some(handle) = monitor {
        handle.abort();
    }

    report.into_result()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_run() {
        let args = Args::try_parse_from(["ignite"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.config, PathBuf::from(BOOT_CONFIG_FILE));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "ignite",
            "inspect",
            "a.bundle",
            "--json",
            "--services-dir",
            "plugins",
            "-d",
        ])
        .unwrap();

        assert!(args.debug);
        assert_eq!(args.services_dir, Some(PathBuf::from("plugins")));
        match args.command {
            Some(Command::Inspect { bundle, json }) => {
                assert_eq!(bundle, PathBuf::from("a.bundle"));
                assert!(json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_pack_requires_output() {
        assert!(Args::try_parse_from(["ignite", "pack", "units.toml"]).is_err());
        assert!(Args::try_parse_from(["ignite", "pack", "units.toml", "-o", "x.bundle"]).is_ok());
    }
}
