//! Monitor socket - one JSON status line per connection

use ignite_core::{BundleSummary, Orchestrator};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Payload written to each client
#[derive(Debug, Serialize)]
pub struct MonitorSnapshot {
    pub adapters: usize,
    pub bundles: Vec<BundleSummary>,
}

impl MonitorSnapshot {
    pub fn capture(orchestrator: &Orchestrator) -> Self {
        let bundles = orchestrator.summary();
        Self {
            adapters: bundles.iter().map(|b| b.adapters.len()).sum(),
            bundles,
        }
    }

    /// Single JSON line, newline-terminated
    pub fn to_line(&self) -> anyhow::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

/// Bind the monitor on loopback
pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = TcpListener::bind(addr).await?;
    info!("Monitor listening on {}", listener.local_addr()?);
    Ok(listener)
}

/// Serve connections until the task is aborted
pub fn spawn(listener: TcpListener, orchestrator: Arc<Orchestrator>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let (mut stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    warn!("Monitor accept failed: {}", e);
                    continue;
                }
            };
            debug!("Monitor connection from {}", peer);

            let line = match MonitorSnapshot::capture(&orchestrator).to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!("Monitor snapshot failed: {}", e);
                    continue;
                }
            };

            tokio::spawn(async move {
                if let Err(e) = stream.write_all(line.as_bytes()).await {
                    warn!("Monitor write to {} failed: {}", peer, e);
                }
                let _ = stream.shutdown().await;
            });
        }
    })
}
