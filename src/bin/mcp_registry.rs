//! Runs the MCP registry HTTP server.
//!
//! Usage:
//!
//! ```text
//! mcp-registry [--config registry.yaml] [--listen 0.0.0.0:8000]
//! ```
//!
//! Every flag can also be supplied through an `MCP_REGISTRY_*` environment
//! variable. Flags override values from the configuration file. Servers
//! listed under `servers:` are registered before the listener starts.

use camino::Utf8PathBuf;
use clap::{ArgAction, Parser};
use eyre::{Result, WrapErr};
use mcp_registry::api::{AppState, app};
use mcp_registry::config::{LogFormat, RegistryConfig};
use mcp_registry::telemetry::init_logging;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "mcp-registry", version, about, long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, env = "MCP_REGISTRY_CONFIG", value_name = "FILE")]
    config: Option<Utf8PathBuf>,

    /// Address to listen on
    #[arg(long, env = "MCP_REGISTRY_LISTEN", value_name = "ADDR")]
    listen: Option<SocketAddr>,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, env = "MCP_REGISTRY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "MCP_REGISTRY_LOG_JSON", action = ArgAction::SetTrue)]
    log_json: bool,

    /// Seconds between health probes of each server
    #[arg(long, env = "MCP_REGISTRY_PROBE_INTERVAL_SECS", value_name = "SECS")]
    probe_interval_secs: Option<u64>,

    /// Disable background health probing
    #[arg(long, env = "MCP_REGISTRY_NO_PROBE", action = ArgAction::SetTrue)]
    no_probe: bool,

    /// Refuse tool calls to servers whose last probe failed
    #[arg(long, env = "MCP_REGISTRY_BLOCK_UNHEALTHY", action = ArgAction::SetTrue)]
    block_unhealthy: bool,
}

impl Cli {
    fn into_config(self) -> Result<RegistryConfig> {
        let mut config = match &self.config {
            Some(path) => RegistryConfig::load(path)
                .wrap_err_with(|| format!("failed to load configuration from {path}"))?,
            None => RegistryConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if self.log_json {
            config.log_format = LogFormat::Json;
        }
        if let Some(interval) = self.probe_interval_secs {
            config.probe.interval_secs = interval;
        }
        if self.no_probe {
            config.probe.enabled = false;
        }
        if self.block_unhealthy {
            config.invocation.block_unhealthy = true;
        }

        config.validate().wrap_err("invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Cli::parse().into_config()?;
    init_logging(&config.log_level, config.log_format)?;

    let state = Arc::new(AppState::from_config(&config).wrap_err("failed to build HTTP client")?);
    for request in config.servers.iter().cloned() {
        let name = request.name.clone();
        state
            .registry()
            .register(request)
            .await
            .wrap_err_with(|| format!("failed to register seed server '{name}'"))?;
    }
    info!(servers = config.servers.len(), "seed servers registered");

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .wrap_err_with(|| format!("failed to bind to {}", config.listen_addr))?;
    info!(addr = %config.listen_addr, "registry listening");

    axum::serve(listener, app(Arc::clone(&state)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .wrap_err("HTTP server failed")?;

    state.shutdown().await;
    info!("registry stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
