#![forbid(unsafe_code)]

//! `recon-bridge`: MCP server binary.
//!
//! Loads configuration, resolves the scanner installations, and serves the
//! reconnaissance tools over stdio until the client disconnects or the
//! process is signalled.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use recon_bridge::config::GlobalConfig;
use recon_bridge::mcp::handler::AppState;
use recon_bridge::mcp::transport;
use recon_bridge::models::scanner::ScannerKind;
use recon_bridge::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "recon-bridge", about = "MCP bridge for reconnaissance scanners", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log output format (text or json). Logs always go to stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Override the directory holding the scanner installations.
    #[arg(long)]
    tools_root: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("recon-bridge bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match &args.config {
        Some(path) => GlobalConfig::load_from_path(path)?,
        None => GlobalConfig::default_layout()?,
    };
    if let Some(root) = args.tools_root {
        config = config.with_tools_root(root)?;
    }

    for kind in ScannerKind::ALL {
        let command = config.scanner(kind);
        if !command.script.is_file() {
            warn!(
                scanner = %kind,
                script = %command.script.display(),
                "scanner script not found; launches will fail until it is installed"
            );
        }
    }
    info!(
        tools_root = %config.tools_root.display(),
        store = %config.store_path().display(),
        reports = %config.reports_dir().display(),
        "configuration loaded"
    );

    let state = Arc::new(AppState::new(config));

    // ── Serve until shutdown ────────────────────────────
    let ct = CancellationToken::new();
    let signal_ct = ct.clone();
    let signal_handle = tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received");
        signal_ct.cancel();
    });

    info!("MCP server ready");
    let served = transport::serve_stdio(state, ct).await;
    signal_handle.abort();

    info!("recon-bridge shut down; launched scans keep running");
    served
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

/// Stdout carries the protocol, so every log line goes to stderr.
fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
