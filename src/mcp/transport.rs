//! Stdio transport setup for the agent connection.
//!
//! Wires [`ReconServer`] to stdin/stdout. Stdout carries the protocol, so
//! nothing else may write to it; logs go to stderr.

use std::sync::Arc;

use rmcp::service::ServiceExt;
use rmcp::transport::io::stdio;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::handler::{AppState, ReconServer};
use crate::{AppError, Result};

/// Serve the MCP server over stdio until the client disconnects or the
/// cancellation token fires.
///
/// # Errors
///
/// Returns `AppError::Mcp` if the transport fails to initialize or the
/// service ends with an error.
pub async fn serve_stdio(state: Arc<AppState>, ct: CancellationToken) -> Result<()> {
    let server = ReconServer::new(state);
    let transport = stdio();

    info!("starting stdio MCP transport");
    let service = server
        .serve_with_ct(transport, ct)
        .await
        .map_err(|err| AppError::Mcp(format!("stdio transport failed: {err}")))?;

    let reason = service
        .waiting()
        .await
        .map_err(|err| AppError::Mcp(format!("stdio service error: {err}")))?;

    info!(?reason, "stdio MCP transport shut down");
    Ok(())
}
