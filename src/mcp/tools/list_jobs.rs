//! `list_jobs` MCP tool handler.
//!
//! Lists what this bridge process has launched. The registry is in-memory,
//! so jobs started before a restart do not appear here.

use std::fmt::Write as _;
use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::ToolReply;
use crate::mcp::handler::{AppState, ReconServer};
use crate::models::job::JobState;

/// Handle the `list_jobs` tool call.
///
/// # Errors
///
/// Never returns a protocol error.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let reply = run(&state).instrument(info_span!("list_jobs")).await;
    Ok(reply.into_call_result())
}

/// One line per tracked job.
pub async fn run(state: &AppState) -> ToolReply {
    let jobs = state.registry().snapshot().await;
    if jobs.is_empty() {
        return ToolReply::ok("No scans have been launched since the bridge started.");
    }

    let mut text = String::new();
    for job in jobs {
        let pid = job
            .pid
            .map_or_else(|| "pid unknown".to_owned(), |pid| format!("pid {pid}"));
        let _ = writeln!(
            text,
            "- {} {}: {} ({pid}, started {})",
            job.kind,
            job.target,
            describe_state(job.state),
            job.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
    ToolReply::ok(text.trim_end().to_owned())
}

fn describe_state(state: JobState) -> String {
    match state {
        JobState::Running => "running".to_owned(),
        JobState::Exited(Some(code)) => format!("exited with code {code}"),
        JobState::Exited(None) => "terminated by signal".to_owned(),
        JobState::Unknown => "state unknown".to_owned(),
    }
}
