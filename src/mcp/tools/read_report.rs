//! `read_report` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::{self, ToolReply};
use crate::mcp::handler::{AppState, ReconServer};
use crate::models::target::TargetKey;
use crate::report;
use crate::AppError;

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ReadReportInput {
    #[serde(alias = "domain")]
    target: String,
}

/// Handle the `read_report` tool call.
///
/// # Errors
///
/// Never returns a protocol error; failures are reported in the reply text.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: ReadReportInput = match util::parse_arguments("read_report", context.arguments) {
        Ok(input) => input,
        Err(reply) => return Ok(reply.into_call_result()),
    };

    let span = info_span!("read_report", target = %input.target);
    let reply = run(&state, &input.target).instrument(span).await;
    Ok(reply.into_call_result())
}

/// Return the full directory scan report for `target`.
pub async fn run(state: &AppState, target: &str) -> ToolReply {
    let target = match TargetKey::parse(target) {
        Ok(target) => target,
        Err(err) => return err.into(),
    };

    match report::read_report(state.config.reports_dir(), &target).await {
        Ok(contents) if contents.trim().is_empty() => {
            ToolReply::ok(format!("The report for {target} is empty."))
        }
        Ok(contents) => ToolReply::ok(contents),
        Err(AppError::NotFound(_)) => ToolReply::error(format!(
            "No report for {target} yet. Check probe_status(target=\"{target}\", \
             scanner=\"directory\") and retry once it reports complete."
        )),
        Err(err) => err.into(),
    }
}
