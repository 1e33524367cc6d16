//! `probe_status` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::{self, TargetInput, ToolReply};
use crate::mcp::handler::{AppState, ReconServer};
use crate::models::job::{PendingReason, ProbeStatus};
use crate::models::scanner::ScannerKind;
use crate::models::target::TargetKey;

/// Handle the `probe_status` tool call.
///
/// # Errors
///
/// Never returns a protocol error; failures are reported in the reply text.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: TargetInput = match util::parse_arguments("probe_status", context.arguments) {
        Ok(input) => input,
        Err(reply) => return Ok(reply.into_call_result()),
    };

    let span = info_span!("probe_status", target = %input.target, scanner = %input.scanner);
    let reply = run(&state, &input.target, input.scanner)
        .instrument(span)
        .await;
    Ok(reply.into_call_result())
}

/// Report whether the artifact for `target` exists yet.
pub async fn run(state: &AppState, target: &str, scanner: ScannerKind) -> ToolReply {
    let target = match TargetKey::parse(target) {
        Ok(target) => target,
        Err(err) => return err.into(),
    };

    match state.prober.probe(scanner, &target).await {
        Ok(status) => ToolReply::ok(describe(scanner, &target, &status)),
        Err(err) => ToolReply::error(format!("Could not check {target}: {err}")),
    }
}

fn describe(scanner: ScannerKind, target: &TargetKey, status: &ProbeStatus) -> String {
    match (scanner, status) {
        (ScannerKind::Subdomain, ProbeStatus::Complete { artifact }) => format!(
            "Complete: the subdomain scan for {target} has finished. Results are in table \
             `{artifact}`; use list_schema and run_query to analyze them."
        ),
        (ScannerKind::Directory, ProbeStatus::Complete { artifact }) => format!(
            "Complete: the directory scan for {target} has finished. Report `{artifact}.txt` \
             is ready; read it with read_report(target=\"{target}\")."
        ),
        (_, ProbeStatus::Pending { reason: PendingReason::StoreMissing, .. }) => format!(
            "Pending: the result store has not been created yet, so the {scanner} scan for \
             {target} is still starting up or has not been launched. Check again in a minute or two."
        ),
        (_, ProbeStatus::Pending { reason: PendingReason::StoreBusy, .. }) => format!(
            "Pending: the result store is busy (a scan is writing to it), so the {scanner} scan \
             for {target} is still in progress. Check again in a minute or two."
        ),
        (_, ProbeStatus::Pending { artifact, reason: PendingReason::ArtifactMissing }) => format!(
            "Pending: `{artifact}` does not exist yet, so the {scanner} scan for {target} is \
             still running or was never launched. Check again in a minute or two."
        ),
    }
}
