//! `launch_scan` MCP tool handler.
//!
//! Starts the scanner detached and replies immediately. Completion is
//! observed later through `probe_status`.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::{self, TargetInput, ToolReply};
use crate::mcp::handler::{AppState, ReconServer};
use crate::models::job::LaunchOutcome;
use crate::models::scanner::ScannerKind;
use crate::models::target::TargetKey;

/// Handle the `launch_scan` tool call.
///
/// # Errors
///
/// Never returns a protocol error; failures are reported in the reply text.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: TargetInput = match util::parse_arguments("launch_scan", context.arguments) {
        Ok(input) => input,
        Err(reply) => return Ok(reply.into_call_result()),
    };

    let span = info_span!("launch_scan", target = %input.target, scanner = %input.scanner);
    let reply = run(&state, &input.target, input.scanner)
        .instrument(span)
        .await;
    Ok(reply.into_call_result())
}

/// Launch `scanner` against `target` unless it is already running.
pub async fn run(state: &AppState, target: &str, scanner: ScannerKind) -> ToolReply {
    let target = match TargetKey::parse(target) {
        Ok(target) => target,
        Err(err) => return err.into(),
    };

    let command = state.config.scanner(scanner);
    let outcome = state
        .launcher
        .launch(command, state.config.reports_dir(), &target)
        .await;

    match outcome {
        Ok(LaunchOutcome::Started { pid }) => ToolReply::ok(format!(
            "Started {scanner} scan for {target} in the background ({}). \
             Check back with probe_status(target=\"{target}\", scanner=\"{scanner}\") in 1-2 minutes.",
            describe_pid(pid)
        )),
        Ok(LaunchOutcome::AlreadyRunning { pid, started_at }) => ToolReply::ok(format!(
            "A {scanner} scan for {target} is already running ({}, started {}). \
             No new scan was launched; check progress with probe_status.",
            describe_pid(pid),
            started_at.format("%Y-%m-%d %H:%M:%S UTC")
        )),
        Err(err) => ToolReply::error(format!(
            "Failed to launch {scanner} scan for {target}: {err}. \
             Run self_test(scanner=\"{scanner}\") to check the scanner installation."
        )),
    }
}

fn describe_pid(pid: Option<u32>) -> String {
    pid.map_or_else(|| "pid unknown".to_owned(), |pid| format!("pid {pid}"))
}
