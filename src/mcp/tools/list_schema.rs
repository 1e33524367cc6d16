//! `list_schema` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info_span, Instrument};

use super::util::ToolReply;
use crate::mcp::handler::{AppState, ReconServer};

/// Handle the `list_schema` tool call.
///
/// # Errors
///
/// Never returns a protocol error; failures are reported in the reply text.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let reply = run(&state).instrument(info_span!("list_schema")).await;
    Ok(reply.into_call_result())
}

/// Every `CREATE TABLE` statement in the result store.
pub async fn run(state: &AppState) -> ToolReply {
    if !state.store.exists().await {
        return store_missing(state);
    }

    match state.store.table_definitions().await {
        Ok(definitions) if definitions.is_empty() => {
            ToolReply::ok("The result store exists but has no tables yet.")
        }
        Ok(definitions) => ToolReply::ok(format!(
            "Result store tables ({}):\n\n{}",
            definitions.len(),
            definitions.join("\n\n")
        )),
        Err(err) => ToolReply::error(format!("Could not read the result store schema: {err}")),
    }
}

/// Reply used when the scanner has not created the store file yet.
pub(crate) fn store_missing(state: &AppState) -> ToolReply {
    ToolReply::error(format!(
        "The result store {} does not exist yet. Launch a subdomain scan with launch_scan \
         and wait for probe_status to report it complete.",
        state.store.path().display()
    ))
}
