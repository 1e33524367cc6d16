//! `run_query` MCP tool handler.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolCallContext;
use rmcp::model::CallToolResult;
use tracing::{info, info_span, Instrument};

use super::list_schema::store_missing;
use super::util::{self, ToolReply};
use crate::format;
use crate::mcp::handler::{AppState, ReconServer};
use crate::AppError;

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RunQueryInput {
    #[serde(alias = "query")]
    sql: String,
}

/// Handle the `run_query` tool call.
///
/// # Errors
///
/// Never returns a protocol error; failures are reported in the reply text.
pub async fn handle(
    context: ToolCallContext<'_, ReconServer>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    let state = Arc::clone(context.service.state());
    let input: RunQueryInput = match util::parse_arguments("run_query", context.arguments) {
        Ok(input) => input,
        Err(reply) => return Ok(reply.into_call_result()),
    };

    let reply = run(&state, &input.sql)
        .instrument(info_span!("run_query"))
        .await;
    Ok(reply.into_call_result())
}

/// Execute `sql` and render at most `max_rows` rows as a table.
pub async fn run(state: &AppState, sql: &str) -> ToolReply {
    if sql.trim().is_empty() {
        return AppError::InvalidArgument("sql must not be empty".into()).into();
    }
    if !state.store.exists().await {
        return store_missing(state);
    }

    match state.store.query(sql).await {
        Ok(output) if output.is_empty() => ToolReply::ok(format::NO_RESULTS),
        Ok(output) => {
            info!(rows = output.len(), "query returned rows");
            ToolReply::ok(format::render_table(
                &output.columns,
                &output.rows,
                state.config.max_rows,
            ))
        }
        Err(AppError::StoreBusy(msg)) => ToolReply::ok(format!(
            "Pending: the result store is busy ({msg}). A scan is still writing to it; retry in a minute."
        )),
        Err(err) => ToolReply::error(format!("Query failed: {err}")),
    }
}
