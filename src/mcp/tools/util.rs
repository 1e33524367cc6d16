//! Shared utilities for MCP tool handlers.

use rmcp::model::{CallToolResult, Content};
use serde::de::DeserializeOwned;

use crate::models::scanner::ScannerKind;
use crate::AppError;

/// Text reply of a tool call.
///
/// Every outcome, including failures, is reported to the agent as text so
/// it can decide what to do next; `is_error` only flags the result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolReply {
    /// Human-readable reply.
    pub text: String,
    /// Whether the call failed.
    pub is_error: bool,
}

impl ToolReply {
    /// Successful reply.
    #[must_use]
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    /// Failed reply.
    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    /// Convert into the protocol result type.
    #[must_use]
    pub fn into_call_result(self) -> CallToolResult {
        let content = vec![Content::text(self.text)];
        if self.is_error {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        }
    }
}

impl From<AppError> for ToolReply {
    fn from(err: AppError) -> Self {
        Self::error(err.to_string())
    }
}

/// Deserialize tool arguments into `T`.
///
/// Missing arguments deserialize to the input's defaults. Malformed ones
/// produce an `invalid argument` reply instead of a protocol error.
///
/// # Errors
///
/// Returns the reply to send back when the arguments do not match `T`.
pub fn parse_arguments<T: DeserializeOwned>(
    tool: &str,
    arguments: Option<serde_json::Map<String, serde_json::Value>>,
) -> Result<T, ToolReply> {
    let args = arguments.unwrap_or_default();
    serde_json::from_value(serde_json::Value::Object(args)).map_err(|err| {
        ToolReply::from(AppError::InvalidArgument(format!(
            "invalid {tool} parameters: {err}"
        )))
    })
}

/// Arguments shared by the per-target tools.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct TargetInput {
    /// Target domain.
    #[serde(alias = "domain")]
    pub target: String,
    /// Scanner to act on.
    pub scanner: ScannerKind,
}
