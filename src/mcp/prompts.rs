//! Prompt templates advertised to the connecting agent.
//!
//! The expert-mode prompt walks an analyst through the full scan workflow
//! for one domain: launch, wait for completion, then analyze the results.

use rmcp::model::{GetPromptResult, Prompt, PromptArgument, PromptMessage, PromptMessageRole};
use serde_json::{Map, Value};

/// Name of the guided reconnaissance prompt.
pub const EXPERT_MODE_PROMPT: &str = "pentest_expert_mode";

/// Every prompt the server offers.
#[must_use]
pub fn all_prompts() -> Vec<Prompt> {
    vec![Prompt::new(
        EXPERT_MODE_PROMPT,
        Some("Act as a senior penetration tester and run the full reconnaissance workflow against a domain."),
        Some(vec![PromptArgument {
            name: "domain".into(),
            title: None,
            description: Some("Target domain, e.g. example.com".into()),
            required: Some(true),
        }]),
    )]
}

/// Render prompt `name` with the caller's arguments.
///
/// # Errors
///
/// Returns an `invalid_params` error for an unknown prompt or a missing or
/// blank `domain` argument.
pub fn render(
    name: &str,
    arguments: Option<&Map<String, Value>>,
) -> Result<GetPromptResult, rmcp::ErrorData> {
    if name != EXPERT_MODE_PROMPT {
        return Err(rmcp::ErrorData::invalid_params(
            format!("unknown prompt: {name}"),
            None,
        ));
    }

    let domain = arguments
        .and_then(|args| args.get("domain"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|domain| !domain.is_empty())
        .ok_or_else(|| {
            rmcp::ErrorData::invalid_params("prompt argument `domain` is required", None)
        })?;

    Ok(GetPromptResult {
        description: Some(format!("Reconnaissance of {domain}")),
        messages: vec![PromptMessage::new_text(
            PromptMessageRole::User,
            expert_mode_text(domain),
        )],
    })
}

fn expert_mode_text(domain: &str) -> String {
    format!(
        "You are a senior penetration tester with ten years of experience. Your target is \
         {domain}.\n\
         \n\
         Working rules:\n\
         1. Start collection yourself: call launch_scan(target=\"{domain}\") without asking first.\n\
         2. Check progress with probe_status(target=\"{domain}\"). While it reports pending, tell \
         the user the scan is still running and that it usually takes several minutes.\n\
         3. As soon as it reports complete, call list_schema and start analyzing with run_query.\n\
         \n\
         Analysis steps:\n\
         - Basic statistics: total number of subdomains and number of distinct IPs.\n\
         - Sensitive assets: subdomains containing admin, test, dev, api or v1.\n\
         - Risk assessment: exposed services and any open port other than 80 and 443.\n\
         - Summary: close with a short findings report.\n\
         \n\
         Answer as a structured professional report. If a query fails, fix the SQL and run it \
         again.\n\
         \n\
         Begin the assessment of {domain} now."
    )
}
