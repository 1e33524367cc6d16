//! Contract tests for the advertised prompt templates.

use recon_bridge::mcp::prompts::{self, EXPERT_MODE_PROMPT};
use rmcp::model::{PromptMessageContent, PromptMessageRole};
use serde_json::{json, Map, Value};

fn arguments(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("arguments must be an object"),
    }
}

fn rendered_text(domain: &str) -> String {
    let args = arguments(json!({ "domain": domain }));
    let result = prompts::render(EXPERT_MODE_PROMPT, Some(&args)).expect("render");
    assert_eq!(result.messages.len(), 1);
    let message = &result.messages[0];
    assert_eq!(message.role, PromptMessageRole::User);
    match &message.content {
        PromptMessageContent::Text { text } => text.clone(),
        other => panic!("unexpected content: {other:?}"),
    }
}

#[test]
fn expert_mode_is_listed_with_required_domain() {
    let listed = prompts::all_prompts();
    let prompt = listed
        .iter()
        .find(|prompt| prompt.name == EXPERT_MODE_PROMPT)
        .expect("expert mode prompt");
    let args = prompt.arguments.as_ref().expect("arguments");
    assert_eq!(args.len(), 1);
    assert_eq!(args[0].name, "domain");
    assert_eq!(args[0].required, Some(true));
}

#[test]
fn rendering_names_the_domain_and_the_tools() {
    let text = rendered_text("example.com");
    assert!(text.contains("example.com"));
    for tool in ["launch_scan", "probe_status", "list_schema", "run_query"] {
        assert!(text.contains(tool), "missing {tool}");
    }
}

#[test]
fn domain_is_trimmed() {
    let text = rendered_text("  example.org ");
    assert!(text.contains("target is example.org."));
}

#[test]
fn missing_domain_is_rejected() {
    assert!(prompts::render(EXPERT_MODE_PROMPT, None).is_err());
    let blank = arguments(json!({ "domain": "   " }));
    assert!(prompts::render(EXPERT_MODE_PROMPT, Some(&blank)).is_err());
}

#[test]
fn unknown_prompt_is_rejected() {
    let args = arguments(json!({ "domain": "example.com" }));
    assert!(prompts::render("no_such_prompt", Some(&args)).is_err());
}
