//! Call grammar codec.
//!
//! Recognises the tag vocabulary the system prompt teaches the model:
//!
//! ```text
//! <tool_call><tool_name>NAME</tool_name><parameters>{json}</parameters></tool_call>
//! <agent_call><agent_name>NAME</agent_name><input>free text</input></agent_call>
//! <response>...</response> <task_status>...</task_status>
//! ```
//!
//! Call blocks may span several lines; the captures are lazy so each block
//! ends at its own closing tag. Terminal tags use a plain first-open /
//! first-close scan that is not depth aware.

use crate::domain::calls::{AgentCall, ToolCall};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;

static TOOL_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<tool_call>\s*<tool_name>(.*?)</tool_name>\s*<parameters>\s*(.*?)\s*</parameters>\s*</tool_call>",
    )
    .expect("tool call pattern is valid")
});

static AGENT_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)<agent_call>\s*<agent_name>(.*?)</agent_name>\s*<input>\s*(.*?)\s*</input>\s*</agent_call>",
    )
    .expect("agent call pattern is valid")
});

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("failed to parse parameters for tool {tool}: {source}")]
    InvalidParameters {
        tool: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Extracts every tool call in order of appearance.
///
/// Parameters must be a JSON object. One malformed block fails the whole
/// extraction; no partial list is returned.
pub fn extract_tool_calls(content: &str) -> Result<Vec<ToolCall>, CodecError> {
    TOOL_CALL
        .captures_iter(content)
        .map(|captures| {
            let name = captures[1].trim().to_string();
            let body = captures[2].trim();
            let parameters: Map<String, Value> = serde_json::from_str(body).map_err(|source| {
                CodecError::InvalidParameters {
                    tool: name.clone(),
                    source,
                }
            })?;
            Ok(ToolCall { name, parameters })
        })
        .collect()
}

/// Extracts every agent call in order of appearance. Input is opaque text.
pub fn extract_agent_calls(content: &str) -> Vec<AgentCall> {
    AGENT_CALL
        .captures_iter(content)
        .map(|captures| AgentCall {
            name: captures[1].trim().to_string(),
            input: captures[2].trim().to_string(),
        })
        .collect()
}

/// Returns the text between `<tag>` and the nearest following `</tag>`.
///
/// Repeated blocks are joined with `\n`. A missing opening or closing tag
/// yields an empty string.
pub fn extract_tag(content: &str, tag: &str) -> String {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");

    let mut captures = Vec::new();
    let mut rest = content;
    while let Some(start) = rest.find(&open) {
        let body_start = start + open.len();
        let Some(length) = rest[body_start..].find(&close) else {
            break;
        };
        captures.push(&rest[body_start..body_start + length]);
        rest = &rest[body_start + length + close.len()..];
    }

    captures.join("\n")
}

/// Wraps `content` in `<tag>...</tag>`.
pub fn wrap_tag(tag: &str, content: &str) -> String {
    format!("<{tag}>{content}</{tag}>")
}

/// Renders a tool call in the grammar the model is taught.
pub fn render_tool_call(call: &ToolCall) -> String {
    let parameters = Value::Object(call.parameters.clone());
    format!(
        "<tool_call><tool_name>{}</tool_name><parameters>{parameters}</parameters></tool_call>",
        call.name
    )
}
