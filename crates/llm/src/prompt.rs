//! Chat messages and prompt assembly
//!
//! Tools are offered to the model as text in the system prompt and called
//! back with a `[TOOL_CALL: {"name": ..., "arguments": {...}}]` marker, so
//! any chat backend can drive them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const TOOL_CALL_MARKER: &str = "[TOOL_CALL:";

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Result of a tool the model asked for
    Tool,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "system"),
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn tool(content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
        }
    }
}

/// A tool as the model sees it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool call found in model output
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedToolCall {
    pub name: String,
    pub arguments: Value,
    /// Whatever the model wrote before the marker
    pub text_before: String,
}

/// Extract the first `[TOOL_CALL: {...}]` from a reply
///
/// The JSON object is read with a streaming deserializer so brackets inside
/// argument values do not end the call early.
pub fn parse_tool_call(response: &str) -> Option<ParsedToolCall> {
    let start = response.find(TOOL_CALL_MARKER)?;
    let rest = &response[start + TOOL_CALL_MARKER.len()..];

    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    let value = stream.next()?.ok()?;
    if !rest[stream.byte_offset()..].trim_start().starts_with(']') {
        return None;
    }

    let name = value.get("name")?.as_str()?.to_string();
    let arguments = value
        .get("arguments")
        .cloned()
        .unwrap_or_else(|| Value::Object(Default::default()));

    Some(ParsedToolCall {
        name,
        arguments,
        text_before: response[..start].trim().to_string(),
    })
}

fn render_tools(tools: &[ToolDefinition]) -> String {
    let mut out = String::from("You can call these tools:\n");
    for tool in tools {
        out.push_str(&format!(
            "- {}: {}\n  arguments schema: {}\n",
            tool.name, tool.description, tool.parameters
        ));
    }
    out.push_str(
        "\nTo call a tool, reply with only \
         [TOOL_CALL: {\"name\": \"<tool name>\", \"arguments\": {...}}]. \
         The result comes back in the next message; use it to answer the user.",
    );
    out
}

/// Builds a message list: one system prompt, optional context blocks, then the question
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    system: Option<String>,
    context: Vec<String>,
    tools: Vec<ToolDefinition>,
    messages: Vec<Message>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn system(mut self, prompt: impl Into<String>) -> Self {
        self.system = Some(prompt.into());
        self
    }

    /// Add a retrieved context block, rendered into the system message
    pub fn context(mut self, block: impl Into<String>) -> Self {
        self.context.push(block.into());
        self
    }

    /// Offer tools, rendered into the system message
    pub fn tools(mut self, tools: &[ToolDefinition]) -> Self {
        self.tools.extend_from_slice(tools);
        self
    }

    pub fn user(mut self, content: impl Into<String>) -> Self {
        self.messages.push(Message::user(content));
        self
    }

    pub fn build(self) -> Vec<Message> {
        let mut out = Vec::with_capacity(self.messages.len() + 1);

        let mut system = self.system.unwrap_or_default();
        if !self.context.is_empty() {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str("Context:\n");
            system.push_str(&self.context.join("\n\n"));
        }
        if !self.tools.is_empty() {
            if !system.is_empty() {
                system.push_str("\n\n");
            }
            system.push_str(&render_tools(&self.tools));
        }
        if !system.is_empty() {
            out.push(Message::system(system));
        }

        out.extend(self.messages);
        out
    }
}
