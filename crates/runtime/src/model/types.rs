use super::errors::GatewayError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One piece of a message's content.
///
/// Assistant messages carry `Text` and `ToolUse` blocks; `ToolResult`
/// blocks are synthesized locally after a tool executes and always travel
/// in a `user` message. Matching is exhaustive so the conversation loop's
/// handling of each kind stays structurally checkable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },
    /// The model's request to invoke a named tool.
    ToolUse {
        /// Identifier correlating this request with its result.
        id: String,
        name: String,
        input: Value,
    },
    /// The stringified outcome of a tool invocation.
    ToolResult { id: String, content: String },
}

impl ContentBlock {
    /// Create a text block.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

/// A message in the conversation.
///
/// The history is an ordered, append-only sequence of these; it is
/// replayed verbatim to the gateway on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create a user message carrying one tool result.
    pub fn tool_result(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::ToolResult {
                id: id.into(),
                content: content.into(),
            }],
        }
    }

    /// Get combined text content from all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything needed for one gateway call.
#[derive(Debug, Clone)]
pub struct GatewayRequest<'a> {
    pub messages: &'a [Message],
    pub system: &'a str,
    pub tools: &'a [ToolSpec],
}

/// The response from the gateway.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub message: Message,
    pub usage: Usage,
}

/// Trait for LLM inference gateways.
pub trait Gateway: Send + Sync {
    fn converse(
        &self,
        request: GatewayRequest<'_>,
    ) -> impl Future<Output = Result<GatewayResponse, GatewayError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_text_extraction() {
        let msg = Message {
            role: Role::Assistant,
            content: vec![
                ContentBlock::text("Hello "),
                ContentBlock::ToolUse {
                    id: "1".into(),
                    name: "test".into(),
                    input: Value::Null,
                },
                ContentBlock::text("world"),
            ],
        };
        assert_eq!(msg.text(), "Hello world");
    }

    #[test]
    fn tool_result_wraps_in_user_message() {
        let msg = Message::tool_result("t1", "4");
        assert_eq!(msg.role, Role::User);
        assert_eq!(
            msg.content,
            vec![ContentBlock::ToolResult {
                id: "t1".into(),
                content: "4".into(),
            }]
        );
    }
}
