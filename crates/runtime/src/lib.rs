//! Skiff runtime — MCP session and LLM gateway orchestration.
//!
//! This crate provides everything behind the interactive shell: spawning
//! an MCP tool server as a child process, talking to Amazon Bedrock, and
//! the conversation loop that alternates between the two.
//!
//! # Overview
//!
//! - **McpSession**: owns the tool server child process and exposes
//!   `list_tools`/`call_tool` over the official rmcp SDK.
//! - **Gateway**: a trait abstracting LLM inference backends, implemented
//!   by [`BedrockGateway`] for the Bedrock Converse API.
//! - **Conversation**: the per-query orchestration loop. Each query runs
//!   against a fresh message history and performs at most one follow-up
//!   gateway call per tool use.
//!
//! # Example
//!
//! ```ignore
//! use runtime::{BedrockGateway, Conversation, McpSession};
//! use std::path::Path;
//!
//! # async fn example() -> runtime::Result<()> {
//! let session = McpSession::connect(Path::new("weather/server.py")).await?;
//! let gateway = BedrockGateway::builder("bedrock-api-key", runtime::DEFAULT_MODEL).build();
//!
//! let conversation = Conversation::new(&gateway, &session);
//! let answer = conversation.process_query("What is the weather in Kyoto?").await?;
//! println!("{answer}");
//!
//! session.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod conversation;
mod error;
pub mod launcher;
mod mcp;
pub mod model;
mod providers;
mod tools;

pub use conversation::{Conversation, GATEWAY_ERROR_REPLY, SYSTEM_PROMPT};
pub use error::{Error, Result};
pub use launcher::ScriptKind;
pub use mcp::McpSession;
pub use model::{
    ContentBlock, Gateway, GatewayError, GatewayRequest, GatewayResponse, Message, Role, ToolSpec,
    Usage,
};
pub use providers::{BedrockGateway, BedrockGatewayBuilder, DEFAULT_MODEL, DEFAULT_REGION};
pub use tools::ToolSession;
