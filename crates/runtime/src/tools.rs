//! Tool-protocol session abstraction.

use serde_json::Value;
use std::future::Future;

use crate::Result;
use crate::model::ToolSpec;

/// The operations the conversation loop consumes from a tool-protocol
/// session.
///
/// Implemented by [`McpSession`](crate::McpSession) over a live child
/// process, and by scripted stubs in tests.
pub trait ToolSession: Send + Sync {
    /// Fetch the current tool catalog.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<ToolSpec>>> + Send;

    /// Invoke a named tool, returning its result in stringified form.
    fn call_tool(&self, name: &str, input: &Value) -> impl Future<Output = Result<String>> + Send;
}
