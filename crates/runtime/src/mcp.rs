//! MCP (Model Context Protocol) session over a child process.
//!
//! The wire protocol and stdio transport are delegated entirely to the
//! official rmcp SDK; this module only owns spawning the server via
//! [`launcher`](crate::launcher) and translating between rmcp types and
//! the provider-agnostic [`model`](crate::model) types.
//!
//! # Example
//!
//! ```ignore
//! use runtime::McpSession;
//! use std::path::Path;
//!
//! # async fn example() -> runtime::Result<()> {
//! let session = McpSession::connect(Path::new("weather/server.py")).await?;
//! for tool in session.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//! session.shutdown().await?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, CallToolResult, Tool},
    service::{RoleClient, RunningService},
};
use rmcp::transport::TokioChildProcess;
use serde_json::Value;

use crate::model::ToolSpec;
use crate::tools::ToolSession;
use crate::{Error, Result, launcher};

/// A tool-protocol session connected to a server child process.
///
/// Owns the child process and its stdio pipes for the lifetime of the
/// program; released exactly once by [`shutdown`](Self::shutdown).
pub struct McpSession {
    service: RunningService<RoleClient, ()>,
}

impl McpSession {
    /// Spawn the tool server script and perform the protocol handshake.
    ///
    /// Any failure here is fatal to the caller: there is no automatic
    /// reconnection.
    pub async fn connect(script: &Path) -> Result<Self> {
        let command = launcher::server_command(script)?;

        let transport =
            TokioChildProcess::new(command).map_err(|e| Error::Transport(e.to_string()))?;

        // serve() runs the MCP initialize handshake before returning.
        let service = ()
            .serve(transport)
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        tracing::debug!("tool server handshake complete");
        Ok(Self { service })
    }

    /// Shutdown the session and terminate the server process.
    pub async fn shutdown(self) -> Result<()> {
        self.service
            .cancel()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(())
    }
}

impl ToolSession for McpSession {
    async fn list_tools(&self) -> Result<Vec<ToolSpec>> {
        let response = self
            .service
            .list_tools(Default::default())
            .await
            .map_err(|e| Error::Tool(e.to_string()))?;
        Ok(response.tools.into_iter().map(tool_to_spec).collect())
    }

    async fn call_tool(&self, name: &str, input: &Value) -> Result<String> {
        let params = CallToolRequestParams {
            name: name.to_string().into(),
            arguments: input.as_object().cloned(),
            meta: None,
            task: None,
        };

        let result = self
            .service
            .call_tool(params)
            .await
            .map_err(|e| Error::Tool(e.to_string()))?;

        Ok(render_result(&result))
    }
}

fn tool_to_spec(tool: Tool) -> ToolSpec {
    ToolSpec {
        name: tool.name.to_string(),
        description: tool
            .description
            .map(|d| d.to_string())
            .unwrap_or_default(),
        input_schema: Value::Object(tool.input_schema.as_ref().clone()),
    }
}

/// Stringify a tool result: the text content when the server provides
/// it, the raw serialized result otherwise.
fn render_result(result: &CallToolResult) -> String {
    let texts: Vec<&str> = result
        .content
        .iter()
        .filter_map(|c| c.as_text().map(|t| t.text.as_str()))
        .collect();

    if texts.is_empty() {
        serde_json::to_string(result).unwrap_or_default()
    } else {
        texts.join("\n")
    }
}
