//! The conversation loop.
//!
//! Drives repeated calls between the LLM gateway and the tool-protocol
//! session for a single user query: gateway call, tool invocations on
//! demand, one follow-up gateway call per tool use, final answer.
//!
//! Tool chaining is bounded at depth 2: a tool use requested inside a
//! follow-up response is not executed. This limitation is a deliberate
//! boundary of the design, not an oversight.

use crate::Result;
use crate::model::{ContentBlock, Gateway, GatewayRequest, Message};
use crate::tools::ToolSession;

/// System prompt sent with every gateway call.
pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Fixed reply returned to the caller when a gateway call fails.
pub const GATEWAY_ERROR_REPLY: &str = "Error calling Bedrock API";

/// Orchestrates one query at a time against a gateway and a tool session.
///
/// Holds the process-wide collaborators by reference; constructed once at
/// startup and shared with the shell. Carries no conversation state:
/// every query starts from an empty message history, so consecutive
/// queries never see each other's turns.
pub struct Conversation<'a, G, S> {
    gateway: &'a G,
    tools: &'a S,
}

impl<'a, G: Gateway, S: ToolSession> Conversation<'a, G, S> {
    pub fn new(gateway: &'a G, tools: &'a S) -> Self {
        Self { gateway, tools }
    }

    /// Produce a final answer for one user query, performing zero or
    /// more tool round-trips.
    ///
    /// Gateway failures are contained here: the fixed
    /// [`GATEWAY_ERROR_REPLY`] string is returned and the remaining tool
    /// uses for this query are abandoned. Tool failures propagate as
    /// `Err` for the shell to report.
    pub async fn process_query(&self, query: &str) -> Result<String> {
        let tools = self.tools.list_tools().await?;

        let mut history = vec![Message::user(query)];
        let mut output = Vec::new();

        let response = match self
            .gateway
            .converse(GatewayRequest {
                messages: &history,
                system: SYSTEM_PROMPT,
                tools: &tools,
            })
            .await
        {
            Ok(response) => response,
            Err(e) => {
                eprintln!("Bedrock API error: {e}");
                return Ok(GATEWAY_ERROR_REPLY.to_string());
            }
        };

        let reply = response.message;
        history.push(reply.clone());

        for block in &reply.content {
            match block {
                ContentBlock::Text { text } => output.push(text.clone()),
                ContentBlock::ToolUse { id, name, input } => {
                    let result = self.tools.call_tool(name, input).await?;
                    output.push(format!("[Calling tool {name} with args {input}]"));

                    // Every tool use is answered with exactly one tool
                    // result carrying the same id, before the next call.
                    history.push(Message::tool_result(id, result));

                    let followup = match self
                        .gateway
                        .converse(GatewayRequest {
                            messages: &history,
                            system: SYSTEM_PROMPT,
                            tools: &tools,
                        })
                        .await
                    {
                        Ok(response) => response,
                        Err(e) => {
                            eprintln!("Bedrock API error: {e}");
                            return Ok(GATEWAY_ERROR_REPLY.to_string());
                        }
                    };

                    history.push(followup.message.clone());

                    // Depth-2 cutoff: only text from the follow-up is
                    // consumed; a tool use in it is never executed.
                    for block in &followup.message.content {
                        if let ContentBlock::Text { text } = block {
                            output.push(text.clone());
                        }
                    }
                }
                // The gateway never emits tool results.
                ContentBlock::ToolResult { .. } => {}
            }
        }

        Ok(output.join("\n"))
    }
}
