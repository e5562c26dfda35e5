//! Amazon Bedrock Runtime backend.
//!
//! Talks to the Converse API over HTTP with bearer authentication
//! (Bedrock API keys). The request/response shapes are the documented
//! Converse JSON schema, declared as serde wire types.

use crate::model::{
    ContentBlock, Gateway, GatewayError, GatewayRequest, GatewayResponse, Message, Role, ToolSpec,
    Usage,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_MODEL: &str = "anthropic.claude-3-5-sonnet-20241022-v2:0";

const DEFAULT_MAX_TOKENS: u32 = 2048;

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest {
    messages: Vec<ApiMessage>,
    system: Vec<ApiSystemBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ApiToolConfig>,
    inference_config: ApiInferenceConfig,
}

#[derive(Debug, Serialize)]
struct ApiSystemBlock {
    text: String,
}

#[derive(Debug, Serialize)]
struct ApiToolConfig {
    tools: Vec<ApiToolEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolEntry {
    tool_spec: ApiToolSpec,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolSpec {
    name: String,
    description: String,
    input_schema: ApiSchema,
}

#[derive(Debug, Serialize)]
struct ApiSchema {
    json: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiInferenceConfig {
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: &'static str,
    content: Vec<ApiContentBlock>,
}

// Externally tagged: {"text": ...}, {"toolUse": {...}}, {"toolResult": {...}}.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
enum ApiContentBlock {
    Text(String),
    ToolUse(ApiToolUse),
    ToolResult(ApiToolResult),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolUse {
    tool_use_id: String,
    name: String,
    input: Value,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiToolResult {
    tool_use_id: String,
    content: Vec<ApiToolResultContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolResultContent {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    output: ApiOutput,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Debug, Deserialize)]
struct ApiOutput {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Vec<ApiResponseBlock>,
}

// Block kinds this client does not consume (reasoningContent, images)
// deserialize into Unknown and are dropped on conversion.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ApiResponseBlock {
    Block(ApiContentBlock),
    Unknown(#[allow(dead_code)] Value),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating a Bedrock gateway.
#[derive(Debug, Clone)]
pub struct BedrockGatewayBuilder {
    token: String,
    model: String,
    region: String,
    max_tokens: u32,
}

impl BedrockGatewayBuilder {
    pub fn new(token: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            model: model.into(),
            region: DEFAULT_REGION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn build(self) -> BedrockGateway {
        BedrockGateway {
            client: reqwest::Client::new(),
            token: self.token,
            model: self.model,
            region: self.region,
            max_tokens: self.max_tokens,
        }
    }
}

/// Amazon Bedrock Runtime gateway.
pub struct BedrockGateway {
    client: reqwest::Client,
    token: String,
    model: String,
    region: String,
    max_tokens: u32,
}

impl BedrockGateway {
    pub fn builder(
        token: impl Into<String>,
        model: impl Into<String>,
    ) -> BedrockGatewayBuilder {
        BedrockGatewayBuilder::new(token, model)
    }

    /// The model this gateway sends requests to.
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/converse",
            self.region, self.model
        )
    }

    fn role_to_api(role: Role) -> &'static str {
        match role {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn message_to_api(msg: &Message) -> ApiMessage {
        let content = msg
            .content
            .iter()
            .map(|block| match block {
                ContentBlock::Text { text } => ApiContentBlock::Text(text.clone()),
                ContentBlock::ToolUse { id, name, input } => {
                    ApiContentBlock::ToolUse(ApiToolUse {
                        tool_use_id: id.clone(),
                        name: name.clone(),
                        input: input.clone(),
                    })
                }
                ContentBlock::ToolResult { id, content } => {
                    ApiContentBlock::ToolResult(ApiToolResult {
                        tool_use_id: id.clone(),
                        content: vec![ApiToolResultContent {
                            text: content.clone(),
                        }],
                    })
                }
            })
            .collect();

        ApiMessage {
            role: Self::role_to_api(msg.role),
            content,
        }
    }

    fn tool_to_api(spec: &ToolSpec) -> ApiToolEntry {
        ApiToolEntry {
            tool_spec: ApiToolSpec {
                name: spec.name.clone(),
                description: spec.description.clone(),
                input_schema: ApiSchema {
                    json: spec.input_schema.clone(),
                },
            },
        }
    }

    fn response_to_message(blocks: Vec<ApiResponseBlock>) -> Message {
        let content = blocks
            .into_iter()
            .filter_map(|block| match block {
                ApiResponseBlock::Block(ApiContentBlock::Text(text)) => {
                    Some(ContentBlock::Text { text })
                }
                ApiResponseBlock::Block(ApiContentBlock::ToolUse(call)) => {
                    Some(ContentBlock::ToolUse {
                        id: call.tool_use_id,
                        name: call.name,
                        input: call.input,
                    })
                }
                // toolResult never appears in model output.
                ApiResponseBlock::Block(ApiContentBlock::ToolResult(_)) => None,
                ApiResponseBlock::Unknown(_) => None,
            })
            .collect();

        Message {
            role: Role::Assistant,
            content,
        }
    }
}

impl std::fmt::Display for BedrockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "bedrock({}, region={})", self.model, self.region)
    }
}

impl Gateway for BedrockGateway {
    async fn converse(
        &self,
        request: GatewayRequest<'_>,
    ) -> Result<GatewayResponse, GatewayError> {
        let api_messages: Vec<ApiMessage> = request
            .messages
            .iter()
            .map(Self::message_to_api)
            .collect();

        let tool_config = if request.tools.is_empty() {
            None
        } else {
            Some(ApiToolConfig {
                tools: request.tools.iter().map(Self::tool_to_api).collect(),
            })
        };

        let api_request = ApiRequest {
            messages: api_messages,
            system: vec![ApiSystemBlock {
                text: request.system.to_string(),
            }],
            tool_config,
            // Maximally deterministic sampling.
            inference_config: ApiInferenceConfig {
                temperature: 0.0,
                max_tokens: self.max_tokens,
                top_p: 0.0,
            },
        };

        tracing::debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "converse request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&api_request)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::InvalidResponse(e.to_string()))?;

        let usage = Usage {
            input_tokens: api_response.usage.input_tokens,
            output_tokens: api_response.usage.output_tokens,
        };
        tracing::debug!(usage.input_tokens, usage.output_tokens, "converse response");

        Ok(GatewayResponse {
            message: Self::response_to_message(api_response.output.message.content),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn endpoint_uses_region_and_model() {
        let gw = BedrockGateway::builder("t", "my-model").region("eu-west-1").build();
        assert_eq!(
            gw.endpoint(),
            "https://bedrock-runtime.eu-west-1.amazonaws.com/model/my-model/converse"
        );
    }

    #[test]
    fn request_wire_shape() {
        let messages = vec![Message::user("What is 2+2?")];
        let tools = vec![ToolSpec {
            name: "add".into(),
            description: "Add two numbers".into(),
            input_schema: json!({"type": "object"}),
        }];
        let api_request = ApiRequest {
            messages: messages.iter().map(BedrockGateway::message_to_api).collect(),
            system: vec![ApiSystemBlock {
                text: "You are a helpful AI assistant.".into(),
            }],
            tool_config: Some(ApiToolConfig {
                tools: tools.iter().map(BedrockGateway::tool_to_api).collect(),
            }),
            inference_config: ApiInferenceConfig {
                temperature: 0.0,
                max_tokens: 2048,
                top_p: 0.0,
            },
        };

        let value = serde_json::to_value(&api_request).unwrap();
        assert_eq!(
            value["messages"][0],
            json!({"role": "user", "content": [{"text": "What is 2+2?"}]})
        );
        assert_eq!(value["system"], json!([{"text": "You are a helpful AI assistant."}]));
        assert_eq!(
            value["toolConfig"]["tools"][0]["toolSpec"]["inputSchema"],
            json!({"json": {"type": "object"}})
        );
        assert_eq!(
            value["inferenceConfig"],
            json!({"temperature": 0.0, "maxTokens": 2048, "topP": 0.0})
        );
    }

    #[test]
    fn tool_result_serializes_as_user_block() {
        let msg = Message::tool_result("t1", "4");
        let api = BedrockGateway::message_to_api(&msg);
        let value = serde_json::to_value(&api).unwrap();
        assert_eq!(
            value,
            json!({
                "role": "user",
                "content": [{"toolResult": {"toolUseId": "t1", "content": [{"text": "4"}]}}]
            })
        );
    }

    #[test]
    fn response_parses_text_and_tool_use() {
        let body = json!({
            "output": {"message": {"role": "assistant", "content": [
                {"text": "Let me add those."},
                {"toolUse": {"toolUseId": "t1", "name": "add", "input": {"a": 2, "b": 2}}}
            ]}},
            "stopReason": "tool_use",
            "usage": {"inputTokens": 10, "outputTokens": 20, "totalTokens": 30}
        });

        let response: ApiResponse = serde_json::from_value(body).unwrap();
        let message = BedrockGateway::response_to_message(response.output.message.content);
        assert_eq!(message.role, Role::Assistant);
        assert_eq!(message.text(), "Let me add those.");
        assert!(matches!(
            &message.content[1],
            ContentBlock::ToolUse { id, name, .. } if id == "t1" && name == "add"
        ));
        assert_eq!(response.usage.input_tokens, 10);
    }

    #[test]
    fn unknown_response_blocks_are_dropped() {
        let body = json!({
            "output": {"message": {"role": "assistant", "content": [
                {"reasoningContent": {"reasoningText": {"text": "thinking"}}},
                {"text": "4"}
            ]}}
        });

        let response: ApiResponse = serde_json::from_value(body).unwrap();
        let message = BedrockGateway::response_to_message(response.output.message.content);
        assert_eq!(message.content, vec![ContentBlock::text("4")]);
    }

    #[test]
    fn empty_tool_catalog_omits_tool_config() {
        let api_request = ApiRequest {
            messages: Vec::new(),
            system: Vec::new(),
            tool_config: None,
            inference_config: ApiInferenceConfig {
                temperature: 0.0,
                max_tokens: 2048,
                top_p: 0.0,
            },
        };
        let value = serde_json::to_value(&api_request).unwrap();
        assert!(value.get("toolConfig").is_none());
    }
}
