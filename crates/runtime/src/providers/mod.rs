//! LLM gateway adapters.
//!
//! Each adapter implements the [`Gateway`](crate::model::Gateway) trait
//! for its specific API.

mod bedrock;

pub use bedrock::{BedrockGateway, BedrockGatewayBuilder, DEFAULT_MODEL, DEFAULT_REGION};
