//! Gateway protocol types and trait.

pub mod errors;
pub mod types;

pub use errors::GatewayError;
pub use types::{
    ContentBlock, Gateway, GatewayRequest, GatewayResponse, Message, Role, ToolSpec, Usage,
};
