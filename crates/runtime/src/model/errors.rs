use thiserror::Error;

/// Errors from LLM gateway calls.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The inference service returned an error response.
    #[error("gateway api: {0}")]
    Api(String),

    /// The gateway response could not be parsed.
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}
