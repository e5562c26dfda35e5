use std::path::PathBuf;
use thiserror::Error;

use crate::model::GatewayError;

/// Runtime errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The tool server script has an unrecognized extension.
    ///
    /// Fatal at startup: the child process is never spawned.
    #[error("unsupported server script {}: must be a .py or .js file", path.display())]
    UnsupportedScript { path: PathBuf },

    /// The child process could not be spawned or the MCP handshake failed.
    #[error("transport: {0}")]
    Transport(String),

    /// Listing or invoking a tool failed after the session was established.
    #[error("tool call failed: {0}")]
    Tool(String),

    /// The LLM gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, Error>;
