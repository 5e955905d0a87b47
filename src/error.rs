//! Crate-wide error type and `Result` alias.
//!
//! `NotFound` is deliberately absent: feedback and delete report a missing id
//! as a normal `Ok(false)` outcome, never as an error (see the Tool Dispatcher).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, VecfsError>;

#[derive(Debug, Error)]
pub enum VecfsError {
    /// A tool call's arguments failed schema validation before any work began.
    #[error("invalid argument for tool '{tool}': {reason}")]
    InvalidArgument { tool: String, reason: String },

    /// `search` or `memorize` was called with no embedder configured.
    #[error("no embedder is configured; search/memorize are unavailable")]
    EmbedderUnavailable,

    /// The configured embedder raised while computing a vector.
    #[error("embedder failed: {0}")]
    EmbedderFailure(String),

    /// The log could not be read or written.
    #[error("storage failure: {0}")]
    StorageFailure(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VecfsError {
    pub fn invalid_argument(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            tool: tool.into(),
            reason: reason.into(),
        }
    }
}
