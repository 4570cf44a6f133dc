// Operation-level error taxonomy
// Every external failure is re-wrapped with the originating provider's name
// before it reaches the console layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Rejected before any network call (missing URL, missing/inactive key).
    #[error("{0}")]
    InvalidInput(String),

    /// Channel URL could not be mapped to a channel id.
    #[error("Invalid or unsupported channel URL")]
    InvalidChannelUrl,

    /// Fresh analysis whose first page yielded zero usable videos.
    #[error("No videos found on this channel")]
    NoVideos,

    /// Normalized transport or provider failure, terminal for one operation.
    #[error("{provider} API error: {message}")]
    Provider {
        provider: &'static str,
        message: String,
    },

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Wrap a lower-level error with the provider it came from.
    pub fn provider(provider: &'static str, err: impl std::fmt::Display) -> Self {
        AppError::Provider {
            provider,
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
