//! Errors raised by ReaScript backends

use thiserror::Error;

/// Errors coming back from a native ReaScript call
#[derive(Error, Debug)]
pub enum ApiError {
    /// Socket-level failure talking to REAPER
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The bridge is reachable but the distributed API is switched off in REAPER
    #[error("{0}")]
    DisabledDistApi(String),

    /// The bridge dropped the client (REAPER closed or restarted)
    #[error("{0}")]
    DisconnectedClient(String),

    /// REAPER rejected the call itself
    #[error("{function}: {message}")]
    Call { function: String, message: String },

    /// The bridge answered with something we could not decode
    #[error("Bridge protocol error: {0}")]
    Protocol(String),
}

impl ApiError {
    pub fn call(function: &str, message: impl Into<String>) -> Self {
        Self::Call {
            function: function.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error means REAPER could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::Io(_) | Self::DisabledDistApi(_) | Self::DisconnectedClient(_)
        )
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
