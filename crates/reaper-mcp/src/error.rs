//! Error types for the command layer

use reaper_core::ApiError;
use thiserror::Error;

/// Failure inside a single command handler
#[derive(Error, Debug)]
pub enum CommandError {
    /// REAPER accepted the call but reported that it did nothing
    #[error("{0}")]
    Runtime(String),

    /// An index or argument was rejected before touching REAPER
    #[error("{0}")]
    Value(String),

    /// The parameter mapping did not fit the handler
    #[error("Invalid parameters: {0}")]
    Params(#[from] serde_json::Error),

    /// A native call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl CommandError {
    /// Whether REAPER could not be reached at all
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Api(e) if e.is_connection())
    }
}

pub type CommandResult<T = serde_json::Value> = Result<T, CommandError>;

/// The one error kind `send_command` returns
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct DispatchError {
    message: String,
}

impl DispatchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
