//! Error types for focusd

use thiserror::Error;

/// Core error type for focusd operations
#[derive(Debug, Error)]
pub enum FocusError {
    #[error("Engine is stopped")]
    EngineStopped,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FocusError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, FocusError>;
