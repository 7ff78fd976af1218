//! Keep-alive traits

use async_trait::async_trait;
use thiserror::Error;

/// Errors from keep-alive operations
#[derive(Debug, Error)]
pub enum KeepAliveError {
    #[error("Keep-alive denied: {0}")]
    Denied(String),

    #[error("Keep-alive unavailable: {0}")]
    Unavailable(String),

    #[error("Release failed: {0}")]
    ReleaseFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type KeepAliveResult<T> = Result<T, KeepAliveError>;

/// Keeps the host process alive while a countdown is active.
///
/// `acquire` and `release` are idempotent: acquiring a held keep-alive or
/// releasing one that is not held succeeds without doing anything.
#[async_trait]
pub trait KeepAlive: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    async fn acquire(&self) -> KeepAliveResult<()>;

    async fn release(&self) -> KeepAliveResult<()>;

    fn is_held(&self) -> bool;
}
