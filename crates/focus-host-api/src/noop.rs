//! Keep-alive for hosts that never suspend the process

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use crate::{KeepAlive, KeepAliveResult};

/// Keep-alive that only tracks whether it was requested
#[derive(Debug, Default)]
pub struct NoopKeepAlive {
    held: AtomicBool,
}

impl NoopKeepAlive {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeepAlive for NoopKeepAlive {
    fn name(&self) -> &str {
        "noop"
    }

    async fn acquire(&self) -> KeepAliveResult<()> {
        if !self.held.swap(true, Ordering::SeqCst) {
            debug!("Keep-alive requested (noop)");
        }
        Ok(())
    }

    async fn release(&self) -> KeepAliveResult<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            debug!("Keep-alive released (noop)");
        }
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_tracks_state() {
        let keep_alive = NoopKeepAlive::new();
        assert!(!keep_alive.is_held());

        keep_alive.acquire().await.unwrap();
        keep_alive.acquire().await.unwrap();
        assert!(keep_alive.is_held());

        keep_alive.release().await.unwrap();
        assert!(!keep_alive.is_held());
    }
}
