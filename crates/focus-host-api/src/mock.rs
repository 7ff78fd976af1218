//! Mock keep-alive for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{KeepAlive, KeepAliveError, KeepAliveResult};

/// Mock keep-alive that records calls and can be told to fail
#[derive(Debug, Default)]
pub struct MockKeepAlive {
    held: AtomicBool,
    acquire_calls: AtomicUsize,
    release_calls: AtomicUsize,

    /// Configure acquire to fail, as a platform denying the request would
    pub fail_acquire: AtomicBool,
}

impl MockKeepAlive {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose acquire always fails
    pub fn denying() -> Self {
        let mock = Self::new();
        mock.fail_acquire.store(true, Ordering::SeqCst);
        mock
    }

    /// Number of acquire calls that actually took the keep-alive
    pub fn acquire_count(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    /// Number of release calls that actually dropped the keep-alive
    pub fn release_count(&self) -> usize {
        self.release_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeepAlive for MockKeepAlive {
    fn name(&self) -> &str {
        "mock"
    }

    async fn acquire(&self) -> KeepAliveResult<()> {
        if self.fail_acquire.load(Ordering::SeqCst) {
            return Err(KeepAliveError::Denied("Mock acquire failure".into()));
        }
        if !self.held.swap(true, Ordering::SeqCst) {
            self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn release(&self) -> KeepAliveResult<()> {
        if self.held.swap(false, Ordering::SeqCst) {
            self.release_calls.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}
