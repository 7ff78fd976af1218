//! Linux keep-alive for focusd
//!
//! Provides:
//! - Inhibitor process spawning with process group isolation
//! - Graceful (SIGTERM) and forceful (SIGKILL) release
//! - Detection of inhibitors that exit right away (request denied)

mod adapter;
mod process;

pub use adapter::*;
pub use process::*;
