//! Shared utilities for focusd
//!
//! This crate provides:
//! - ID types (TaskId, SubscriberId)
//! - Time utilities (wall clock, countdown formatting)
//! - Error types
//! - Default paths for the config file

mod error;
mod ids;
mod paths;
mod time;

pub use error::*;
pub use ids::*;
pub use paths::*;
pub use time::*;
