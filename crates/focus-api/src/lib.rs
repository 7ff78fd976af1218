//! Public types for the focus session engine
//!
//! This crate defines the stable surface between the engine and its observers:
//! - Engine state snapshots and session modes
//! - One-shot notification signals
//! - Commands (requests from UI and notification surfaces)
//! - Events (engine -> observers)
//! - Versioning

mod commands;
mod events;
mod types;

pub use commands::*;
pub use events::*;
pub use types::*;

/// Current API version
pub const API_VERSION: u32 = 1;
