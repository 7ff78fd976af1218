//! Keep-alive trait interfaces for focusd
//!
//! This crate defines the interface between the focus engine and the
//! platform mechanism that keeps the host process from being suspended
//! while a countdown runs. It contains no platform code itself.

mod mock;
mod noop;
mod traits;

pub use mock::*;
pub use noop::*;
pub use traits::*;
