//! Focus session engine for focusd
//!
//! This crate is the heart of focusd, containing:
//! - Session state machine (Idle -> FocusRunning -> BreakReady -> BreakRunning -> Idle)
//! - Break cadence (short breaks, every Nth one long)
//! - Clock sources (real one-second ticks, manual ticks for tests)
//! - Countdown driver with generation-tagged tick loops
//! - Broadcaster for state snapshots and one-shot notification signals
//! - The engine actor serializing commands and ticks
//! - A keep-alive worker that follows the running modes off the actor

mod broadcast;
mod clock;
mod driver;
mod engine;
mod events;
mod keep_alive;
mod machine;

pub use broadcast::*;
pub use clock::*;
pub use driver::*;
pub use engine::*;
pub use events::*;
pub use machine::*;
