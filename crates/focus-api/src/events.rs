//! Event types for engine -> observer streaming

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::{NotificationSignal, Snapshot, API_VERSION};

/// Event envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub api_version: u32,
    pub timestamp: DateTime<Local>,
    pub payload: EventPayload,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            api_version: API_VERSION,
            timestamp: focus_util::now(),
            payload,
        }
    }
}

/// All possible events from the engine host to observers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// Snapshot of the engine state (sent on subscribe and on every change)
    StateChanged(Snapshot),

    /// One-shot transition signal
    Signal { signal: NotificationSignal },

    /// The keep-alive resource could not be held; the countdown continues
    KeepAliveWarning { message: String },

    /// Engine host is shutting down
    Shutdown,
}
