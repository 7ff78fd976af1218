//! Transition results produced by the engine

use focus_api::{NotificationSignal, SessionMode, Snapshot};

/// What the countdown driver must do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownDirective {
    /// Leave the current tick loop (or its absence) alone
    Keep,
    /// Cancel any tick loop and start a fresh one
    Restart,
    /// Cancel any tick loop
    Cancel,
}

/// Result of applying one command or tick to the session machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: SessionMode,
    pub to: SessionMode,
    /// False when the input was a no-op
    pub changed: bool,
    pub signal: Option<NotificationSignal>,
    pub countdown: CountdownDirective,
}

impl Transition {
    pub(crate) fn unchanged(mode: SessionMode) -> Self {
        Self {
            from: mode,
            to: mode,
            changed: false,
            signal: None,
            countdown: CountdownDirective::Keep,
        }
    }
}

/// Non-fatal problem reported alongside a command outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineWarning {
    /// The host may suspend the process while the countdown runs
    KeepAliveUnavailable(String),
}

impl EngineWarning {
    pub fn message(&self) -> String {
        match self {
            EngineWarning::KeepAliveUnavailable(reason) => {
                format!("Keep-alive unavailable, countdown may stall: {}", reason)
            }
        }
    }
}

/// What a command did, as seen by the caller that issued it
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub snapshot: Snapshot,
    pub changed: bool,
    pub signal: Option<NotificationSignal>,
    pub warning: Option<EngineWarning>,
}
