//! Shared types for the focus engine API

use focus_util::TaskId;
use serde::{Deserialize, Serialize};

use crate::Command;

/// Mode of the focus session. Exactly one holds at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Idle,
    FocusRunning,
    FocusPaused,
    /// Focus finished; the break timings are set but the countdown waits for `start`
    BreakReady,
    BreakRunning,
    BreakPaused,
}

impl SessionMode {
    /// Whether a countdown is active in this mode
    pub fn is_running(&self) -> bool {
        matches!(self, SessionMode::FocusRunning | SessionMode::BreakRunning)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::Idle => "idle",
            SessionMode::FocusRunning => "focus_running",
            SessionMode::FocusPaused => "focus_paused",
            SessionMode::BreakReady => "break_ready",
            SessionMode::BreakRunning => "break_running",
            SessionMode::BreakPaused => "break_paused",
        }
    }

    /// Actions an observer should offer in this mode.
    ///
    /// Every action maps onto exactly one command, see [`Action::command`].
    pub fn available_actions(&self) -> &'static [Action] {
        match self {
            SessionMode::Idle => &[Action::Start],
            SessionMode::FocusRunning => &[Action::Pause, Action::AddOneMinute, Action::Stop],
            SessionMode::FocusPaused => &[Action::Resume, Action::Stop],
            SessionMode::BreakReady => &[Action::StartBreak, Action::SkipBreak],
            SessionMode::BreakRunning => &[Action::Pause, Action::AddOneMinute, Action::Stop],
            SessionMode::BreakPaused => &[Action::Resume, Action::SkipBreak, Action::Stop],
        }
    }
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action button shown by a UI or notification surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Start,
    Resume,
    Pause,
    AddOneMinute,
    Stop,
    StartBreak,
    SkipBreak,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Start,
        Action::Resume,
        Action::Pause,
        Action::AddOneMinute,
        Action::Stop,
        Action::StartBreak,
        Action::SkipBreak,
    ];

    /// Look up an action by its wire name, e.g. `start_break`
    pub fn from_name(name: &str) -> Option<Action> {
        Self::ALL.into_iter().find(|action| action.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Start => "start",
            Action::Resume => "resume",
            Action::Pause => "pause",
            Action::AddOneMinute => "add_one_minute",
            Action::Stop => "stop",
            Action::StartBreak => "start_break",
            Action::SkipBreak => "skip_break",
        }
    }

    /// The engine command this action issues
    pub fn command(&self) -> Command {
        match self {
            Action::Start | Action::Resume | Action::StartBreak => Command::Start,
            Action::Pause => Command::Pause,
            Action::AddOneMinute => Command::AddOneMinute,
            Action::Stop => Command::Reset,
            Action::SkipBreak => Command::SkipBreak,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Action::Start => "Start",
            Action::Resume => "Resume",
            Action::Pause => "Pause",
            Action::AddOneMinute => "+1 min",
            Action::Stop => "Stop",
            Action::StartBreak => "Start break",
            Action::SkipBreak => "Skip break",
        }
    }
}

/// Task associated with the current focus session.
///
/// Supplied by the task layer and stored opaquely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRef {
    pub id: TaskId,
    pub title: String,
}

/// The authoritative engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineState {
    pub mode: SessionMode,

    /// Duration of the current interval (focus or break)
    pub total_seconds: u32,

    /// Seconds left in the current interval, never above `total_seconds`
    pub remaining_seconds: u32,

    /// Focus intervals completed naturally since the engine was created
    pub completed_focus_intervals: u32,

    pub ambient_sound_id: u32,

    /// Ambient volume in `[0, 1]`
    pub ambient_volume: f32,

    #[serde(default)]
    pub task: Option<TaskRef>,
}

impl EngineState {
    /// Fresh idle state with the given focus duration
    pub fn idle(focus_seconds: u32, ambient_sound_id: u32, ambient_volume: f32) -> Self {
        Self {
            mode: SessionMode::Idle,
            total_seconds: focus_seconds,
            remaining_seconds: focus_seconds,
            completed_focus_intervals: 0,
            ambient_sound_id,
            ambient_volume,
            task: None,
        }
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.total_seconds.saturating_sub(self.remaining_seconds)
    }

    /// Fraction of the current interval already elapsed, in `[0, 1]`
    pub fn progress(&self) -> f32 {
        if self.total_seconds == 0 {
            return 1.0;
        }
        self.elapsed_seconds() as f32 / self.total_seconds as f32
    }
}

/// Immutable copy of the engine state as delivered to observers.
///
/// `revision` strictly increases with every externally visible change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub revision: u64,
    pub state: EngineState,
}

/// One-shot notification emitted on interval transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSignal {
    FocusStarted,
    FocusEnded,
    BreakStarted,
    BreakEnded,
}

impl NotificationSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationSignal::FocusStarted => "focus_started",
            NotificationSignal::FocusEnded => "focus_ended",
            NotificationSignal::BreakStarted => "break_started",
            NotificationSignal::BreakEnded => "break_ended",
        }
    }
}

impl std::fmt::Display for NotificationSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
