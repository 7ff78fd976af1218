//! Observers attached to the engine
//!
//! - the UI observer forwards every snapshot and signal to stdout as events
//! - the notification observer turns signals into sound cues and keeps a
//!   rendered countdown notification for the current mode

use focus_api::{Action, EngineState, Event, EventPayload, NotificationSignal, SessionMode};
use focus_core::{FocusEngine, Update};
use focus_util::format_countdown;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::output::Output;

/// Forward engine updates to stdout until the engine stops
pub fn spawn_ui_observer(engine: &FocusEngine, output: Output) -> JoinHandle<()> {
    let mut subscription = engine.subscribe();
    tokio::spawn(async move {
        while let Some(update) = subscription.recv().await {
            let payload = match update {
                Update::Snapshot(snapshot) => EventPayload::StateChanged(snapshot),
                Update::Signal(signal) => EventPayload::Signal { signal },
            };
            output.send(&Event::new(payload));
        }
        debug!("UI observer finished");
    })
}

/// Sound played for a notification signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    FocusStart,
    FocusEnd,
    BreakStart,
    BreakEnd,
}

impl SoundCue {
    pub fn for_signal(signal: NotificationSignal) -> Self {
        match signal {
            NotificationSignal::FocusStarted => SoundCue::FocusStart,
            NotificationSignal::FocusEnded => SoundCue::FocusEnd,
            NotificationSignal::BreakStarted => SoundCue::BreakStart,
            NotificationSignal::BreakEnded => SoundCue::BreakEnd,
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            SoundCue::FocusStart => "focus_start.ogg",
            SoundCue::FocusEnd => "focus_end.ogg",
            SoundCue::BreakStart => "break_start.ogg",
            SoundCue::BreakEnd => "break_end.ogg",
        }
    }
}

/// What a countdown notification shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: &'static str,
    pub body: String,
    /// Share of the current interval already elapsed, 0 to 100
    pub progress_percent: u8,
    pub actions: Vec<Action>,
}

pub fn render_notification(state: &EngineState) -> Notification {
    let title = match state.mode {
        SessionMode::Idle => "Ready to focus",
        SessionMode::FocusRunning => "Focusing",
        SessionMode::FocusPaused => "Focus paused",
        SessionMode::BreakReady => "Time for a break",
        SessionMode::BreakRunning => "On a break",
        SessionMode::BreakPaused => "Break paused",
    };

    let mut body = format_countdown(state.remaining_seconds);
    if let Some(task) = &state.task {
        body = format!("{} · {}", body, task.title);
    }

    Notification {
        title,
        body,
        progress_percent: (state.progress() * 100.0).round() as u8,
        actions: state.mode.available_actions().to_vec(),
    }
}

/// Play cues for signals and re-render the notification on mode changes
pub fn spawn_notification_observer(engine: &FocusEngine) -> JoinHandle<()> {
    let mut subscription = engine.subscribe();
    tokio::spawn(async move {
        let mut last_mode = None;

        while let Some(update) = subscription.recv().await {
            match update {
                Update::Signal(signal) => {
                    let cue = SoundCue::for_signal(signal);
                    info!(signal = %signal, cue = cue.file_name(), "Playing sound cue");
                }
                Update::Snapshot(snapshot) => {
                    let notification = render_notification(&snapshot.state);
                    if last_mode != Some(snapshot.state.mode) {
                        let actions: Vec<&str> =
                            notification.actions.iter().map(Action::label).collect();
                        info!(
                            title = notification.title,
                            body = %notification.body,
                            progress = notification.progress_percent,
                            actions = ?actions,
                            "Notification updated"
                        );
                        last_mode = Some(snapshot.state.mode);
                    } else {
                        debug!(
                            body = %notification.body,
                            progress = notification.progress_percent,
                            "Countdown notification"
                        );
                    }
                }
            }
        }
        debug!("Notification observer finished");
    })
}
