//! Session state machine
//!
//! Pure transition logic over [`EngineState`]. No I/O, no timers, no
//! knowledge of observers: every input returns a [`Transition`] describing
//! what changed and what the countdown driver has to do about it.

use focus_api::{Command, EngineState, NotificationSignal, SessionMode, TaskRef};
use focus_config::{AmbientSettings, TimerSettings};

use crate::{CountdownDirective, Transition};

/// Seconds added by `add_one_minute`
pub const ONE_MINUTE: u32 = 60;

/// Break length offered after the `completed`-th focus interval.
///
/// Every `long_break_every`-th completion earns the long break.
pub fn break_seconds(timer: &TimerSettings, completed: u32) -> u32 {
    let every = timer.long_break_every.max(1);
    if completed > 0 && completed % every == 0 {
        timer.long_break_seconds
    } else {
        timer.short_break_seconds
    }
}

/// Owns the authoritative [`EngineState`] and applies transition rules
#[derive(Debug, Clone)]
pub struct SessionMachine {
    state: EngineState,
    timer: TimerSettings,
}

impl SessionMachine {
    pub fn new(timer: TimerSettings, ambient: AmbientSettings) -> Self {
        Self {
            state: EngineState::idle(timer.focus_seconds, ambient.sound_id, ambient.volume),
            timer,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Apply a protocol command. Queries (`GetState`, `Ping`) never change anything.
    pub fn apply(&mut self, command: &Command) -> Transition {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::SkipBreak => self.skip_break(),
            Command::Reset => self.reset(),
            Command::AddOneMinute => self.add_one_minute(),
            Command::SetCustomTime { seconds } => self.set_custom_time(*seconds),
            Command::SetAmbientSound { sound_id, volume } => {
                self.set_ambient_sound(*sound_id, *volume)
            }
            Command::AttachTask { task } => self.attach_task(task.clone()),
            Command::GetState | Command::Ping => Transition::unchanged(self.state.mode),
        }
    }

    pub fn start(&mut self) -> Transition {
        let from = self.state.mode;
        match from {
            SessionMode::Idle => {
                // Idle always holds total == remaining: the default focus
                // length, or whatever set_custom_time chose
                self.state.remaining_seconds = self.state.total_seconds;
                self.state.mode = SessionMode::FocusRunning;
                self.transition(from, Some(NotificationSignal::FocusStarted), CountdownDirective::Restart)
            }
            SessionMode::BreakReady => {
                self.state.mode = SessionMode::BreakRunning;
                self.transition(from, Some(NotificationSignal::BreakStarted), CountdownDirective::Restart)
            }
            SessionMode::FocusPaused => {
                self.state.mode = SessionMode::FocusRunning;
                self.transition(from, None, CountdownDirective::Restart)
            }
            SessionMode::BreakPaused => {
                self.state.mode = SessionMode::BreakRunning;
                self.transition(from, None, CountdownDirective::Restart)
            }
            SessionMode::FocusRunning | SessionMode::BreakRunning => Transition::unchanged(from),
        }
    }

    pub fn pause(&mut self) -> Transition {
        let from = self.state.mode;
        let to = match from {
            SessionMode::FocusRunning => SessionMode::FocusPaused,
            SessionMode::BreakRunning => SessionMode::BreakPaused,
            _ => return Transition::unchanged(from),
        };
        self.state.mode = to;
        self.transition(from, None, CountdownDirective::Cancel)
    }

    pub fn skip_break(&mut self) -> Transition {
        let from = self.state.mode;
        if !matches!(from, SessionMode::BreakReady | SessionMode::BreakPaused) {
            return Transition::unchanged(from);
        }
        self.enter_idle();
        self.transition(from, None, CountdownDirective::Cancel)
    }

    /// Always allowed; keeps the completed-interval count
    pub fn reset(&mut self) -> Transition {
        let from = self.state.mode;
        let already_reset = from == SessionMode::Idle
            && self.state.total_seconds == self.timer.focus_seconds
            && self.state.remaining_seconds == self.timer.focus_seconds;
        if already_reset {
            return Transition::unchanged(from);
        }
        self.enter_idle();
        self.transition(from, None, CountdownDirective::Cancel)
    }

    pub fn add_one_minute(&mut self) -> Transition {
        let from = self.state.mode;
        if !from.is_running() {
            return Transition::unchanged(from);
        }
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_add(ONE_MINUTE);
        self.state.total_seconds = self.state.total_seconds.saturating_add(ONE_MINUTE);
        self.transition(from, None, CountdownDirective::Restart)
    }

    /// Idle only, and `seconds` must be at least 1
    pub fn set_custom_time(&mut self, seconds: u32) -> Transition {
        let from = self.state.mode;
        if from != SessionMode::Idle || seconds == 0 {
            return Transition::unchanged(from);
        }
        if self.state.total_seconds == seconds && self.state.remaining_seconds == seconds {
            return Transition::unchanged(from);
        }
        self.state.total_seconds = seconds;
        self.state.remaining_seconds = seconds;
        self.transition(from, None, CountdownDirective::Keep)
    }

    /// Allowed in any mode. Volume is clamped to `[0, 1]`; NaN is ignored.
    pub fn set_ambient_sound(&mut self, sound_id: u32, volume: f32) -> Transition {
        let from = self.state.mode;
        if volume.is_nan() {
            return Transition::unchanged(from);
        }
        let volume = volume.clamp(0.0, 1.0);
        if self.state.ambient_sound_id == sound_id && self.state.ambient_volume == volume {
            return Transition::unchanged(from);
        }
        self.state.ambient_sound_id = sound_id;
        self.state.ambient_volume = volume;
        self.transition(from, None, CountdownDirective::Keep)
    }

    pub fn attach_task(&mut self, task: Option<TaskRef>) -> Transition {
        let from = self.state.mode;
        if self.state.task == task {
            return Transition::unchanged(from);
        }
        self.state.task = task;
        self.transition(from, None, CountdownDirective::Keep)
    }

    /// One second elapsed on the active countdown.
    ///
    /// Decrements `remaining`; reaching zero completes the interval within
    /// the same tick. Ticks outside a running mode are ignored.
    pub fn tick(&mut self) -> Transition {
        let from = self.state.mode;
        if !from.is_running() {
            return Transition::unchanged(from);
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds > 0 {
            return self.transition(from, None, CountdownDirective::Keep);
        }

        match from {
            SessionMode::FocusRunning => {
                self.state.completed_focus_intervals += 1;
                let break_len = break_seconds(&self.timer, self.state.completed_focus_intervals);
                self.state.total_seconds = break_len;
                self.state.remaining_seconds = break_len;
                self.state.mode = SessionMode::BreakReady;
                self.transition(from, Some(NotificationSignal::FocusEnded), CountdownDirective::Cancel)
            }
            _ => {
                self.enter_idle();
                self.transition(from, Some(NotificationSignal::BreakEnded), CountdownDirective::Cancel)
            }
        }
    }

    fn enter_idle(&mut self) {
        self.state.mode = SessionMode::Idle;
        self.state.total_seconds = self.timer.focus_seconds;
        self.state.remaining_seconds = self.timer.focus_seconds;
    }

    fn transition(
        &self,
        from: SessionMode,
        signal: Option<NotificationSignal>,
        countdown: CountdownDirective,
    ) -> Transition {
        Transition {
            from,
            to: self.state.mode,
            changed: true,
            signal,
            countdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_util::TaskId;

    fn machine() -> SessionMachine {
        SessionMachine::new(TimerSettings::default(), AmbientSettings::default())
    }

    fn run_ticks(machine: &mut SessionMachine, n: u32) -> Vec<Transition> {
        (0..n).map(|_| machine.tick()).collect()
    }

    /// Start a focus interval and tick it to completion
    fn complete_focus(machine: &mut SessionMachine) -> Transition {
        machine.start();
        let total = machine.state().total_seconds;
        run_ticks(machine, total).pop().unwrap()
    }

    #[test]
    fn new_machine_is_idle_with_default_focus() {
        let m = machine();
        let state = m.state();
        assert_eq!(state.mode, SessionMode::Idle);
        assert_eq!(state.total_seconds, 1500);
        assert_eq!(state.remaining_seconds, 1500);
        assert_eq!(state.completed_focus_intervals, 0);
    }

    #[test]
    fn start_from_idle_begins_focus() {
        let mut m = machine();
        let t = m.start();

        assert_eq!(t.to, SessionMode::FocusRunning);
        assert_eq!(t.signal, Some(NotificationSignal::FocusStarted));
        assert_eq!(t.countdown, CountdownDirective::Restart);
        assert_eq!(m.state().remaining_seconds, 1500);
    }

    #[test]
    fn start_while_running_is_noop() {
        let mut m = machine();
        m.start();
        m.tick();

        let t = m.start();
        assert!(!t.changed);
        assert_eq!(t.countdown, CountdownDirective::Keep);
        assert_eq!(m.state().remaining_seconds, 1499);
    }

    #[test]
    fn pause_and_resume_keep_timing() {
        let mut m = machine();
        m.start();
        run_ticks(&mut m, 100);

        let t = m.pause();
        assert_eq!(t.to, SessionMode::FocusPaused);
        assert_eq!(t.countdown, CountdownDirective::Cancel);

        // Frozen while paused
        let t = m.tick();
        assert!(!t.changed);
        assert_eq!(m.state().remaining_seconds, 1400);

        let t = m.start();
        assert_eq!(t.to, SessionMode::FocusRunning);
        assert_eq!(t.signal, None);
        assert_eq!(t.countdown, CountdownDirective::Restart);
        assert_eq!(m.state().remaining_seconds, 1400);
        assert_eq!(m.state().total_seconds, 1500);
    }

    #[test]
    fn paused_break_resumes_where_it_stopped() {
        let mut m = machine();
        complete_focus(&mut m);
        m.start();
        run_ticks(&mut m, 50);

        let t = m.pause();
        assert_eq!(t.to, SessionMode::BreakPaused);
        assert_eq!(t.countdown, CountdownDirective::Cancel);
        assert!(!m.tick().changed);

        let t = m.start();
        assert!(t.changed);
        assert_eq!(t.from, SessionMode::BreakPaused);
        assert_eq!(t.to, SessionMode::BreakRunning);
        assert_eq!(t.signal, None);
        assert_eq!(t.countdown, CountdownDirective::Restart);
        assert_eq!(m.state().remaining_seconds, 250);
        assert_eq!(m.state().total_seconds, 300);
        assert_eq!(m.state().completed_focus_intervals, 1);

        // The resumed break still ends the usual way
        let transitions = run_ticks(&mut m, 250);
        let last = transitions.last().unwrap();
        assert_eq!(last.to, SessionMode::Idle);
        assert_eq!(last.signal, Some(NotificationSignal::BreakEnded));
    }

    #[test]
    fn pause_outside_running_is_noop() {
        let mut m = machine();
        assert!(!m.pause().changed);
        m.start();
        m.pause();
        assert!(!m.pause().changed);
    }

    #[test]
    fn focus_completion_offers_short_break() {
        let mut m = machine();
        m.start();

        let transitions = run_ticks(&mut m, 1500);
        let signals: Vec<_> = transitions.iter().filter_map(|t| t.signal).collect();
        assert_eq!(signals, vec![NotificationSignal::FocusEnded]);

        let last = transitions.last().unwrap();
        assert_eq!(last.to, SessionMode::BreakReady);
        assert_eq!(last.countdown, CountdownDirective::Cancel);

        let state = m.state();
        assert_eq!(state.completed_focus_intervals, 1);
        assert_eq!(state.total_seconds, 300);
        assert_eq!(state.remaining_seconds, 300);
    }

    #[test]
    fn break_ready_does_not_tick() {
        let mut m = machine();
        complete_focus(&mut m);

        assert!(!m.tick().changed);
        assert_eq!(m.state().remaining_seconds, 300);
    }

    #[test]
    fn break_runs_then_returns_to_idle() {
        let mut m = machine();
        complete_focus(&mut m);

        let t = m.start();
        assert_eq!(t.to, SessionMode::BreakRunning);
        assert_eq!(t.signal, Some(NotificationSignal::BreakStarted));
        assert_eq!(m.state().remaining_seconds, 300);

        let last = run_ticks(&mut m, 300).pop().unwrap();
        assert_eq!(last.signal, Some(NotificationSignal::BreakEnded));
        assert_eq!(m.state().mode, SessionMode::Idle);
        assert_eq!(m.state().total_seconds, 1500);
        assert_eq!(m.state().completed_focus_intervals, 1);
    }

    #[test]
    fn break_cadence_short_three_times_then_long() {
        let timer = TimerSettings::default();
        let lengths: Vec<u32> = (1..=9).map(|n| break_seconds(&timer, n)).collect();
        assert_eq!(lengths, vec![300, 300, 300, 900, 300, 300, 300, 900, 300]);
    }

    #[test]
    fn break_cadence_is_configurable() {
        let timer = TimerSettings {
            long_break_every: 2,
            ..TimerSettings::default()
        };
        assert_eq!(break_seconds(&timer, 1), 300);
        assert_eq!(break_seconds(&timer, 2), 900);
        assert_eq!(break_seconds(&timer, 3), 300);
    }

    #[test]
    fn completed_count_only_grows_on_natural_focus_completion() {
        let mut m = machine();

        m.start();
        run_ticks(&mut m, 10);
        m.pause();
        m.reset();
        assert_eq!(m.state().completed_focus_intervals, 0);

        complete_focus(&mut m);
        assert_eq!(m.state().completed_focus_intervals, 1);

        m.skip_break();
        assert_eq!(m.state().completed_focus_intervals, 1);

        m.start();
        m.reset();
        assert_eq!(m.state().completed_focus_intervals, 1);
    }

    #[test]
    fn skip_break_from_ready_and_paused() {
        let mut m = machine();
        complete_focus(&mut m);

        let t = m.skip_break();
        assert_eq!(t.to, SessionMode::Idle);
        assert_eq!(t.signal, None);
        assert_eq!(m.state().remaining_seconds, 1500);

        complete_focus(&mut m);
        m.start();
        run_ticks(&mut m, 5);
        m.pause();
        let t = m.skip_break();
        assert_eq!(t.from, SessionMode::BreakPaused);
        assert_eq!(t.to, SessionMode::Idle);
    }

    #[test]
    fn skip_break_outside_break_is_noop() {
        let mut m = machine();
        m.start();
        assert!(!m.skip_break().changed);

        let mut m = machine();
        complete_focus(&mut m);
        m.start();
        // Running break cannot be skipped, only paused or stopped
        assert!(!m.skip_break().changed);
        assert_eq!(m.state().mode, SessionMode::BreakRunning);
    }

    #[test]
    fn reset_from_paused_focus_restores_default() {
        let mut m = machine();
        m.start();
        run_ticks(&mut m, 100);
        m.pause();
        assert_eq!(m.state().remaining_seconds, 1400);

        let t = m.reset();
        assert_eq!(t.to, SessionMode::Idle);
        assert_eq!(t.countdown, CountdownDirective::Cancel);
        assert_eq!(m.state().total_seconds, 1500);
        assert_eq!(m.state().remaining_seconds, 1500);
    }

    #[test]
    fn reset_of_fresh_idle_is_noop() {
        let mut m = machine();
        assert!(!m.reset().changed);

        m.set_custom_time(600);
        assert!(m.reset().changed);
        assert_eq!(m.state().total_seconds, 1500);
    }

    #[test]
    fn add_one_minute_while_running() {
        let mut m = machine();
        m.start();
        run_ticks(&mut m, 1490);
        assert_eq!(m.state().remaining_seconds, 10);

        let t = m.add_one_minute();
        assert_eq!(t.countdown, CountdownDirective::Restart);
        assert_eq!(m.state().remaining_seconds, 70);
        assert_eq!(m.state().total_seconds, 1560);
    }

    #[test]
    fn add_one_minute_outside_running_is_noop() {
        let mut m = machine();
        assert!(!m.add_one_minute().changed);

        m.start();
        m.pause();
        assert!(!m.add_one_minute().changed);
        assert_eq!(m.state().total_seconds, 1500);
    }

    #[test]
    fn custom_time_only_in_idle() {
        let mut m = machine();
        let t = m.set_custom_time(1200);
        assert!(t.changed);
        assert_eq!(m.state().total_seconds, 1200);

        // Start uses the custom length
        m.start();
        assert_eq!(m.state().remaining_seconds, 1200);

        let before = m.state().clone();
        let t = m.set_custom_time(600);
        assert!(!t.changed);
        assert_eq!(m.state(), &before);
    }

    #[test]
    fn custom_time_rejects_zero() {
        let mut m = machine();
        assert!(!m.set_custom_time(0).changed);
        assert_eq!(m.state().total_seconds, 1500);
    }

    #[test]
    fn ambient_sound_is_independent_of_mode() {
        let mut m = machine();
        m.start();
        run_ticks(&mut m, 3);

        let t = m.set_ambient_sound(4, 1.7);
        assert!(t.changed);
        assert_eq!(t.countdown, CountdownDirective::Keep);
        assert_eq!(m.state().ambient_sound_id, 4);
        assert_eq!(m.state().ambient_volume, 1.0);
        assert_eq!(m.state().mode, SessionMode::FocusRunning);

        assert!(!m.set_ambient_sound(4, f32::NAN).changed);
        assert!(!m.set_ambient_sound(4, 1.0).changed);
    }

    #[test]
    fn attach_and_detach_task() {
        let mut m = machine();
        let task = TaskRef {
            id: TaskId::new("t-1"),
            title: "Write report".into(),
        };

        assert!(m.attach_task(Some(task.clone())).changed);
        assert!(!m.attach_task(Some(task.clone())).changed);
        assert_eq!(m.state().task, Some(task));

        assert!(m.attach_task(None).changed);
        assert_eq!(m.state().task, None);
    }

    #[test]
    fn remaining_never_exceeds_total() {
        let mut m = machine();
        m.start();
        for step in 0..4000u32 {
            match step % 7 {
                0 => {
                    m.add_one_minute();
                }
                3 => {
                    m.pause();
                }
                4 => {
                    m.start();
                }
                _ => {
                    m.tick();
                }
            }
            let state = m.state();
            assert!(state.remaining_seconds <= state.total_seconds);
            assert!(state.total_seconds >= 1);
        }
    }

    #[test]
    fn apply_dispatches_protocol_commands() {
        let mut m = machine();
        assert!(!m.apply(&Command::GetState).changed);

        let t = m.apply(&Command::SetCustomTime { seconds: 90 });
        assert!(t.changed);

        let t = m.apply(&Command::Start);
        assert_eq!(t.to, SessionMode::FocusRunning);
        assert_eq!(m.state().remaining_seconds, 90);
    }
}
