//! Validated settings structures

use crate::schema::{RawAmbientConfig, RawConfig, RawServiceConfig, RawTimerConfig};

pub const DEFAULT_FOCUS_SECONDS: u32 = 25 * 60;
pub const DEFAULT_SHORT_BREAK_SECONDS: u32 = 5 * 60;
pub const DEFAULT_LONG_BREAK_SECONDS: u32 = 15 * 60;
pub const DEFAULT_LONG_BREAK_EVERY: u32 = 4;
pub const DEFAULT_AMBIENT_VOLUME: f32 = 0.5;

/// Validated settings ready for use by the engine and the host service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    pub timer: TimerSettings,
    pub ambient: AmbientSettings,
    pub service: ServiceConfig,
}

impl Settings {
    /// Convert from raw config (after validation)
    pub fn from_raw(raw: RawConfig) -> Self {
        Self {
            timer: TimerSettings::from_raw(raw.timer),
            ambient: AmbientSettings::from_raw(raw.ambient),
            service: ServiceConfig::from_raw(raw.service),
        }
    }
}

/// Interval durations and long-break cadence, all at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    pub focus_seconds: u32,
    pub short_break_seconds: u32,
    pub long_break_seconds: u32,
    pub long_break_every: u32,
}

impl TimerSettings {
    fn from_raw(raw: RawTimerConfig) -> Self {
        let defaults = Self::default();
        Self {
            focus_seconds: raw.focus_seconds.unwrap_or(defaults.focus_seconds),
            short_break_seconds: raw
                .short_break_seconds
                .unwrap_or(defaults.short_break_seconds),
            long_break_seconds: raw
                .long_break_seconds
                .unwrap_or(defaults.long_break_seconds),
            long_break_every: raw.long_break_every.unwrap_or(defaults.long_break_every),
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_seconds: DEFAULT_FOCUS_SECONDS,
            short_break_seconds: DEFAULT_SHORT_BREAK_SECONDS,
            long_break_seconds: DEFAULT_LONG_BREAK_SECONDS,
            long_break_every: DEFAULT_LONG_BREAK_EVERY,
        }
    }
}

/// Ambient sound selected when the engine is created
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientSettings {
    pub sound_id: u32,
    pub volume: f32,
}

impl AmbientSettings {
    fn from_raw(raw: RawAmbientConfig) -> Self {
        Self {
            sound_id: raw.sound_id.unwrap_or(0),
            volume: raw.volume.unwrap_or(DEFAULT_AMBIENT_VOLUME),
        }
    }
}

impl Default for AmbientSettings {
    fn default() -> Self {
        Self {
            sound_id: 0,
            volume: DEFAULT_AMBIENT_VOLUME,
        }
    }
}

/// Host service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub keep_alive: bool,
    pub inhibit_command: Vec<String>,
}

impl ServiceConfig {
    fn from_raw(raw: RawServiceConfig) -> Self {
        Self {
            keep_alive: raw.keep_alive.unwrap_or(true),
            inhibit_command: raw
                .inhibit_command
                .unwrap_or_else(default_inhibit_command),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            keep_alive: true,
            inhibit_command: default_inhibit_command(),
        }
    }
}

fn default_inhibit_command() -> Vec<String> {
    [
        "systemd-inhibit",
        "--what=idle:sleep",
        "--who=focusd",
        "--why=Focus session running",
        "--mode=block",
        "sleep",
        "infinity",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}
