//! Raw configuration schema (as parsed from TOML)

use serde::{Deserialize, Serialize};

/// Raw configuration as parsed from TOML
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawConfig {
    /// Config schema version
    pub config_version: u32,

    /// Interval durations and cadence
    #[serde(default)]
    pub timer: RawTimerConfig,

    /// Default ambient sound selection
    #[serde(default)]
    pub ambient: RawAmbientConfig,

    /// Host service settings
    #[serde(default)]
    pub service: RawServiceConfig,
}

/// Timer settings; every field is optional and falls back to the defaults
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawTimerConfig {
    /// Focus interval length in seconds (default: 1500)
    pub focus_seconds: Option<u32>,

    /// Short break length in seconds (default: 300)
    pub short_break_seconds: Option<u32>,

    /// Long break length in seconds (default: 900)
    pub long_break_seconds: Option<u32>,

    /// Every Nth completed focus interval earns a long break (default: 4)
    pub long_break_every: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawAmbientConfig {
    pub sound_id: Option<u32>,

    /// 0.0 to 1.0
    pub volume: Option<f32>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawServiceConfig {
    /// Hold a keep-alive while a countdown runs (default: true)
    pub keep_alive: Option<bool>,

    /// Command that keeps the host awake for as long as it runs
    pub inhibit_command: Option<Vec<String>>,
}
