//! Command types for the focus engine protocol

use serde::{Deserialize, Serialize};

use crate::{NotificationSignal, Snapshot, TaskRef, API_VERSION};

/// Request wrapper with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Request ID for correlation
    pub request_id: u64,
    /// API version
    #[serde(default = "current_api_version")]
    pub api_version: u32,
    /// The command
    pub command: Command,
}

fn current_api_version() -> u32 {
    API_VERSION
}

impl Request {
    pub fn new(request_id: u64, command: Command) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            command,
        }
    }
}

/// Response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Corresponding request ID
    pub request_id: u64,
    /// API version
    pub api_version: u32,
    /// Response payload or error
    pub result: ResponseResult,
}

impl Response {
    pub fn success(request_id: u64, payload: ResponsePayload) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Ok(payload),
        }
    }

    pub fn error(request_id: u64, error: ErrorInfo) -> Self {
        Self {
            request_id,
            api_version: API_VERSION,
            result: ResponseResult::Err(error),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseResult {
    Ok(ResponsePayload),
    Err(ErrorInfo),
}

/// Error information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorCode,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Error codes for the protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    UnsupportedVersion,
    EngineStopped,
    InternalError,
}

/// All commands accepted by the engine.
///
/// Commands issued from a mode that does not permit them are no-ops,
/// never errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Get the current snapshot
    GetState,

    /// Start focus, start the prepared break, or resume a paused interval
    Start,

    /// Pause the running interval
    Pause,

    /// Drop the prepared or paused break and return to idle
    SkipBreak,

    /// Return to idle with the default focus duration
    Reset,

    /// Extend the running interval by one minute
    AddOneMinute,

    /// Set the next focus duration (idle only)
    SetCustomTime { seconds: u32 },

    /// Select the background sound
    SetAmbientSound { sound_id: u32, volume: f32 },

    /// Attach (or with `None`, detach) the task being worked on
    AttachTask { task: Option<TaskRef> },

    Ping,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetState => "get_state",
            Command::Start => "start",
            Command::Pause => "pause",
            Command::SkipBreak => "skip_break",
            Command::Reset => "reset",
            Command::AddOneMinute => "add_one_minute",
            Command::SetCustomTime { .. } => "set_custom_time",
            Command::SetAmbientSound { .. } => "set_ambient_sound",
            Command::AttachTask { .. } => "attach_task",
            Command::Ping => "ping",
        }
    }
}

/// Response payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponsePayload {
    State(Snapshot),
    Applied {
        snapshot: Snapshot,
        /// False when the command was a no-op in the current mode
        changed: bool,
        signal: Option<NotificationSignal>,
        /// Non-fatal warning, e.g. the keep-alive could not be acquired
        warning: Option<String>,
    },
    Pong,
}
