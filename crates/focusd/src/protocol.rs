//! Line protocol on stdin/stdout
//!
//! Each input line is either a JSON [`Request`] or a shorthand word such as
//! `custom 1200`. Any [`Action`] name (`start`, `start_break`, `stop`, ...)
//! is accepted too and issues that action's command. Every request gets
//! exactly one [`Response`].

use focus_api::{
    Action, Command, ErrorCode, ErrorInfo, Request, Response, ResponsePayload, TaskRef,
    API_VERSION,
};
use focus_core::{CommandOutcome, FocusEngine};
use focus_util::{FocusError, TaskId};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty command line")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Invalid argument for {command}: {reason}")]
    InvalidArgument {
        command: &'static str,
        reason: String,
    },

    #[error("Invalid JSON request: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse one input line. Shorthand commands are numbered with `request_id`.
pub fn parse_line(line: &str, request_id: u64) -> Result<Request, ParseError> {
    let line = line.trim();
    if line.starts_with('{') {
        return Ok(serde_json::from_str(line)?);
    }

    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Err(ParseError::Empty);
    };

    let command = match word {
        "skip" => Command::SkipBreak,
        "reset" => Command::Reset,
        "+1" => Command::AddOneMinute,
        "state" => Command::GetState,
        "ping" => Command::Ping,
        "custom" => {
            let seconds = parse_arg(words.next(), "custom", "seconds")?;
            Command::SetCustomTime { seconds }
        }
        "sound" => {
            let sound_id = parse_arg(words.next(), "sound", "sound id")?;
            let volume = parse_arg(words.next(), "sound", "volume")?;
            Command::SetAmbientSound { sound_id, volume }
        }
        "task" => {
            let task = words.next().map(|id| TaskRef {
                id: TaskId::new(id),
                title: words.collect::<Vec<_>>().join(" "),
            });
            Command::AttachTask { task }
        }
        other => match Action::from_name(other) {
            Some(action) => action.command(),
            None => return Err(ParseError::Unknown(other.to_string())),
        },
    };

    Ok(Request::new(request_id, command))
}

fn parse_arg<T: std::str::FromStr>(
    arg: Option<&str>,
    command: &'static str,
    name: &str,
) -> Result<T, ParseError> {
    let arg = arg.ok_or_else(|| ParseError::InvalidArgument {
        command,
        reason: format!("missing {}", name),
    })?;
    arg.parse().map_err(|_| ParseError::InvalidArgument {
        command,
        reason: format!("{} '{}' is not a valid number", name, arg),
    })
}

/// Run a request against the engine and build its response
pub async fn handle_request(engine: &FocusEngine, request: Request) -> Response {
    let request_id = request.request_id;

    if request.api_version != API_VERSION {
        return Response::error(
            request_id,
            ErrorInfo::new(
                ErrorCode::UnsupportedVersion,
                format!(
                    "API version {} is not supported (expected {})",
                    request.api_version, API_VERSION
                ),
            ),
        );
    }

    debug!(request_id, command = request.command.name(), "Handling request");

    match request.command {
        Command::GetState => Response::success(request_id, ResponsePayload::State(engine.snapshot())),
        Command::Ping => Response::success(request_id, ResponsePayload::Pong),
        command => match engine.execute(command).await {
            Ok(outcome) => Response::success(request_id, applied(outcome)),
            Err(FocusError::EngineStopped) => Response::error(
                request_id,
                ErrorInfo::new(ErrorCode::EngineStopped, "Engine is stopped"),
            ),
            Err(e) => Response::error(
                request_id,
                ErrorInfo::new(ErrorCode::InternalError, e.to_string()),
            ),
        },
    }
}

/// Response for a rejected input line
pub fn parse_error_response(request_id: u64, error: &ParseError) -> Response {
    Response::error(
        request_id,
        ErrorInfo::new(ErrorCode::InvalidRequest, error.to_string()),
    )
}

fn applied(outcome: CommandOutcome) -> ResponsePayload {
    ResponsePayload::Applied {
        snapshot: outcome.snapshot,
        changed: outcome.changed,
        signal: outcome.signal,
        warning: outcome.warning.map(|w| w.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_api::{ResponseResult, SessionMode};
    use focus_config::{AmbientSettings, TimerSettings};
    use focus_core::ManualClock;
    use focus_host_api::NoopKeepAlive;
    use std::sync::Arc;

    #[test]
    fn parse_shorthand_words() {
        let cases = [
            ("start", Command::Start),
            ("resume", Command::Start),
            ("  pause ", Command::Pause),
            ("skip", Command::SkipBreak),
            ("stop", Command::Reset),
            ("+1", Command::AddOneMinute),
            ("custom 1200", Command::SetCustomTime { seconds: 1200 }),
            ("state", Command::GetState),
            ("start_break", Command::Start),
            ("skip_break", Command::SkipBreak),
            ("add_one_minute", Command::AddOneMinute),
        ];

        for (line, expected) in cases {
            let request = parse_line(line, 4).unwrap();
            assert_eq!(request.command, expected, "line {:?}", line);
            assert_eq!(request.request_id, 4);
        }
    }

    #[test]
    fn parse_sound_and_task() {
        let request = parse_line("sound 3 0.4", 1).unwrap();
        assert_eq!(
            request.command,
            Command::SetAmbientSound {
                sound_id: 3,
                volume: 0.4
            }
        );

        let request = parse_line("task t-9 Write the report", 2).unwrap();
        let Command::AttachTask { task: Some(task) } = request.command else {
            panic!("Expected attached task");
        };
        assert_eq!(task.id.as_str(), "t-9");
        assert_eq!(task.title, "Write the report");

        let request = parse_line("task", 3).unwrap();
        assert_eq!(request.command, Command::AttachTask { task: None });
    }

    #[test]
    fn every_offered_action_parses() {
        for action in Action::ALL {
            let request = parse_line(action.as_str(), 1).unwrap();
            assert_eq!(request.command, action.command(), "action {:?}", action);
        }
    }

    #[test]
    fn parse_json_request() {
        let request =
            parse_line(r#"{"request_id":17,"command":{"type":"skip_break"}}"#, 1).unwrap();
        assert_eq!(request.request_id, 17);
        assert_eq!(request.command, Command::SkipBreak);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(parse_line("   ", 1), Err(ParseError::Empty)));
        assert!(matches!(parse_line("launch", 1), Err(ParseError::Unknown(w)) if w == "launch"));
        assert!(matches!(
            parse_line("custom", 1),
            Err(ParseError::InvalidArgument { command: "custom", .. })
        ));
        assert!(matches!(
            parse_line("custom ten", 1),
            Err(ParseError::InvalidArgument { .. })
        ));
        assert!(matches!(parse_line("{not json", 1), Err(ParseError::Json(_))));
    }

    fn engine() -> FocusEngine {
        FocusEngine::spawn(
            TimerSettings::default(),
            AmbientSettings::default(),
            Arc::new(ManualClock::new()),
            Arc::new(NoopKeepAlive::new()),
        )
    }

    #[tokio::test]
    async fn applied_response_carries_snapshot() {
        let engine = engine();
        let response = handle_request(&engine, Request::new(1, Command::Start)).await;

        match response.result {
            ResponseResult::Ok(ResponsePayload::Applied {
                snapshot,
                changed,
                signal,
                warning,
            }) => {
                assert!(changed);
                assert_eq!(snapshot.state.mode, SessionMode::FocusRunning);
                assert!(signal.is_some());
                assert!(warning.is_none());
            }
            other => panic!("Unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn wrong_api_version_is_rejected() {
        let engine = engine();
        let mut request = Request::new(2, Command::Start);
        request.api_version = API_VERSION + 1;

        let response = handle_request(&engine, request).await;
        assert!(matches!(
            response.result,
            ResponseResult::Err(ErrorInfo { code: ErrorCode::UnsupportedVersion, .. })
        ));
        assert_eq!(engine.snapshot().state.mode, SessionMode::Idle);
    }

    #[tokio::test]
    async fn stopped_engine_reports_error() {
        let engine = engine();
        engine.shutdown().await.unwrap();

        let response = handle_request(&engine, Request::new(3, Command::Pause)).await;
        assert!(matches!(
            response.result,
            ResponseResult::Err(ErrorInfo { code: ErrorCode::EngineStopped, .. })
        ));
    }
}
