//! focusd - The focus session service
//!
//! This is the main entry point for focusd.
//! It wires together all the components:
//! - Configuration loading
//! - Keep-alive (Linux inhibitor or no-op)
//! - Focus engine on the system clock
//! - UI and notification observers
//! - JSON-lines command surface on stdin/stdout

mod observers;
mod output;
mod protocol;

use anyhow::{Context, Result};
use clap::Parser;
use focus_api::{Event, EventPayload, ResponsePayload, ResponseResult};
use focus_config::{load_config_or_default, Settings};
use focus_core::{FocusEngine, SystemClock};
use focus_host_api::{KeepAlive, NoopKeepAlive};
use focus_host_linux::LinuxKeepAlive;
use focus_util::default_config_path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::output::Output;

/// focusd - Focus session timer service
#[derive(Parser, Debug)]
#[command(name = "focusd")]
#[command(about = "Focus session timer with breaks, driven over stdin/stdout", long_about = None)]
struct Args {
    /// Configuration file path (default: ~/.config/focusd/config.toml)
    #[arg(short, long, default_value_os_t = default_config_path())]
    config: PathBuf,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Do not hold a keep-alive while a countdown runs
    #[arg(long)]
    no_keep_alive: bool,
}

/// Main service state
struct Service {
    engine: FocusEngine,
    output: Output,
    writer: tokio::task::JoinHandle<()>,
}

impl Service {
    fn new(args: &Args) -> Result<Self> {
        let settings = load_config_or_default(&args.config)
            .with_context(|| format!("Failed to load config from {:?}", args.config))?;

        info!(
            config_path = %args.config.display(),
            focus_seconds = settings.timer.focus_seconds,
            "Configuration loaded"
        );

        let keep_alive = Self::keep_alive(&settings, args.no_keep_alive);
        info!(keep_alive = keep_alive.name(), "Keep-alive initialized");

        let engine = FocusEngine::spawn(
            settings.timer,
            settings.ambient,
            Arc::new(SystemClock::new()),
            keep_alive,
        );

        let (output, writer) = Output::spawn();

        Ok(Self {
            engine,
            output,
            writer,
        })
    }

    fn keep_alive(settings: &Settings, disabled: bool) -> Arc<dyn KeepAlive> {
        if disabled || !settings.service.keep_alive {
            Arc::new(NoopKeepAlive::new())
        } else {
            Arc::new(LinuxKeepAlive::new(settings.service.inhibit_command.clone()))
        }
    }

    async fn run(self) -> Result<()> {
        let ui = observers::spawn_ui_observer(&self.engine, self.output.clone());
        let notifications = observers::spawn_notification_observer(&self.engine);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        // Set up signal handlers
        let mut sigterm = signal(SignalKind::terminate())
            .context("Failed to create SIGTERM handler")?;
        let mut sigint = signal(SignalKind::interrupt())
            .context("Failed to create SIGINT handler")?;
        let mut sighup = signal(SignalKind::hangup())
            .context("Failed to create SIGHUP handler")?;

        let mut next_request_id = 1u64;

        info!("Service running");

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully");
                    break;
                }
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully");
                    break;
                }
                _ = sighup.recv() => {
                    info!("Received SIGHUP, shutting down gracefully");
                    break;
                }

                line = next_input_line(&mut lines) => {
                    let Some(line) = line else {
                        info!("Input closed, shutting down");
                        break;
                    };
                    self.handle_line(&line, next_request_id).await;
                    next_request_id += 1;
                }
            }
        }

        // Graceful shutdown
        info!("Shutting down focusd");
        if let Err(e) = self.engine.shutdown().await {
            warn!(error = %e, "Engine did not stop cleanly");
        }

        for (name, observer) in [("ui", ui), ("notifications", notifications)] {
            if let Err(e) = observer.await {
                warn!(observer = name, error = %e, "Observer ended abnormally");
            }
        }

        self.output.send(&Event::new(EventPayload::Shutdown));
        drop(self.output);
        if let Err(e) = self.writer.await {
            warn!(error = %e, "Output writer ended abnormally");
        }

        info!("Shutdown complete");
        Ok(())
    }

    async fn handle_line(&self, line: &str, request_id: u64) {
        let request = match protocol::parse_line(line, request_id) {
            Ok(request) => request,
            Err(e) => {
                debug!(error = %e, "Rejected input line");
                self.output
                    .send(&protocol::parse_error_response(request_id, &e));
                return;
            }
        };

        let response = protocol::handle_request(&self.engine, request).await;

        if let ResponseResult::Ok(ResponsePayload::Applied {
            warning: Some(message),
            ..
        }) = &response.result
        {
            self.output.send(&Event::new(EventPayload::KeepAliveWarning {
                message: message.clone(),
            }));
        }

        self.output.send(&response);
    }
}

/// Next non-blank input line; `None` at end of input or on a read error
async fn next_input_line<R>(lines: &mut Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        match lines.next_line().await {
            Ok(Some(line)) if line.trim().is_empty() => continue,
            Ok(Some(line)) => return Some(line),
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "Failed to read input");
                return None;
            }
        }
    }
}

/// How long shutdown waits for blocking work, such as a pending stdin read
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout carries the protocol, so logs go to stderr
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "focusd starting"
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
    let result = runtime.block_on(async {
        let service = Service::new(&args)?;
        service.run().await
    });

    // A stdin read blocked on a terminal never returns by itself
    runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
    result
}
