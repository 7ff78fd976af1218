//! Linux keep-alive implementation

use async_trait::async_trait;
use focus_host_api::{KeepAlive, KeepAliveError, KeepAliveResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::process::InhibitorProcess;

/// How long a freshly spawned inhibitor must survive to count as granted
const STARTUP_GRACE: Duration = Duration::from_millis(50);

/// How long release waits after SIGTERM before escalating to SIGKILL
const RELEASE_TIMEOUT: Duration = Duration::from_secs(1);

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Keep-alive backed by an inhibitor process (systemd-inhibit by default)
pub struct LinuxKeepAlive {
    argv: Vec<String>,
    process: Mutex<Option<InhibitorProcess>>,
    held: AtomicBool,
}

impl LinuxKeepAlive {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            process: Mutex::new(None),
            held: AtomicBool::new(false),
        }
    }

    fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("<empty>")
    }
}

#[async_trait]
impl KeepAlive for LinuxKeepAlive {
    fn name(&self) -> &str {
        "linux-inhibitor"
    }

    async fn acquire(&self) -> KeepAliveResult<()> {
        let mut slot = self.process.lock().await;

        if let Some(proc) = slot.as_mut() {
            match proc.try_wait()? {
                None => return Ok(()),
                Some(status) => {
                    warn!(pid = proc.pid, status = %status, "Inhibitor exited on its own, respawning");
                    *slot = None;
                    self.held.store(false, Ordering::SeqCst);
                }
            }
        }

        let mut proc = InhibitorProcess::spawn(&self.argv)
            .map_err(|e| KeepAliveError::Unavailable(format!("{}: {}", self.program(), e)))?;

        tokio::time::sleep(STARTUP_GRACE).await;
        if let Some(status) = proc.try_wait()? {
            return Err(KeepAliveError::Denied(format!(
                "{} exited immediately ({})",
                self.program(),
                status
            )));
        }

        info!(pid = proc.pid, "Keep-alive inhibitor acquired");
        *slot = Some(proc);
        self.held.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn release(&self) -> KeepAliveResult<()> {
        let Some(mut proc) = self.process.lock().await.take() else {
            return Ok(());
        };
        self.held.store(false, Ordering::SeqCst);

        proc.terminate()
            .map_err(|e| KeepAliveError::ReleaseFailed(e.to_string()))?;

        let mut waited = Duration::ZERO;
        while waited < RELEASE_TIMEOUT {
            if proc.try_wait()?.is_some() {
                info!(pid = proc.pid, "Keep-alive inhibitor released");
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
            waited += POLL_INTERVAL;
        }

        warn!(pid = proc.pid, "Inhibitor ignored SIGTERM, killing");
        proc.kill()
            .map_err(|e| KeepAliveError::ReleaseFailed(e.to_string()))?;
        tokio::time::sleep(POLL_INTERVAL).await;
        // Reap if it is already gone; otherwise init adopts it
        let _ = proc.try_wait();
        Ok(())
    }

    fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}
