//! Inhibitor process management

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::debug;

/// Child process holding the inhibitor, in its own process group
pub struct InhibitorProcess {
    child: Child,
    pub pid: u32,
    pub pgid: u32,
}

impl InhibitorProcess {
    /// Spawn the inhibitor command in a new session
    pub fn spawn(argv: &[String]) -> std::io::Result<Self> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "Empty inhibitor command")
        })?;

        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::null());
        cmd.stderr(Stdio::null());

        // The inhibitor becomes its own process group leader, so release can
        // signal the whole group (systemd-inhibit forks its wrapped command)
        // SAFETY: setsid is async-signal-safe and runs in the pre-exec context
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid().map_err(std::io::Error::other)?;
                Ok(())
            });
        }

        let child = cmd.spawn()?;
        let pid = child.id();
        let pgid = pid; // After setsid, pid == pgid

        debug!(pid = pid, program = %program, "Inhibitor spawned");

        Ok(Self { child, pid, pgid })
    }

    /// Send SIGTERM to the process group
    pub fn terminate(&self) -> nix::Result<()> {
        self.signal_group(Signal::SIGTERM)
    }

    /// Send SIGKILL to the process group
    pub fn kill(&self) -> nix::Result<()> {
        self.signal_group(Signal::SIGKILL)
    }

    fn signal_group(&self, sig: Signal) -> nix::Result<()> {
        let pgid = Pid::from_raw(-(self.pgid as i32)); // Negative for process group

        match signal::kill(pgid, sig) {
            Ok(()) => {
                debug!(pgid = self.pgid, signal = ?sig, "Signaled inhibitor group");
                Ok(())
            }
            // Process already gone
            Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Check if the process has exited (non-blocking)
    pub fn try_wait(&mut self) -> std::io::Result<Option<ExitStatus>> {
        self.child.try_wait()
    }
}
