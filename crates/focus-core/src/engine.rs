//! The focus engine
//!
//! A single actor task owns the [`SessionMachine`] and the
//! [`CountdownDriver`]. User commands and driver ticks both arrive on
//! channels and are handled one at a time, so there is exactly one writer
//! of the engine state. Keep-alive calls run on a separate worker so a slow
//! host never holds up the countdown. [`FocusEngine`] is the cloneable handle
//! callers use.

use focus_api::{Command, SessionMode, Snapshot, TaskRef};
use focus_config::{AmbientSettings, TimerSettings};
use focus_host_api::KeepAlive;
use focus_util::{FocusError, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::keep_alive::{Completion, KeepAliveWorker};
use crate::{
    Broadcaster, Clock, CommandOutcome, CountdownDriver, DriverStats, SessionMachine,
    Subscription, TickMsg, Transition,
};

/// Point-in-time counters for debugging a running engine
#[derive(Debug, Clone, PartialEq)]
pub struct EngineDiagnostics {
    pub revision: u64,
    pub mode: SessionMode,
    pub driver: DriverStats,
    pub commands_processed: u64,
    pub ticks_processed: u64,
    pub subscribers: usize,
    pub keep_alive_held: bool,
}

enum EngineMsg {
    Command {
        command: Command,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Diagnostics {
        reply: oneshot::Sender<EngineDiagnostics>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

/// Handle to a running engine
#[derive(Clone)]
pub struct FocusEngine {
    tx: mpsc::UnboundedSender<EngineMsg>,
    broadcaster: Arc<Broadcaster>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl FocusEngine {
    /// Create the engine in `Idle` and start its actor on the current runtime.
    ///
    /// The engine stops on [`FocusEngine::shutdown`] or once every handle
    /// has been dropped.
    pub fn spawn(
        timer: TimerSettings,
        ambient: AmbientSettings,
        clock: Arc<dyn Clock>,
        keep_alive: Arc<dyn KeepAlive>,
    ) -> Self {
        let machine = SessionMachine::new(timer, ambient);
        let broadcaster = Arc::new(Broadcaster::new(machine.state().clone()));

        let (tx, commands) = mpsc::unbounded_channel();
        let (tick_tx, ticks) = mpsc::unbounded_channel();

        let actor = EngineActor {
            machine,
            driver: CountdownDriver::new(clock, tick_tx),
            broadcaster: broadcaster.clone(),
            keep_alive: KeepAliveWorker::spawn(keep_alive),
            commands,
            ticks,
            commands_processed: 0,
            ticks_processed: 0,
        };

        info!(
            focus_seconds = timer.focus_seconds,
            short_break_seconds = timer.short_break_seconds,
            long_break_seconds = timer.long_break_seconds,
            long_break_every = timer.long_break_every,
            "Focus engine started"
        );

        let handle = tokio::spawn(actor.run());

        Self {
            tx,
            broadcaster,
            task: Arc::new(Mutex::new(Some(handle))),
        }
    }

    /// Run one command through the engine and wait for its outcome
    pub async fn execute(&self, command: Command) -> Result<CommandOutcome> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineMsg::Command { command, reply })
            .map_err(|_| FocusError::EngineStopped)?;
        rx.await.map_err(|_| FocusError::EngineStopped)
    }

    pub async fn start(&self) -> Result<CommandOutcome> {
        self.execute(Command::Start).await
    }

    pub async fn pause(&self) -> Result<CommandOutcome> {
        self.execute(Command::Pause).await
    }

    pub async fn skip_break(&self) -> Result<CommandOutcome> {
        self.execute(Command::SkipBreak).await
    }

    pub async fn reset(&self) -> Result<CommandOutcome> {
        self.execute(Command::Reset).await
    }

    pub async fn add_one_minute(&self) -> Result<CommandOutcome> {
        self.execute(Command::AddOneMinute).await
    }

    pub async fn set_custom_time(&self, seconds: u32) -> Result<CommandOutcome> {
        self.execute(Command::SetCustomTime { seconds }).await
    }

    pub async fn set_ambient_sound(&self, sound_id: u32, volume: f32) -> Result<CommandOutcome> {
        self.execute(Command::SetAmbientSound { sound_id, volume })
            .await
    }

    pub async fn attach_task(&self, task: Option<TaskRef>) -> Result<CommandOutcome> {
        self.execute(Command::AttachTask { task }).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> Snapshot {
        self.broadcaster.current()
    }

    /// Attach an observer. It immediately receives the current snapshot.
    pub fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe()
    }

    pub async fn diagnostics(&self) -> Result<EngineDiagnostics> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineMsg::Diagnostics { reply })
            .map_err(|_| FocusError::EngineStopped)?;
        rx.await.map_err(|_| FocusError::EngineStopped)
    }

    pub fn is_stopped(&self) -> bool {
        self.tx.is_closed()
    }

    /// Stop the countdown, release the keep-alive and close all subscriptions.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(EngineMsg::Shutdown { reply }).is_ok() {
            let _ = rx.await;
        }

        if let Some(handle) = self.task.lock().await.take() {
            handle
                .await
                .map_err(|e| FocusError::internal(format!("engine task failed: {}", e)))?;
        }
        Ok(())
    }
}

struct EngineActor {
    machine: SessionMachine,
    driver: CountdownDriver,
    broadcaster: Arc<Broadcaster>,
    keep_alive: KeepAliveWorker,
    commands: mpsc::UnboundedReceiver<EngineMsg>,
    ticks: mpsc::UnboundedReceiver<TickMsg>,
    commands_processed: u64,
    ticks_processed: u64,
}

impl EngineActor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                msg = self.commands.recv() => match msg {
                    Some(EngineMsg::Command { command, reply }) => {
                        self.handle_command(command, reply);
                    }
                    Some(EngineMsg::Diagnostics { reply }) => {
                        let _ = reply.send(self.diagnostics());
                    }
                    Some(EngineMsg::Shutdown { reply }) => {
                        info!("Engine shutdown requested");
                        self.teardown().await;
                        let _ = reply.send(());
                        return;
                    }
                    None => {
                        debug!("All engine handles dropped");
                        self.teardown().await;
                        return;
                    }
                },

                Some(msg) = self.ticks.recv() => {
                    self.handle_tick(msg);
                }
            }
        }
    }

    fn handle_command(&mut self, command: Command, reply: oneshot::Sender<CommandOutcome>) {
        self.commands_processed += 1;

        let transition = self.machine.apply(&command);
        if transition.changed {
            info!(
                command = command.name(),
                from = %transition.from,
                to = %transition.to,
                remaining_seconds = self.machine.state().remaining_seconds,
                "Command applied"
            );
        } else if !matches!(command, Command::GetState | Command::Ping) {
            debug!(command = command.name(), mode = %transition.from, "Command ignored in current mode");
        }

        self.commit(&transition);

        let outcome = CommandOutcome {
            snapshot: self.broadcaster.current(),
            changed: transition.changed,
            signal: transition.signal,
            warning: None,
        };
        // The reply waits for the keep-alive change, the actor does not
        self.sync_keep_alive(&transition, Completion::Reply { outcome, reply });
    }

    fn handle_tick(&mut self, msg: TickMsg) {
        let TickMsg { generation, tick } = msg;
        if !self.driver.accept(generation) {
            return;
        }

        self.ticks_processed += 1;
        let transition = self.machine.tick();
        if transition.from != transition.to {
            info!(from = %transition.from, to = %transition.to, "Interval completed");
        }
        self.commit(&transition);

        // Releasing the tick tells a manual clock it has been fully handled
        self.sync_keep_alive(&transition, Completion::Tick(tick));
    }

    /// Apply a transition's side effects in order: countdown, snapshot, signal
    fn commit(&mut self, transition: &Transition) {
        self.driver.apply(transition.countdown);

        if transition.changed {
            self.broadcaster.publish(self.machine.state());
        }

        if let Some(signal) = transition.signal {
            let receivers = self.broadcaster.emit(signal);
            info!(signal = %signal, receivers, "Notification signal emitted");
        }
    }

    /// Hold the keep-alive exactly while a countdown runs.
    ///
    /// Only transitions into or out of a running mode queue a change;
    /// anything else completes right away.
    fn sync_keep_alive(&self, transition: &Transition, completion: Completion) {
        if transition.from.is_running() != transition.to.is_running() {
            self.keep_alive
                .request(transition.to.is_running(), completion);
        } else {
            completion.finish(None);
        }
    }

    fn diagnostics(&self) -> EngineDiagnostics {
        EngineDiagnostics {
            revision: self.broadcaster.current().revision,
            mode: self.machine.state().mode,
            driver: self.driver.stats(),
            commands_processed: self.commands_processed,
            ticks_processed: self.ticks_processed,
            subscribers: self.broadcaster.subscriber_count(),
            keep_alive_held: self.keep_alive.is_held(),
        }
    }

    async fn teardown(&mut self) {
        self.driver.cancel();
        self.keep_alive.stop().await;
        self.broadcaster.close();
        info!(
            completed_focus_intervals = self.machine.state().completed_focus_intervals,
            "Focus engine stopped"
        );
    }
}
