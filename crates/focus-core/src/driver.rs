//! Countdown driver
//!
//! Owns at most one tick loop at a time. Every loop is tagged with a
//! generation number; restarting or cancelling bumps the generation so
//! ticks still in flight from an older loop are recognised and dropped.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::{Clock, CountdownDirective, Tick};

/// A tick forwarded from a loop, tagged with the loop's generation
#[derive(Debug)]
pub struct TickMsg {
    pub generation: u64,
    pub tick: Tick,
}

/// Driver counters, exposed through engine diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriverStats {
    pub generation: u64,
    pub active: bool,
    pub stale_ticks: u64,
}

pub struct CountdownDriver {
    clock: Arc<dyn Clock>,
    tick_tx: mpsc::UnboundedSender<TickMsg>,
    generation: u64,
    active: Option<JoinHandle<()>>,
    stale_ticks: u64,
}

impl CountdownDriver {
    pub fn new(clock: Arc<dyn Clock>, tick_tx: mpsc::UnboundedSender<TickMsg>) -> Self {
        Self {
            clock,
            tick_tx,
            generation: 0,
            active: None,
            stale_ticks: 0,
        }
    }

    pub fn apply(&mut self, directive: CountdownDirective) {
        match directive {
            CountdownDirective::Keep => {}
            CountdownDirective::Restart => self.restart(),
            CountdownDirective::Cancel => self.cancel(),
        }
    }

    /// Cancel any running loop and start a new one under a fresh generation
    pub fn restart(&mut self) {
        self.cancel();

        let generation = self.generation;
        // Created before spawning so the first period starts now
        let mut ticker = self.clock.ticker();
        let tick_tx = self.tick_tx.clone();

        let handle = tokio::spawn(async move {
            loop {
                let tick = ticker.tick().await;
                if tick_tx.send(TickMsg { generation, tick }).is_err() {
                    break;
                }
            }
        });

        debug!(generation, "Countdown loop started");
        self.active = Some(handle);
    }

    /// Stop the running loop, if any. Ticks it already sent become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        if let Some(handle) = self.active.take() {
            handle.abort();
            debug!(generation = self.generation, "Countdown loop cancelled");
        }
    }

    /// Whether a tick from `generation` belongs to the live loop
    pub fn accept(&mut self, generation: u64) -> bool {
        if self.active.is_some() && generation == self.generation {
            return true;
        }

        debug_assert!(generation <= self.generation, "tick from a future generation");
        self.stale_ticks += 1;
        debug!(
            tick_generation = generation,
            current_generation = self.generation,
            "Dropping stale tick"
        );
        false
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn stats(&self) -> DriverStats {
        DriverStats {
            generation: self.generation,
            active: self.is_active(),
            stale_ticks: self.stale_ticks,
        }
    }
}

impl Drop for CountdownDriver {
    fn drop(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.abort();
        }
    }
}
