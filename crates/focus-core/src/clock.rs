//! Clock sources for the countdown
//!
//! A [`Clock`] hands out [`Ticker`]s, one per countdown run. The system clock
//! ticks once per second on the tokio timer; the manual clock ticks only
//! when a test calls [`ManualClock::advance`].

use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, Interval};

/// Default countdown resolution
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// One elapsed period.
///
/// Manual ticks carry an acknowledgement that fires when the tick is
/// dropped, which the engine does only after it has fully processed it.
#[derive(Debug, Default)]
pub struct Tick {
    _ack: Option<oneshot::Sender<()>>,
}

impl Tick {
    pub fn new() -> Self {
        Self::default()
    }

    fn acknowledged() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self { _ack: Some(tx) }, rx)
    }
}

/// Stream of ticks for a single countdown run
#[async_trait]
pub trait Ticker: Send {
    /// Wait for the next period to elapse
    async fn tick(&mut self) -> Tick;
}

/// Source of tickers
pub trait Clock: Send + Sync {
    /// Create a ticker whose first tick arrives one full period from now
    fn ticker(&self) -> Box<dyn Ticker>;
}

/// Real-time clock backed by `tokio::time`
#[derive(Debug, Clone)]
pub struct SystemClock {
    period: Duration,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::with_period(TICK_PERIOD)
    }

    pub fn with_period(period: Duration) -> Self {
        Self { period }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn ticker(&self) -> Box<dyn Ticker> {
        let interval = interval_at(Instant::now() + self.period, self.period);
        Box::new(SystemTicker { interval })
    }
}

struct SystemTicker {
    interval: Interval,
}

#[async_trait]
impl Ticker for SystemTicker {
    async fn tick(&mut self) -> Tick {
        self.interval.tick().await;
        Tick::new()
    }
}

/// Test clock advanced explicitly, one tick at a time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    tickers: Arc<Mutex<Vec<mpsc::UnboundedSender<Tick>>>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `n` ticks to every live ticker.
    ///
    /// Each tick is awaited until its consumer has dropped it, so when this
    /// returns all `n` ticks have been processed (or discarded).
    pub async fn advance(&self, n: u32) {
        for _ in 0..n {
            let senders = self.live_senders();
            for tx in senders {
                let (tick, ack) = Tick::acknowledged();
                if tx.send(tick).is_ok() {
                    let _ = ack.await;
                }
            }
        }
    }

    /// Number of tickers whose consumer is still alive
    pub fn live_tickers(&self) -> usize {
        self.live_senders().len()
    }

    fn live_senders(&self) -> Vec<mpsc::UnboundedSender<Tick>> {
        let mut tickers = self.tickers.lock().unwrap_or_else(PoisonError::into_inner);
        tickers.retain(|tx| !tx.is_closed());
        tickers.clone()
    }
}

impl Clock for ManualClock {
    fn ticker(&self) -> Box<dyn Ticker> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.tickers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        Box::new(ManualTicker { rx })
    }
}

struct ManualTicker {
    rx: mpsc::UnboundedReceiver<Tick>,
}

#[async_trait]
impl Ticker for ManualTicker {
    async fn tick(&mut self) -> Tick {
        match self.rx.recv().await {
            Some(tick) => tick,
            // Clock dropped: this ticker never fires again
            None => std::future::pending().await,
        }
    }
}
