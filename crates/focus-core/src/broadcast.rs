//! Fan-out of state snapshots and notification signals
//!
//! Two independent channels:
//! - snapshots replay on subscribe: a new subscriber first receives the
//!   current snapshot, then every later one in revision order. Each
//!   subscriber has its own unbounded queue, so a slow reader falls behind
//!   but never loses a revision.
//! - signals are delivered only to subscribers attached when they are
//!   emitted, exactly once each; with nobody listening they are discarded

use focus_api::{EngineState, NotificationSignal, Snapshot};
use focus_util::SubscriberId;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Per-subscriber signal buffer before a slow subscriber starts lagging
const SIGNAL_CAPACITY: usize = 256;

pub struct Broadcaster {
    inner: Mutex<Inner>,
}

struct Inner {
    current: Snapshot,
    snapshot_txs: Vec<mpsc::UnboundedSender<Snapshot>>,
    signal_tx: Option<broadcast::Sender<NotificationSignal>>,
    closed: bool,
}

impl Inner {
    fn prune(&mut self) {
        self.snapshot_txs.retain(|tx| !tx.is_closed());
    }
}

impl Broadcaster {
    /// Create a broadcaster whose current snapshot is `initial` at revision 0
    pub fn new(initial: EngineState) -> Self {
        let (signal_tx, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            inner: Mutex::new(Inner {
                current: Snapshot {
                    revision: 0,
                    state: initial,
                },
                snapshot_txs: Vec::new(),
                signal_tx: Some(signal_tx),
                closed: false,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `state` as the next revision and push it to all subscribers
    pub fn publish(&self, state: &EngineState) -> Snapshot {
        let mut inner = self.lock();
        let snapshot = Snapshot {
            revision: inner.current.revision + 1,
            state: state.clone(),
        };
        inner.current = snapshot.clone();

        // Late subscribers replay `current`, so nobody listening is fine
        inner.prune();
        for tx in &inner.snapshot_txs {
            let _ = tx.send(snapshot.clone());
        }
        snapshot
    }

    /// Deliver a signal to the subscribers attached right now.
    ///
    /// Returns how many received it.
    pub fn emit(&self, signal: NotificationSignal) -> usize {
        let inner = self.lock();
        let Some(tx) = &inner.signal_tx else {
            return 0;
        };
        match tx.send(signal) {
            Ok(receivers) => receivers,
            Err(_) => {
                debug!(signal = %signal, "No subscribers, signal discarded");
                0
            }
        }
    }

    pub fn current(&self) -> Snapshot {
        self.lock().current.clone()
    }

    pub fn subscribe(&self) -> Subscription {
        let mut inner = self.lock();
        // The queue is registered and the replayed snapshot taken under one
        // lock, so nothing published in between can be missed
        let (tx, rx) = mpsc::unbounded_channel();
        if !inner.closed {
            inner.snapshot_txs.push(tx);
        }
        let subscription = Subscription {
            id: SubscriberId::new(),
            initial: Some(inner.current.clone()),
            last_revision: 0,
            snapshots: Some(rx),
            signals: inner.signal_tx.as_ref().map(broadcast::Sender::subscribe),
        };
        debug!(subscriber_id = %subscription.id, "Subscriber attached");
        subscription
    }

    /// Subscribers whose snapshot queue is still open
    pub fn subscriber_count(&self) -> usize {
        let mut inner = self.lock();
        inner.prune();
        inner.snapshot_txs.len()
    }

    /// Close both channels. Subscribers drain what they have, then end.
    pub fn close(&self) {
        let mut inner = self.lock();
        inner.closed = true;
        inner.snapshot_txs.clear();
        inner.signal_tx = None;
    }
}

/// One item from a subscription
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Snapshot(Snapshot),
    Signal(NotificationSignal),
}

/// A subscriber's view of both channels
pub struct Subscription {
    id: SubscriberId,
    initial: Option<Snapshot>,
    last_revision: u64,
    snapshots: Option<mpsc::UnboundedReceiver<Snapshot>>,
    signals: Option<broadcast::Receiver<NotificationSignal>>,
}

enum Received {
    Snapshot(Option<Snapshot>),
    Signal(Result<NotificationSignal, RecvError>),
}

impl Subscription {
    pub fn id(&self) -> &SubscriberId {
        &self.id
    }

    /// Next snapshot, starting with the one current at subscribe time.
    ///
    /// Revisions are strictly increasing. `None` once the engine has stopped.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        if let Some(snapshot) = self.take_initial() {
            return Some(snapshot);
        }
        loop {
            let result = self.snapshots.as_mut()?.recv().await;
            if let Some(snapshot) = self.accept_snapshot(result) {
                return Some(snapshot);
            }
            self.snapshots.as_ref()?;
        }
    }

    /// Next signal emitted since subscribing. `None` once the engine has stopped.
    pub async fn next_signal(&mut self) -> Option<NotificationSignal> {
        loop {
            let result = self.signals.as_mut()?.recv().await;
            if let Some(signal) = self.accept_signal(result) {
                return Some(signal);
            }
            self.signals.as_ref()?;
        }
    }

    /// Snapshot already waiting, if any
    pub fn try_next_snapshot(&mut self) -> Option<Snapshot> {
        if let Some(snapshot) = self.take_initial() {
            return Some(snapshot);
        }
        loop {
            match self.snapshots.as_mut()?.try_recv() {
                Ok(snapshot) => {
                    if let Some(snapshot) = self.accept_snapshot(Some(snapshot)) {
                        return Some(snapshot);
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    self.snapshots = None;
                    return None;
                }
            }
        }
    }

    /// Signal already waiting, if any
    pub fn try_next_signal(&mut self) -> Option<NotificationSignal> {
        use tokio::sync::broadcast::error::TryRecvError;

        loop {
            match self.signals.as_mut()?.try_recv() {
                Ok(signal) => return Some(signal),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(subscriber_id = %self.id, skipped, "Subscriber lagged, signals lost");
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.signals = None;
                    return None;
                }
            }
        }
    }

    /// Next item from either channel.
    ///
    /// Order is preserved within each channel; when both have something
    /// waiting the snapshot comes first. `None` once both are closed.
    pub async fn recv(&mut self) -> Option<Update> {
        if let Some(snapshot) = self.take_initial() {
            return Some(Update::Snapshot(snapshot));
        }
        loop {
            if self.snapshots.is_none() && self.signals.is_none() {
                return None;
            }

            let received = tokio::select! {
                biased;
                result = next_queued(&mut self.snapshots) => Received::Snapshot(result),
                result = next_broadcast(&mut self.signals) => Received::Signal(result),
            };

            match received {
                Received::Snapshot(result) => {
                    if let Some(snapshot) = self.accept_snapshot(result) {
                        return Some(Update::Snapshot(snapshot));
                    }
                }
                Received::Signal(result) => {
                    if let Some(signal) = self.accept_signal(result) {
                        return Some(Update::Signal(signal));
                    }
                }
            }
        }
    }

    fn take_initial(&mut self) -> Option<Snapshot> {
        let snapshot = self.initial.take()?;
        self.last_revision = snapshot.revision;
        Some(snapshot)
    }

    fn accept_snapshot(&mut self, result: Option<Snapshot>) -> Option<Snapshot> {
        match result {
            Some(snapshot) if snapshot.revision <= self.last_revision => None,
            Some(snapshot) => {
                self.last_revision = snapshot.revision;
                Some(snapshot)
            }
            None => {
                self.snapshots = None;
                None
            }
        }
    }

    fn accept_signal(
        &mut self,
        result: Result<NotificationSignal, RecvError>,
    ) -> Option<NotificationSignal> {
        match result {
            Ok(signal) => Some(signal),
            Err(RecvError::Lagged(skipped)) => {
                warn!(subscriber_id = %self.id, skipped, "Subscriber lagged, signals lost");
                None
            }
            Err(RecvError::Closed) => {
                self.signals = None;
                None
            }
        }
    }
}

async fn next_queued<T>(rx: &mut Option<mpsc::UnboundedReceiver<T>>) -> Option<T> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_broadcast<T: Clone>(
    rx: &mut Option<broadcast::Receiver<T>>,
) -> Result<T, RecvError> {
    match rx {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus_api::SessionMode;

    fn state(remaining: u32) -> EngineState {
        let mut state = EngineState::idle(1500, 0, 0.5);
        state.mode = SessionMode::FocusRunning;
        state.remaining_seconds = remaining;
        state
    }

    #[tokio::test]
    async fn subscriber_replays_current_snapshot() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        broadcaster.publish(&state(1499));
        broadcaster.publish(&state(1498));

        let mut sub = broadcaster.subscribe();
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot.revision, 2);
        assert_eq!(snapshot.state.remaining_seconds, 1498);
        assert!(sub.try_next_snapshot().is_none());
    }

    #[tokio::test]
    async fn snapshots_arrive_in_revision_order() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let mut sub = broadcaster.subscribe();

        for remaining in (1490..1500).rev() {
            broadcaster.publish(&state(remaining));
        }

        let mut revisions = Vec::new();
        while let Some(snapshot) = sub.try_next_snapshot() {
            revisions.push(snapshot.revision);
        }
        assert_eq!(revisions, (0..=10).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn signal_without_subscribers_is_discarded() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        assert_eq!(broadcaster.emit(NotificationSignal::FocusEnded), 0);

        let mut sub = broadcaster.subscribe();
        assert!(sub.try_next_signal().is_none());
    }

    #[tokio::test]
    async fn each_attached_subscriber_gets_signal_once() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let mut first = broadcaster.subscribe();
        let mut second = broadcaster.subscribe();

        assert_eq!(broadcaster.emit(NotificationSignal::BreakStarted), 2);

        assert_eq!(first.next_signal().await, Some(NotificationSignal::BreakStarted));
        assert_eq!(second.next_signal().await, Some(NotificationSignal::BreakStarted));
        assert!(first.try_next_signal().is_none());
        assert!(second.try_next_signal().is_none());

        // A subscriber joining afterwards never sees it
        let mut late = broadcaster.subscribe();
        assert!(late.try_next_signal().is_none());
    }

    #[tokio::test]
    async fn recv_merges_both_channels() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let mut sub = broadcaster.subscribe();

        broadcaster.publish(&state(1500));
        broadcaster.emit(NotificationSignal::FocusStarted);

        assert!(matches!(sub.recv().await, Some(Update::Snapshot(s)) if s.revision == 0));
        assert!(matches!(sub.recv().await, Some(Update::Snapshot(s)) if s.revision == 1));
        assert_eq!(
            sub.recv().await,
            Some(Update::Signal(NotificationSignal::FocusStarted))
        );
    }

    #[tokio::test]
    async fn close_ends_subscriptions() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let mut sub = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.publish(&state(1400));
        broadcaster.close();

        assert!(matches!(sub.recv().await, Some(Update::Snapshot(s)) if s.revision == 0));
        assert!(matches!(sub.recv().await, Some(Update::Snapshot(s)) if s.revision == 1));
        assert_eq!(sub.recv().await, None);
        assert_eq!(broadcaster.subscriber_count(), 0);
        assert_eq!(broadcaster.emit(NotificationSignal::BreakEnded), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_receives_every_revision() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let mut sub = broadcaster.subscribe();

        // Far more than any fixed buffer, with nobody reading meanwhile
        for remaining in 0..1000 {
            broadcaster.publish(&state(remaining));
        }

        let mut revisions = Vec::new();
        while let Some(snapshot) = sub.try_next_snapshot() {
            revisions.push(snapshot.revision);
        }
        assert_eq!(revisions, (0..=1000).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn dropped_subscription_is_pruned_on_publish() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        let kept = broadcaster.subscribe();
        let dropped = broadcaster.subscribe();
        assert_eq!(broadcaster.subscriber_count(), 2);

        drop(dropped);
        broadcaster.publish(&state(1499));
        assert_eq!(broadcaster.subscriber_count(), 1);
        drop(kept);
    }

    #[tokio::test]
    async fn subscribe_after_close_replays_then_ends() {
        let broadcaster = Broadcaster::new(EngineState::idle(1500, 0, 0.5));
        broadcaster.publish(&state(1499));
        broadcaster.close();

        let mut sub = broadcaster.subscribe();
        assert!(matches!(sub.recv().await, Some(Update::Snapshot(s)) if s.revision == 1));
        assert_eq!(sub.recv().await, None);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }
}
