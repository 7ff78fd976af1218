//! Keep-alive handling off the engine actor
//!
//! Acquiring or releasing a keep-alive can wait on the host for a while, so
//! those calls run on a dedicated task. Requests carry the state the engine
//! wants and are handled strictly in the order they were queued. Each one
//! also carries a [`Completion`] that fires once the state has been reached,
//! which is how a command reply or a manual tick waits for it without the
//! actor waiting too.

use focus_host_api::KeepAlive;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{CommandOutcome, EngineWarning, Tick};

/// What to do once a keep-alive request has been handled
pub(crate) enum Completion {
    /// Answer a command, with any keep-alive warning filled in
    Reply {
        outcome: CommandOutcome,
        reply: oneshot::Sender<CommandOutcome>,
    },
    /// Acknowledge a tick
    Tick(Tick),
    None,
}

impl Completion {
    pub(crate) fn finish(self, warning: Option<EngineWarning>) {
        match self {
            Completion::Reply { mut outcome, reply } => {
                outcome.warning = warning;
                let _ = reply.send(outcome);
            }
            Completion::Tick(tick) => drop(tick),
            Completion::None => {}
        }
    }
}

struct Request {
    held: bool,
    completion: Completion,
}

pub(crate) struct KeepAliveWorker {
    keep_alive: Arc<dyn KeepAlive>,
    tx: Option<mpsc::UnboundedSender<Request>>,
    task: Option<JoinHandle<()>>,
}

impl KeepAliveWorker {
    pub(crate) fn spawn(keep_alive: Arc<dyn KeepAlive>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run(keep_alive.clone(), rx));
        Self {
            keep_alive,
            tx: Some(tx),
            task: Some(task),
        }
    }

    pub(crate) fn is_held(&self) -> bool {
        self.keep_alive.is_held()
    }

    /// Queue a move to `held`; `completion` fires once it is done
    pub(crate) fn request(&self, held: bool, completion: Completion) {
        let request = Request { held, completion };
        let Some(tx) = &self.tx else {
            request.completion.finish(None);
            return;
        };
        if let Err(mpsc::error::SendError(request)) = tx.send(request) {
            warn!(keep_alive = self.keep_alive.name(), "Keep-alive worker is gone");
            request.completion.finish(None);
        }
    }

    /// Release the keep-alive after everything already queued, then stop
    pub(crate) async fn stop(&mut self) {
        self.request(false, Completion::None);
        self.tx = None;
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Keep-alive worker ended abnormally");
        }
    }
}

async fn run(keep_alive: Arc<dyn KeepAlive>, mut requests: mpsc::UnboundedReceiver<Request>) {
    while let Some(Request { held, completion }) = requests.recv().await {
        let warning = reconcile(keep_alive.as_ref(), held).await;
        completion.finish(warning);
    }
    debug!(keep_alive = keep_alive.name(), "Keep-alive worker stopped");
}

async fn reconcile(keep_alive: &dyn KeepAlive, held: bool) -> Option<EngineWarning> {
    if held == keep_alive.is_held() {
        return None;
    }

    if held {
        match keep_alive.acquire().await {
            Ok(()) => {
                debug!(keep_alive = keep_alive.name(), "Keep-alive acquired");
                None
            }
            Err(e) => {
                warn!(
                    keep_alive = keep_alive.name(),
                    error = %e,
                    "Keep-alive unavailable, countdown continues"
                );
                Some(EngineWarning::KeepAliveUnavailable(e.to_string()))
            }
        }
    } else {
        match keep_alive.release().await {
            Ok(()) => debug!(keep_alive = keep_alive.name(), "Keep-alive released"),
            Err(e) => warn!(keep_alive = keep_alive.name(), error = %e, "Failed to release keep-alive"),
        }
        None
    }
}
