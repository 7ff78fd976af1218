//! JSON-lines writer for stdout
//!
//! Responses and events come from several tasks; a single writer task
//! keeps every line intact.

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

#[derive(Clone)]
pub struct Output {
    tx: mpsc::UnboundedSender<String>,
}

impl Output {
    /// Start the writer. It exits once every `Output` clone is dropped.
    pub fn spawn() -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<String>();

        let writer = tokio::spawn(async move {
            let mut stdout = tokio::io::stdout();
            while let Some(mut line) = rx.recv().await {
                line.push('\n');
                if let Err(e) = stdout.write_all(line.as_bytes()).await {
                    warn!(error = %e, "Failed to write to stdout");
                    break;
                }
                if let Err(e) = stdout.flush().await {
                    warn!(error = %e, "Failed to flush stdout");
                    break;
                }
            }
        });

        (Self { tx }, writer)
    }

    pub fn send<T: Serialize>(&self, value: &T) {
        match serde_json::to_string(value) {
            Ok(line) => {
                let _ = self.tx.send(line);
            }
            Err(e) => warn!(error = %e, "Failed to serialize output line"),
        }
    }
}
