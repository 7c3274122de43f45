//! Queue flushing

use tracing::info;

use super::{Engine, EngineEvent};
use crate::error::Result;
use crate::models::PendingOperation;
use crate::remote::{RemoteError, WordRepository};
use crate::storage::LocalStore;

/// Outcome of one flush pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushSummary {
    pub succeeded: usize,
    /// Operations still queued, oldest first
    pub remaining: Vec<PendingOperation>,
}

impl FlushSummary {
    /// Whether the queue is empty after the pass
    pub fn is_complete(&self) -> bool {
        self.remaining.is_empty()
    }

    pub fn message(&self) -> String {
        match self.remaining.len() {
            0 => "All pending changes synced".to_string(),
            1 => "1 change still pending sync".to_string(),
            n => format!("{} changes still pending sync", n),
        }
    }
}

impl<S: LocalStore, R: WordRepository> Engine<S, R> {
    /// Retry every queued operation once, oldest first
    ///
    /// Returns `None` when there was nothing to send. Failed operations
    /// stay queued in order; later ones are still attempted.
    pub async fn flush(&mut self) -> Result<Option<FlushSummary>> {
        if self.queue.is_empty() {
            return Ok(None);
        }
        let (summary, _) = self.flush_pass().await?;
        Ok(Some(summary))
    }

    /// One drain pass over a non-empty queue
    ///
    /// Also returns the error of the tail operation if it was not delivered.
    pub(super) async fn flush_pass(&mut self) -> Result<(FlushSummary, Option<RemoteError>)> {
        info!("Flushing {} pending operations", self.queue.len());
        let repo = &self.repo;
        let report = self.queue.drain(&self.store, |op| repo.send(op)).await?;

        let summary = FlushSummary {
            succeeded: report.succeeded,
            remaining: report.remaining,
        };
        info!(
            "Flush finished: {} delivered, {} remaining",
            summary.succeeded,
            summary.remaining.len()
        );

        self.emit(EngineEvent::Flushed(summary.clone()));
        // Sync badges may have changed
        self.publish_view();

        Ok((summary, report.last_error))
    }

    /// Flush in response to the remote becoming reachable again
    pub async fn on_connectivity_restored(&mut self) -> Result<Option<FlushSummary>> {
        info!("Connectivity restored");
        self.flush().await
    }
}
