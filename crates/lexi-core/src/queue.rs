//! Pending-operation queue
//!
//! Mutations the remote has not confirmed yet, oldest first, persisted
//! under `pendingOps`. Every change is written to the store before the
//! method returns.
//!
//! Delivery is at-least-once: the same logical operation may be queued
//! twice, and the remote is expected to tolerate replays.

use std::fmt::Display;
use std::future::Future;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{PendingOperation, QueuedOperation};
use crate::storage::{read_json_or_default, write_json, LocalStore, StorageResult, PENDING_OPS_KEY};

/// Result of one drain pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainReport<E> {
    /// Operations the sender accepted (now removed)
    pub succeeded: usize,
    /// Operations still queued, in their original order
    pub remaining: Vec<PendingOperation>,
    /// Why the last operation of the pass failed, if it did
    pub last_error: Option<E>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingQueue {
    ops: Vec<QueuedOperation>,
}

impl PendingQueue {
    /// Load the queue, treating a missing or corrupt value as empty
    pub fn load<S: LocalStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let ops = read_json_or_default(store, PENDING_OPS_KEY)?;
        Ok(Self { ops })
    }

    fn save<S: LocalStore + ?Sized>(&self, store: &S) -> StorageResult<()> {
        write_json(store, PENDING_OPS_KEY, &self.ops)
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QueuedOperation> {
        self.ops.iter()
    }

    /// Append an operation at the tail and persist
    pub fn enqueue<S: LocalStore + ?Sized>(
        &mut self,
        store: &S,
        op: PendingOperation,
    ) -> StorageResult<()> {
        debug!("Queueing {} for '{}'", op.action(), op.word());
        self.ops.push(QueuedOperation::now(op));
        self.save(store)
    }

    /// Whether any queued operation targets `word` (case-insensitive)
    pub fn references(&self, word: &str) -> bool {
        self.ops.iter().any(|queued| queued.op.references(word))
    }

    /// When the oldest stamped operation was queued
    pub fn oldest_queued_at(&self) -> Option<DateTime<Utc>> {
        self.ops.iter().filter_map(|queued| queued.queued_at).min()
    }

    /// Attempt every queued operation once, front to back
    ///
    /// A failure does not stop the pass. Operations the sender accepts are
    /// dropped; the rest stay in their original relative order. The queue
    /// is only modified, and persisted, after the whole pass has run, so
    /// a pass abandoned halfway leaves it untouched.
    pub async fn drain<S, F, Fut, E>(
        &mut self,
        store: &S,
        mut send: F,
    ) -> StorageResult<DrainReport<E>>
    where
        S: LocalStore + ?Sized,
        F: FnMut(PendingOperation) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let mut delivered = Vec::with_capacity(self.ops.len());
        let mut last_error = None;
        for queued in &self.ops {
            let op = queued.op.clone();
            match send(op).await {
                Ok(()) => {
                    debug!("Delivered {} for '{}'", queued.op.action(), queued.op.word());
                    delivered.push(true);
                    last_error = None;
                }
                Err(e) => {
                    warn!(
                        "Failed to deliver {} for '{}': {}",
                        queued.op.action(),
                        queued.op.word(),
                        e
                    );
                    delivered.push(false);
                    last_error = Some(e);
                }
            }
        }

        let succeeded = delivered.iter().filter(|ok| **ok).count();
        let mut outcome = delivered.into_iter();
        self.ops.retain(|_| !outcome.next().unwrap_or(false));
        self.save(store)?;

        Ok(DrainReport {
            succeeded,
            remaining: self.ops.iter().map(|queued| queued.op.clone()).collect(),
            last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordEntry;
    use crate::storage::MemoryStore;

    fn delete(word: &str) -> PendingOperation {
        PendingOperation::Delete {
            word: word.to_string(),
        }
    }

    #[test]
    fn test_enqueue_persists() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();

        queue.enqueue(&store, delete("run")).unwrap();
        queue
            .enqueue(&store, PendingOperation::Create(WordEntry::new("lucid")))
            .unwrap();

        let reloaded = PendingQueue::load(&store).unwrap();
        assert_eq!(reloaded.len(), 2);
        let words: Vec<_> = reloaded.iter().map(|q| q.op.word().to_string()).collect();
        assert_eq!(words, vec!["run", "lucid"]);
        assert!(reloaded.oldest_queued_at().is_some());
    }

    #[test]
    fn test_duplicate_enqueue_is_kept() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();

        queue.enqueue(&store, delete("run")).unwrap();
        queue.enqueue(&store, delete("run")).unwrap();

        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_references() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();
        queue.enqueue(&store, delete("Run")).unwrap();

        assert!(queue.references("run"));
        assert!(!queue.references("lucid"));
    }

    #[test]
    fn test_load_corrupt_queue() {
        let store = MemoryStore::new();
        store.set(PENDING_OPS_KEY, "not json").unwrap();

        let queue = PendingQueue::load(&store).unwrap();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_load_queue_without_timestamps() {
        let store = MemoryStore::new();
        store
            .set(
                PENDING_OPS_KEY,
                r#"[{"action":"create","word":"lucid","meaning":"clear"}]"#,
            )
            .unwrap();

        let queue = PendingQueue::load(&store).unwrap();
        assert_eq!(queue.len(), 1);
        assert!(queue.oldest_queued_at().is_none());
    }

    #[tokio::test]
    async fn test_drain_keeps_failures_in_order() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();
        for word in ["one", "two", "three"] {
            queue.enqueue(&store, delete(word)).unwrap();
        }

        let mut attempts = Vec::new();
        let report = queue
            .drain(&store, |op| {
                attempts.push(op.word().to_string());
                let ok = op.word() != "two";
                async move {
                    if ok {
                        Ok(())
                    } else {
                        Err("offline")
                    }
                }
            })
            .await
            .unwrap();

        assert_eq!(attempts, vec!["one", "two", "three"]);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.remaining, vec![delete("two")]);
        assert!(report.last_error.is_none());

        // A later enqueue lands behind the retained failure
        queue.enqueue(&store, delete("four")).unwrap();
        let reloaded = PendingQueue::load(&store).unwrap();
        let words: Vec<_> = reloaded.iter().map(|q| q.op.word().to_string()).collect();
        assert_eq!(words, vec!["two", "four"]);
    }

    #[tokio::test]
    async fn test_drain_all_succeed() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();
        queue.enqueue(&store, delete("run")).unwrap();

        let report = queue
            .drain(&store, |_| async { Ok::<(), String>(()) })
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert!(report.remaining.is_empty());
        assert!(PendingQueue::load(&store).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_drain_empty_queue() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();

        let report = queue
            .drain(&store, |_| async { Err::<(), _>("unreachable") })
            .await
            .unwrap();

        assert_eq!(report.succeeded, 0);
        assert!(report.remaining.is_empty());
        assert!(report.last_error.is_none());
    }

    #[tokio::test]
    async fn test_drain_reports_failure_of_last_op() {
        let store = MemoryStore::new();
        let mut queue = PendingQueue::default();
        queue.enqueue(&store, delete("run")).unwrap();
        queue
            .enqueue(&store, PendingOperation::Create(WordEntry::new("run")))
            .unwrap();

        let report = queue
            .drain(&store, |op| {
                let result = match op {
                    PendingOperation::Delete { .. } => Ok(()),
                    _ => Err("timed out"),
                };
                async move { result }
            })
            .await
            .unwrap();

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.last_error, Some("timed out"));
        assert_eq!(
            report.remaining,
            vec![PendingOperation::Create(WordEntry::new("run"))]
        );
    }
}
