//! Reconciliation engine
//!
//! Owns the merged view: the local cache and the remote list combined by
//! [`merge`], with local entries first. Mutations are optimistic. The
//! cache is updated and persisted and the new view is published before
//! the remote call is issued. A failed call leaves the local change in
//! place and queues the operation for the next flush.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = Engine::open(SqliteStore::open(&config)?, HttpRepository::from_config(&config)?)?;
//! let events = engine.take_events();
//!
//! if engine.initialize().await.is_online() {
//!     engine.on_connectivity_restored().await?;
//! }
//! engine.create(WordEntry::new("Lucid").with_meaning("clear")).await?;
//! ```
//!
//! Every mutating method takes `&mut self`, so at most one flush or
//! mutation is in flight per engine.

mod flush;
pub mod merge;

use std::slice;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::cache::WordCache;
use crate::error::{Result, ValidationError};
use crate::models::{Action, EditSession, PendingOperation, SyncStatus, WordEntry};
use crate::queue::PendingQueue;
use crate::remote::{RemoteError, WordRepository};
use crate::storage::LocalStore;

pub use flush::FlushSummary;
pub use merge::merge;

/// Result of fetching the remote list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// The remote list was merged into the view
    Online { remote_words: usize },
    /// The remote could not be read; the view is local-only
    Offline(RemoteError),
}

impl InitOutcome {
    pub fn is_online(&self) -> bool {
        matches!(self, InitOutcome::Online { .. })
    }
}

/// What happened to a mutation's remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Confirmed,
    /// The call failed and the operation was queued
    Queued(RemoteError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub op: PendingOperation,
    pub delivery: Delivery,
    /// The flush that followed the attempt, if anything was queued
    pub flush: Option<FlushSummary>,
}

/// Notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// The merged view changed (or its sync badges may have)
    ViewUpdated { words: usize },
    /// The remote list was fetched and merged
    Loaded { remote_words: usize },
    /// The remote list could not be fetched
    Offline { reason: String },
    Confirmed { action: Action, word: String },
    Queued {
        action: Action,
        word: String,
        reason: String,
        /// The remote could not be reached, as opposed to refusing
        unreachable: bool,
    },
    Flushed(FlushSummary),
}

impl EngineEvent {
    /// Short user-facing message, if the event deserves one
    pub fn message(&self) -> Option<String> {
        let text = match self {
            EngineEvent::ViewUpdated { .. } => return None,
            EngineEvent::Loaded { remote_words } => {
                format!("Loaded {} words from the remote list", remote_words)
            }
            EngineEvent::Offline { .. } => "Offline mode: showing saved words".to_string(),
            EngineEvent::Confirmed { action, word } => match action {
                Action::Create => format!("Saved \"{}\" to the remote list", word),
                Action::Update => format!("Updated \"{}\" in the remote list", word),
                Action::Delete => format!("Deleted \"{}\" from the remote list", word),
            },
            EngineEvent::Queued {
                action,
                word,
                reason,
                unreachable: false,
            } => format!(
                "Remote refused {} of \"{}\" ({}); kept locally (pending sync)",
                action, word, reason
            ),
            EngineEvent::Queued { action, word, .. } => match action {
                Action::Create => format!("Saved \"{}\" locally (pending sync)", word),
                Action::Update => format!("Updated \"{}\" locally (pending sync)", word),
                Action::Delete => format!("Deleted \"{}\" locally (pending sync)", word),
            },
            EngineEvent::Flushed(summary) => summary.message(),
        };
        Some(text)
    }

    /// Whether the message reports something the user should worry about
    pub fn is_warning(&self) -> bool {
        match self {
            EngineEvent::Offline { .. } | EngineEvent::Queued { .. } => true,
            EngineEvent::Flushed(summary) => !summary.is_complete(),
            _ => false,
        }
    }
}

/// The reconciliation engine over a local store `S` and a remote `R`
pub struct Engine<S, R> {
    store: S,
    repo: R,
    cache: WordCache,
    queue: PendingQueue,
    view: Vec<WordEntry>,
    view_tx: watch::Sender<Vec<WordEntry>>,
    event_tx: mpsc::UnboundedSender<EngineEvent>,
    event_rx: Option<mpsc::UnboundedReceiver<EngineEvent>>,
}

impl<S: LocalStore, R: WordRepository> Engine<S, R> {
    /// Load the local cache and queue
    ///
    /// The view starts as the local cache, so it can be shown before any
    /// network call.
    pub fn open(store: S, repo: R) -> Result<Self> {
        let cache = WordCache::load(&store)?;
        let queue = PendingQueue::load(&store)?;
        debug!(
            "Opened engine: {} cached words, {} pending operations",
            cache.len(),
            queue.len()
        );

        let view = cache.words().to_vec();
        let (view_tx, _) = watch::channel(view.clone());
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        Ok(Self {
            store,
            repo,
            cache,
            queue,
            view,
            view_tx,
            event_tx,
            event_rx: Some(event_rx),
        })
    }

    /// Publish the local view, then fetch and merge the remote list
    ///
    /// A failed fetch leaves the local-only view in place.
    pub async fn initialize(&mut self) -> InitOutcome {
        self.view = self.cache.words().to_vec();
        self.publish_view();
        self.refresh().await
    }

    /// Fetch the remote list and rebuild the view as `merge(cache, remote)`
    ///
    /// Remote entries removed by queued operations stay hidden until the
    /// queue is flushed.
    pub async fn refresh(&mut self) -> InitOutcome {
        match self.repo.fetch_words().await {
            Ok(remote) => {
                let remote_words = remote.len();
                let visible = merge::without_pending_removals(
                    remote,
                    self.queue.iter().map(|queued| &queued.op),
                );
                self.view = merge(self.cache.words(), &visible);
                info!(
                    "Loaded {} remote words; view has {} words",
                    remote_words,
                    self.view.len()
                );
                self.emit(EngineEvent::Loaded { remote_words });
                self.publish_view();
                InitOutcome::Online { remote_words }
            }
            Err(e) => {
                warn!("Could not fetch remote words: {}", e);
                self.emit(EngineEvent::Offline {
                    reason: e.to_string(),
                });
                InitOutcome::Offline(e)
            }
        }
    }

    /// The current merged view
    pub fn view(&self) -> &[WordEntry] {
        &self.view
    }

    /// Subscribe to view changes
    pub fn subscribe(&self) -> watch::Receiver<Vec<WordEntry>> {
        self.view_tx.subscribe()
    }

    /// Take the event receiver (can only be called once)
    ///
    /// Nothing is buffered until this is called.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<EngineEvent>> {
        self.event_rx.take()
    }

    pub fn cache(&self) -> &WordCache {
        &self.cache
    }

    pub fn queue(&self) -> &PendingQueue {
        &self.queue
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Look up a word in the view (case-insensitive)
    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.view.iter().find(|entry| entry.is(word))
    }

    /// `Pending` iff a queued operation targets `word`
    pub fn sync_status(&self, word: &str) -> SyncStatus {
        if self.queue.references(word) {
            SyncStatus::Pending
        } else {
            SyncStatus::Synced
        }
    }

    /// Start editing a word from the view
    pub fn begin_edit(&self, word: &str) -> Option<EditSession> {
        self.get(word).cloned().map(EditSession::for_entry)
    }

    // ==================== Mutations ====================

    /// Create a word: apply locally, then deliver
    pub async fn create(&mut self, entry: WordEntry) -> Result<MutationOutcome> {
        let op = self.stage_create(entry)?;
        self.submit(op).await
    }

    /// Replace the word captured by `edit` with `entry` (may rename)
    pub async fn update(&mut self, edit: &EditSession, entry: WordEntry) -> Result<MutationOutcome> {
        let op = self.stage_update(edit, entry)?;
        self.submit(op).await
    }

    /// Delete a word: remove locally, then deliver
    ///
    /// The local removal stands even if the remote refuses; the delete is
    /// queued instead.
    pub async fn delete(&mut self, word: &str) -> Result<MutationOutcome> {
        let op = self.stage_delete(word)?;
        self.submit(op).await
    }

    /// Apply a create locally and return the operation to deliver
    pub fn stage_create(&mut self, entry: WordEntry) -> Result<PendingOperation> {
        let entry = normalize(entry)?;
        if self.get(&entry.word).is_some() {
            return Err(ValidationError::Duplicate(entry.word).into());
        }

        self.cache.upsert_front(entry.clone());
        self.cache.save(&self.store)?;
        self.view = merge(slice::from_ref(&entry), &self.view);
        self.publish_view();

        Ok(PendingOperation::Create(entry))
    }

    /// Apply an update locally and return the operation to deliver
    pub fn stage_update(&mut self, edit: &EditSession, entry: WordEntry) -> Result<PendingOperation> {
        let entry = normalize(entry)?;
        if edit.is_rename(&entry) && self.get(&entry.word).is_some() {
            return Err(ValidationError::Duplicate(entry.word).into());
        }

        let old_word = edit.original_word().to_string();
        self.cache.remove(&old_word);
        self.cache.upsert_front(entry.clone());
        self.cache.save(&self.store)?;

        self.view.retain(|w| !w.is(&old_word));
        self.view = merge(slice::from_ref(&entry), &self.view);
        self.publish_view();

        Ok(PendingOperation::Update { old_word, entry })
    }

    /// Apply a delete locally and return the operation to deliver
    pub fn stage_delete(&mut self, word: &str) -> Result<PendingOperation> {
        let word = word.trim();
        if word.is_empty() {
            return Err(ValidationError::EmptyWord.into());
        }
        let Some(existing) = self.get(word) else {
            return Err(ValidationError::UnknownWord(word.to_string()).into());
        };
        let canonical = existing.word.clone();

        self.cache.remove(&canonical);
        self.cache.save(&self.store)?;
        self.view.retain(|w| !w.is(&canonical));
        self.publish_view();

        Ok(PendingOperation::Delete { word: canonical })
    }

    /// Deliver a staged operation, queueing it on failure, then flush
    ///
    /// With operations already queued, `op` is queued behind them and the
    /// whole queue is sent in one pass, so the remote sees changes to a
    /// word in the order they were made.
    pub async fn submit(&mut self, op: PendingOperation) -> Result<MutationOutcome> {
        if !self.queue.is_empty() {
            self.queue.enqueue(&self.store, op.clone())?;
            let (summary, tail_error) = self.flush_pass().await?;
            let delivery = self.report_delivery(&op, tail_error);
            return Ok(MutationOutcome {
                op,
                delivery,
                flush: Some(summary),
            });
        }

        let result = self.repo.send(op.clone()).await;
        if result.is_err() {
            self.queue.enqueue(&self.store, op.clone())?;
        }
        let delivery = self.report_delivery(&op, result.err());

        // Give the failure another chance
        let flush = self.flush().await?;

        Ok(MutationOutcome {
            op,
            delivery,
            flush,
        })
    }

    fn report_delivery(&self, op: &PendingOperation, error: Option<RemoteError>) -> Delivery {
        let action = op.action();
        let word = op.word().to_string();
        match error {
            None => {
                info!("Remote confirmed {} for '{}'", action, word);
                self.emit(EngineEvent::Confirmed { action, word });
                Delivery::Confirmed
            }
            Some(e) => {
                warn!("Remote {} for '{}' failed, queued: {}", action, word, e);
                self.emit(EngineEvent::Queued {
                    action,
                    word,
                    reason: e.to_string(),
                    unreachable: e.is_unreachable(),
                });
                Delivery::Queued(e)
            }
        }
    }

    fn publish_view(&self) {
        self.view_tx.send_replace(self.view.clone());
        self.emit(EngineEvent::ViewUpdated {
            words: self.view.len(),
        });
    }

    /// Events raised before `take_events` are dropped
    fn emit(&self, event: EngineEvent) {
        if self.event_rx.is_none() {
            let _ = self.event_tx.send(event);
        }
    }
}

/// Trim the word and reject it if nothing is left
fn normalize(mut entry: WordEntry) -> std::result::Result<WordEntry, ValidationError> {
    entry.word = entry.word.trim().to_string();
    if entry.word.is_empty() {
        return Err(ValidationError::EmptyWord);
    }
    Ok(entry)
}
