//! Lexi Core Library
//!
//! This crate provides the core functionality for Lexi, an offline-tolerant
//! vocabulary notebook whose word list lives behind a remote HTTP endpoint.
//!
//! # Architecture
//!
//! - **Local store**: key-value persistence (SQLite) for the word cache and
//!   the pending-operation queue
//! - **Remote repository**: stateless read/write calls against the endpoint
//! - **Engine**: merges both lists into one view, applies mutations
//!   optimistically and replays queued operations
//!
//! # Quick Start
//!
//! ```text
//! let config = Config::load()?;
//! let store = SqliteStore::open(&config)?;
//! let repo = HttpRepository::from_config(&config)?;
//!
//! let mut engine = Engine::open(store, repo)?;
//! engine.initialize().await;
//!
//! engine.create(WordEntry::new("Lucid").with_meaning("clear")).await?;
//! println!("{}", engine.sync_status("Lucid"));
//! ```
//!
//! # Modules
//!
//! - `engine`: Reconciliation engine and queue flushing (main entry point)
//! - `models`: Word entries, pending operations and edit sessions
//! - `cache`: Local word cache
//! - `queue`: Pending-operation queue
//! - `remote`: Remote word repository client
//! - `storage`: Key-value persistence
//! - `search`: Word filtering
//! - `format`: Display helpers
//! - `config`: Application configuration

pub mod cache;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod models;
pub mod queue;
pub mod remote;
pub mod search;
pub mod storage;

pub use cache::WordCache;
pub use config::Config;
pub use engine::{
    Delivery, Engine, EngineEvent, FlushSummary, InitOutcome, MutationOutcome,
};
pub use error::{Error, Result, ValidationError};
pub use models::{Action, EditSession, PendingOperation, SyncStatus, WordEntry};
pub use queue::PendingQueue;
pub use remote::{HttpRepository, RemoteError, WordRepository};
pub use storage::{LocalStore, MemoryStore, SqliteStore, StorageError};
