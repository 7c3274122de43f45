//! Scripted in-memory repository for engine tests

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{RemoteError, WordRepository};
use crate::models::{PendingOperation, WordEntry};

#[derive(Debug)]
struct FakeState {
    words: Result<Vec<WordEntry>, RemoteError>,
    script: VecDeque<Result<(), RemoteError>>,
    fallback: Result<(), RemoteError>,
    attempts: Vec<PendingOperation>,
    delivered: Vec<PendingOperation>,
}

/// Clones share state, so a test can keep a handle after moving one into
/// an engine
#[derive(Debug, Clone)]
pub(crate) struct FakeRepository {
    state: Arc<Mutex<FakeState>>,
}

impl FakeRepository {
    /// Reachable remote serving `words` and accepting every write
    pub fn online(words: Vec<WordEntry>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                words: Ok(words),
                script: VecDeque::new(),
                fallback: Ok(()),
                attempts: Vec::new(),
                delivered: Vec::new(),
            })),
        }
    }

    /// Unreachable remote
    pub fn offline() -> Self {
        let repo = Self::online(Vec::new());
        repo.go_offline();
        repo
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn go_offline(&self) {
        let mut state = self.state();
        state.words = Err(RemoteError::Network("connection refused".to_string()));
        state.fallback = Err(RemoteError::Network("connection refused".to_string()));
    }

    pub fn go_online(&self, words: Vec<WordEntry>) {
        let mut state = self.state();
        state.words = Ok(words);
        state.fallback = Ok(());
    }

    /// Results for the next sends, in order, before the fallback applies
    pub fn script_sends(&self, results: Vec<Result<(), RemoteError>>) {
        self.state().script.extend(results);
    }

    /// Every operation the engine tried to send
    pub fn attempts(&self) -> Vec<PendingOperation> {
        self.state().attempts.clone()
    }

    /// Operations that were accepted
    pub fn delivered(&self) -> Vec<PendingOperation> {
        self.state().delivered.clone()
    }
}

impl WordRepository for FakeRepository {
    async fn fetch_words(&self) -> Result<Vec<WordEntry>, RemoteError> {
        self.state().words.clone()
    }

    async fn send(&self, op: PendingOperation) -> Result<(), RemoteError> {
        let mut state = self.state();
        state.attempts.push(op.clone());
        let result = match state.script.pop_front() {
            Some(result) => result,
            None => state.fallback.clone(),
        };
        if result.is_ok() {
            state.delivered.push(op);
        }
        result
    }
}
