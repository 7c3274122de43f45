//! Local word cache
//!
//! The words the user created or edited on this device, newest first,
//! persisted under `userWords`.

use crate::engine::merge::dedupe;
use crate::models::WordEntry;
use crate::storage::{read_json_or_default, write_json, LocalStore, StorageResult, USER_WORDS_KEY};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCache {
    words: Vec<WordEntry>,
}

impl WordCache {
    /// Load the cache, treating a missing or corrupt value as empty
    ///
    /// Duplicate keys left by older writers are collapsed (first wins).
    pub fn load<S: LocalStore + ?Sized>(store: &S) -> StorageResult<Self> {
        let words: Vec<WordEntry> = read_json_or_default(store, USER_WORDS_KEY)?;
        Ok(Self {
            words: dedupe(words),
        })
    }

    pub fn save<S: LocalStore + ?Sized>(&self, store: &S) -> StorageResult<()> {
        write_json(store, USER_WORDS_KEY, &self.words)
    }

    pub fn words(&self) -> &[WordEntry] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Put `entry` at the front, replacing any entry with the same key
    pub fn upsert_front(&mut self, entry: WordEntry) {
        self.words.retain(|w| !w.is(&entry.word));
        self.words.insert(0, entry);
    }

    /// Remove the entry for `word`; returns whether one was cached
    pub fn remove(&mut self, word: &str) -> bool {
        let before = self.words.len();
        self.words.retain(|w| !w.is(word));
        self.words.len() != before
    }
}
