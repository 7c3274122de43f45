//! Data models for Lexi
//!
//! Defines the core data structures: [`WordEntry`], [`PendingOperation`]
//! and the small value types that travel with them.
//!
//! JSON field names follow the remote endpoint's camelCase contract
//! (`hindiMeaning`, `oneLiner`, `oldWord`), so the same types are used for
//! the local cache, the pending queue and the wire payloads.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single vocabulary entry
///
/// Every field except `word` is optional; the empty string stands for
/// "absent".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WordEntry {
    /// The word itself (case-insensitive unique key)
    #[serde(default, deserialize_with = "lenient_string")]
    pub word: String,
    /// Part of speech
    #[serde(default, deserialize_with = "lenient_string")]
    pub pos: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub pronunciation: String,
    /// Meaning in Hindi
    #[serde(default, deserialize_with = "lenient_string")]
    pub hindi_meaning: String,
    /// Meaning in English
    #[serde(default, deserialize_with = "lenient_string")]
    pub meaning: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub example: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mnemonic: String,
    /// One-line summary
    #[serde(default, deserialize_with = "lenient_string")]
    pub one_liner: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub uses: String,
    /// Synonyms, in display order
    #[serde(default, deserialize_with = "lenient_synonyms")]
    pub synonyms: Vec<String>,
}

impl WordEntry {
    /// Create an entry with only the word set
    pub fn new(word: impl Into<String>) -> Self {
        Self {
            word: word.into().trim().to_string(),
            ..Self::default()
        }
    }

    /// Set the English meaning
    pub fn with_meaning(mut self, meaning: impl Into<String>) -> Self {
        self.meaning = meaning.into();
        self
    }

    /// Set the synonyms
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// The lowercase key used for deduplication
    pub fn key(&self) -> String {
        word_key(&self.word)
    }

    /// Case-insensitive comparison against another word
    pub fn is(&self, word: &str) -> bool {
        self.key() == word_key(word)
    }
}

/// Normalize a word to its deduplication key
pub fn word_key(word: &str) -> String {
    word.to_lowercase()
}

/// Split a comma-separated synonym list
pub fn parse_synonyms(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Kind of mutation carried by a [`PendingOperation`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// A mutation intent, shaped exactly like the remote write payload
///
/// Serializes flat with an `action` tag:
/// `{"action":"update","oldWord":"run","word":"sprint",...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PendingOperation {
    Create(WordEntry),
    Update {
        #[serde(rename = "oldWord")]
        old_word: String,
        #[serde(flatten)]
        entry: WordEntry,
    },
    Delete {
        word: String,
    },
}

impl PendingOperation {
    pub fn action(&self) -> Action {
        match self {
            PendingOperation::Create(_) => Action::Create,
            PendingOperation::Update { .. } => Action::Update,
            PendingOperation::Delete { .. } => Action::Delete,
        }
    }

    /// The target word (post-mutation name for create/update)
    pub fn word(&self) -> &str {
        match self {
            PendingOperation::Create(entry) => &entry.word,
            PendingOperation::Update { entry, .. } => &entry.word,
            PendingOperation::Delete { word } => word,
        }
    }

    /// The pre-mutation key, only present for updates
    pub fn old_word(&self) -> Option<&str> {
        match self {
            PendingOperation::Update { old_word, .. } => Some(old_word),
            _ => None,
        }
    }

    /// Whether this operation targets `word` (case-insensitive)
    pub fn references(&self, word: &str) -> bool {
        word_key(self.word()) == word_key(word)
    }
}

/// A queued operation together with the time it was queued
///
/// `queued_at` is local bookkeeping and is never sent to the remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedOperation {
    #[serde(flatten)]
    pub op: PendingOperation,
    #[serde(rename = "queuedAt", default, skip_serializing_if = "Option::is_none")]
    pub queued_at: Option<DateTime<Utc>>,
}

impl QueuedOperation {
    /// Stamp an operation with the current time
    pub fn now(op: PendingOperation) -> Self {
        Self {
            op,
            queued_at: Some(Utc::now()),
        }
    }
}

/// Per-word sync indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Pending,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Synced => f.write_str("synced"),
            SyncStatus::Pending => f.write_str("pending"),
        }
    }
}

/// The word being edited, captured when the edit began
///
/// Passed into `Engine::update` so the pre-edit key never lives in
/// ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    original_word: String,
    original: WordEntry,
}

impl EditSession {
    /// Start editing an entry taken from the merged view
    pub fn for_entry(entry: WordEntry) -> Self {
        Self {
            original_word: entry.word.clone(),
            original: entry,
        }
    }

    pub fn original_word(&self) -> &str {
        &self.original_word
    }

    /// The entry as it was when the edit began
    pub fn original(&self) -> &WordEntry {
        &self.original
    }

    /// Whether `entry` renames the word being edited
    pub fn is_rename(&self, entry: &WordEntry) -> bool {
        !entry.is(&self.original_word)
    }
}

/// Accept a string, null, or any scalar for a text field
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

/// Accept either an array of strings or one comma-separated string
fn lenient_synonyms<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => parse_synonyms(&s),
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .filter(|s| !s.is_empty())
            .collect(),
        _ => Vec::new(),
    })
}
