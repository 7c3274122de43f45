//! List merging
//!
//! The one dedup rule used wherever word lists are combined: walk the
//! entries in order, keep the first entry for each lowercase word, drop
//! entries with an empty word.

use std::collections::HashSet;

use crate::models::{word_key, PendingOperation, WordEntry};

/// Combine `primary` then `secondary`; `primary` wins on conflict
pub fn merge(primary: &[WordEntry], secondary: &[WordEntry]) -> Vec<WordEntry> {
    dedupe(primary.iter().chain(secondary).cloned())
}

/// Keep the first entry per key, preserving encounter order
pub fn dedupe<I>(entries: I) -> Vec<WordEntry>
where
    I: IntoIterator<Item = WordEntry>,
{
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| {
            let key = entry.key();
            !key.is_empty() && seen.insert(key)
        })
        .collect()
}

/// Drop remote entries that queued operations have removed locally
///
/// A queued delete of `w`, or a queued rename away from `w`, means the
/// remote copy of `w` is stale.
pub fn without_pending_removals<'a, I>(remote: Vec<WordEntry>, pending: I) -> Vec<WordEntry>
where
    I: IntoIterator<Item = &'a PendingOperation>,
{
    let removed: HashSet<String> = pending
        .into_iter()
        .filter_map(|op| match op {
            PendingOperation::Delete { word } => Some(word_key(word)),
            PendingOperation::Update { old_word, entry } if !entry.is(old_word) => {
                Some(word_key(old_word))
            }
            _ => None,
        })
        .collect();

    if removed.is_empty() {
        return remote;
    }

    remote
        .into_iter()
        .filter(|entry| !removed.contains(&entry.key()))
        .collect()
}
