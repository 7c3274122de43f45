//! Word search

use crate::models::WordEntry;

/// Entries whose word, meaning or any synonym contains `query`
///
/// Matching is a case-insensitive substring test on the trimmed query. An
/// empty query matches everything. View order is preserved.
pub fn filter<'a>(words: &'a [WordEntry], query: &str) -> Vec<&'a WordEntry> {
    let query = query.trim().to_lowercase();
    words
        .iter()
        .filter(|entry| query.is_empty() || matches(entry, &query))
        .collect()
}

/// `needle` must already be lowercase
fn matches(entry: &WordEntry, needle: &str) -> bool {
    let contains = |text: &str| text.to_lowercase().contains(needle);
    contains(&entry.word) || contains(&entry.meaning) || entry.synonyms.iter().any(|s| contains(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<WordEntry> {
        vec![
            WordEntry::new("Lucid").with_meaning("Clear and easy to understand"),
            WordEntry::new("Opaque")
                .with_meaning("not transparent")
                .with_synonyms(["murky", "Cloudy"]),
            WordEntry::new("Terse"),
        ]
    }

    fn found(words: &[WordEntry], query: &str) -> Vec<String> {
        filter(words, query)
            .into_iter()
            .map(|w| w.word.clone())
            .collect()
    }

    #[test]
    fn test_empty_query_returns_all() {
        let words = sample();
        assert_eq!(found(&words, ""), vec!["Lucid", "Opaque", "Terse"]);
        assert_eq!(found(&words, "   ").len(), 3);
    }

    #[test]
    fn test_matches_word_case_insensitive() {
        assert_eq!(found(&sample(), " LUC "), vec!["Lucid"]);
    }

    #[test]
    fn test_matches_meaning_and_synonyms() {
        let words = sample();
        assert_eq!(found(&words, "clear"), vec!["Lucid"]);
        assert_eq!(found(&words, "cloudy"), vec!["Opaque"]);
    }

    #[test]
    fn test_fields_outside_search_are_ignored() {
        let mut words = sample();
        words[2].mnemonic = "sounds like purse".to_string();
        assert!(found(&words, "purse").is_empty());
    }
}
