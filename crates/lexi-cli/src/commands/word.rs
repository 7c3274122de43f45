//! Word command handlers

use anyhow::{anyhow, Result};
use clap::Args;

use lexi_core::models::parse_synonyms;
use lexi_core::{Engine, LocalStore, WordEntry, WordRepository};

use crate::output::{Output, WordRow};
use crate::prompt::confirm;

/// Most results shown by `search`
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Optional word fields shared by `add` and `edit`
#[derive(Args, Debug, Default, Clone)]
pub struct WordFields {
    /// Part of speech
    #[arg(long)]
    pub pos: Option<String>,
    #[arg(long)]
    pub pronunciation: Option<String>,
    /// Meaning in English
    #[arg(short, long)]
    pub meaning: Option<String>,
    /// Meaning in Hindi
    #[arg(long = "hindi")]
    pub hindi_meaning: Option<String>,
    /// Example sentence(s)
    #[arg(short, long)]
    pub example: Option<String>,
    #[arg(long)]
    pub mnemonic: Option<String>,
    /// One-line summary
    #[arg(long)]
    pub one_liner: Option<String>,
    #[arg(long)]
    pub uses: Option<String>,
    /// Comma-separated synonyms
    #[arg(short, long)]
    pub synonyms: Option<String>,
}

impl WordFields {
    /// Overwrite the fields that were given, trimmed
    pub fn apply(self, entry: &mut WordEntry) {
        let text_fields = [
            (self.pos, &mut entry.pos),
            (self.pronunciation, &mut entry.pronunciation),
            (self.meaning, &mut entry.meaning),
            (self.hindi_meaning, &mut entry.hindi_meaning),
            (self.example, &mut entry.example),
            (self.mnemonic, &mut entry.mnemonic),
            (self.one_liner, &mut entry.one_liner),
            (self.uses, &mut entry.uses),
        ];
        for (value, field) in text_fields {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        }
        if let Some(synonyms) = self.synonyms {
            entry.synonyms = parse_synonyms(&synonyms);
        }
    }
}

fn rows<'a, S, R>(engine: &Engine<S, R>, entries: impl IntoIterator<Item = &'a WordEntry>) -> Vec<WordRow<'a>>
where
    S: LocalStore,
    R: WordRepository,
{
    entries
        .into_iter()
        .map(|entry| WordRow {
            entry,
            status: engine.sync_status(&entry.word),
        })
        .collect()
}

/// List every word in the merged view
pub fn list<S: LocalStore, R: WordRepository>(engine: &Engine<S, R>, output: &Output) -> Result<()> {
    output.print_words(&rows(engine, engine.view()))
}

/// Search words by word, meaning or synonym
pub fn search<S: LocalStore, R: WordRepository>(
    engine: &Engine<S, R>,
    query: &str,
    output: &Output,
) -> Result<()> {
    let matches = lexi_core::search::filter(engine.view(), query);
    let total = matches.len();

    output.print_words(&rows(engine, matches.into_iter().take(MAX_SEARCH_RESULTS)))?;
    if total > MAX_SEARCH_RESULTS {
        output.message(&format!(
            "Showing {} of {} matches; refine the query to see more.",
            MAX_SEARCH_RESULTS, total
        ));
    }
    Ok(())
}

/// Show a single word
pub fn show<S: LocalStore, R: WordRepository>(
    engine: &Engine<S, R>,
    word: &str,
    output: &Output,
) -> Result<()> {
    let entry = engine
        .get(word)
        .ok_or_else(|| anyhow!("Word not found: {}", word))?;

    output.print_word(&WordRow {
        entry,
        status: engine.sync_status(&entry.word),
    })
}

/// Add a new word
pub async fn add<S: LocalStore, R: WordRepository>(
    engine: &mut Engine<S, R>,
    word: String,
    fields: WordFields,
    output: &Output,
) -> Result<()> {
    let mut entry = WordEntry::new(word);
    fields.apply(&mut entry);

    let outcome = engine.create(entry).await?;
    output.print_outcome(&outcome, engine.queue().len())
}

/// Edit an existing word, optionally renaming it
pub async fn edit<S: LocalStore, R: WordRepository>(
    engine: &mut Engine<S, R>,
    word: &str,
    rename: Option<String>,
    fields: WordFields,
    output: &Output,
) -> Result<()> {
    let session = engine
        .begin_edit(word)
        .ok_or_else(|| anyhow!("Word not found: {}", word))?;

    let mut entry = session.original().clone();
    fields.apply(&mut entry);
    if let Some(new_word) = rename {
        entry.word = new_word;
    }

    let outcome = engine.update(&session, entry).await?;
    output.print_outcome(&outcome, engine.queue().len())
}

/// Delete a word
pub async fn delete<S: LocalStore, R: WordRepository>(
    engine: &mut Engine<S, R>,
    word: &str,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let entry = engine
        .get(word)
        .ok_or_else(|| anyhow!("Word not found: {}", word))?;

    // Confirm deletion
    if !yes && output.should_prompt() {
        println!("Delete word: {}", entry.word);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let outcome = engine.delete(word).await?;
    output.print_outcome(&outcome, engine.queue().len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use lexi_core::{HttpRepository, MemoryStore, SyncStatus};

    use crate::output::OutputFormat;

    /// Engine with no endpoint: every write is queued
    fn local_engine() -> Engine<MemoryStore, HttpRepository> {
        let repo = HttpRepository::new(None, Duration::from_secs(1)).unwrap();
        Engine::open(MemoryStore::new(), repo).unwrap()
    }

    fn quiet() -> Output {
        Output::new(OutputFormat::Quiet)
    }

    #[test]
    fn test_fields_apply() {
        let mut entry = WordEntry::new("Lucid").with_meaning("clear");
        entry.mnemonic = "loo-sid".to_string();

        WordFields {
            meaning: Some("  easy to understand ".to_string()),
            synonyms: Some("clear, plain".to_string()),
            ..WordFields::default()
        }
        .apply(&mut entry);

        assert_eq!(entry.meaning, "easy to understand");
        assert_eq!(entry.synonyms, vec!["clear", "plain"]);
        assert_eq!(entry.mnemonic, "loo-sid");
    }

    #[tokio::test]
    async fn test_add_without_endpoint_is_pending() {
        let mut engine = local_engine();

        let fields = WordFields {
            meaning: Some("clear".to_string()),
            ..WordFields::default()
        };
        add(&mut engine, "Lucid".to_string(), fields, &quiet())
            .await
            .unwrap();

        assert_eq!(engine.get("lucid").unwrap().meaning, "clear");
        assert_eq!(engine.sync_status("Lucid"), SyncStatus::Pending);
        assert_eq!(engine.queue().len(), 1);
    }

    #[tokio::test]
    async fn test_add_duplicate_fails() {
        let mut engine = local_engine();
        add(&mut engine, "Lucid".to_string(), WordFields::default(), &quiet())
            .await
            .unwrap();

        let err = add(&mut engine, "LUCID".to_string(), WordFields::default(), &quiet())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[tokio::test]
    async fn test_edit_with_rename() {
        let mut engine = local_engine();
        let fields = WordFields {
            meaning: Some("move fast".to_string()),
            ..WordFields::default()
        };
        add(&mut engine, "run".to_string(), fields, &quiet())
            .await
            .unwrap();

        edit(
            &mut engine,
            "RUN",
            Some("sprint".to_string()),
            WordFields::default(),
            &quiet(),
        )
        .await
        .unwrap();

        assert!(engine.get("run").is_none());
        assert_eq!(engine.get("sprint").unwrap().meaning, "move fast");
    }

    #[tokio::test]
    async fn test_edit_unknown_word() {
        let mut engine = local_engine();
        let err = edit(&mut engine, "ghost", None, WordFields::default(), &quiet())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Word not found"));
    }

    #[tokio::test]
    async fn test_delete_without_prompt_in_quiet_mode() {
        let mut engine = local_engine();
        add(&mut engine, "Lucid".to_string(), WordFields::default(), &quiet())
            .await
            .unwrap();

        delete(&mut engine, "lucid", false, &quiet()).await.unwrap();

        assert!(engine.view().is_empty());
        assert_eq!(engine.sync_status("Lucid"), SyncStatus::Pending);
    }

    #[test]
    fn test_show_unknown_word() {
        let engine = local_engine();
        assert!(show(&engine, "ghost", &quiet()).is_err());
        assert!(search(&engine, "anything", &quiet()).is_ok());
    }
}
