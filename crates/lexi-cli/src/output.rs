//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)
//!
//! Engine notifications ("toasts") go to stderr so they never mix with
//! command output.

use anyhow::{Context, Result};
use serde::Serialize;

use lexi_core::format::example_lines;
use lexi_core::{Delivery, EngineEvent, MutationOutcome, SyncStatus, WordEntry};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// A word together with its sync badge
#[derive(Debug, Serialize)]
pub struct WordRow<'a> {
    #[serde(flatten)]
    pub entry: &'a WordEntry,
    pub status: SyncStatus,
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a single word with every non-empty field
    pub fn print_word(&self, row: &WordRow<'_>) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                let entry = row.entry;
                if entry.pos.is_empty() {
                    println!("{}", entry.word);
                } else {
                    println!("{} ({})", entry.word, entry.pos);
                }
                print_field("Pronunciation", &entry.pronunciation);
                print_field("Meaning", &entry.meaning);
                print_field("Hindi", &entry.hindi_meaning);
                print_field("Synonyms", &entry.synonyms.join(", "));
                print_field("One-liner", &entry.one_liner);
                print_field("Uses", &entry.uses);
                print_field("Mnemonic", &entry.mnemonic);

                let example = example_lines(&entry.example);
                if !example.is_empty() {
                    println!("Example:");
                    for line in example {
                        println!("  {}", line);
                    }
                }
                println!("Sync:          {}", row.status);
            }
            OutputFormat::Json => print_json(row)?,
            OutputFormat::Quiet => println!("{}", row.entry.word),
        }
        Ok(())
    }

    /// Print a list of words
    pub fn print_words(&self, rows: &[WordRow<'_>]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                if rows.is_empty() {
                    println!("No words found.");
                    return Ok(());
                }
                for row in rows {
                    let badge = match row.status {
                        SyncStatus::Pending => " (pending)",
                        SyncStatus::Synced => "",
                    };
                    println!(
                        "{:<20} | {}{}",
                        truncate(&row.entry.word, 20),
                        truncate(&row.entry.meaning, 50),
                        badge
                    );
                }
                println!("\n{} word(s)", rows.len());
            }
            OutputFormat::Json => print_json(&rows)?,
            OutputFormat::Quiet => {
                for row in rows {
                    println!("{}", row.entry.word);
                }
            }
        }
        Ok(())
    }

    /// Report a mutation for machine consumers
    ///
    /// Human output relies on the engine's toasts instead.
    pub fn print_outcome(&self, outcome: &MutationOutcome, pending: usize) -> Result<()> {
        if !self.is_json() {
            return Ok(());
        }
        let (delivery, error) = match &outcome.delivery {
            Delivery::Confirmed => ("confirmed", None),
            Delivery::Queued(e) => ("queued", Some(e.to_string())),
        };
        print_json(&serde_json::json!({
            "action": outcome.op.action(),
            "word": outcome.op.word(),
            "old_word": outcome.op.old_word(),
            "delivery": delivery,
            "error": error,
            "pending": pending
        }))
    }

    /// Print an engine notification
    pub fn event(&self, event: &EngineEvent) {
        if self.format != OutputFormat::Human {
            return;
        }
        // The word count is reported by commands that care about it
        if matches!(event, EngineEvent::Loaded { .. }) {
            return;
        }
        if let Some(message) = event.message() {
            let marker = if event.is_warning() { "⚠" } else { "✓" };
            eprintln!("{} {}", marker, message);
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
    println!("{}", text);
    Ok(())
}

fn print_field(label: &str, value: &str) {
    if !value.is_empty() {
        println!("{:<15}{}", format!("{}:", label), value);
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("café crème brûlée", 10), "café cr...");
    }

    #[test]
    fn test_word_row_json_shape() {
        let entry = WordEntry::new("Lucid").with_meaning("clear");
        let row = WordRow {
            entry: &entry,
            status: SyncStatus::Pending,
        };

        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["word"], "Lucid");
        assert_eq!(value["meaning"], "clear");
        assert_eq!(value["status"], "pending");
    }
}
