//! Sync command handler

use anyhow::{bail, Result};

use lexi_core::{Engine, FlushSummary, InitOutcome, LocalStore, RemoteError, WordRepository};

use crate::output::{Output, OutputFormat};

/// What happened when the engine came up
#[derive(Debug)]
pub struct Startup {
    pub outcome: InitOutcome,
    /// Flush run because the remote was reachable
    pub flush: Option<FlushSummary>,
}

/// Initialize the engine and, if the remote answered, treat that as
/// connectivity being restored
pub async fn startup<S: LocalStore, R: WordRepository>(
    engine: &mut Engine<S, R>,
) -> Result<Startup> {
    let outcome = engine.initialize().await;
    let flush = if outcome.is_online() {
        engine.on_connectivity_restored().await?
    } else {
        None
    };
    Ok(Startup { outcome, flush })
}

/// Report the result of syncing with the remote endpoint
pub fn sync<S: LocalStore, R: WordRepository>(
    engine: &Engine<S, R>,
    startup: &Startup,
    output: &Output,
) -> Result<()> {
    let pending = engine.queue().len();

    let remote_words = match &startup.outcome {
        InitOutcome::Online { remote_words } => *remote_words,
        InitOutcome::Offline(RemoteError::NotConfigured) => {
            bail!(
                "Sync is not configured. Enable it with:\n  \
                 lexi config set endpoint_url https://your-endpoint/exec\n  \
                 lexi config set sync_enabled true"
            );
        }
        InitOutcome::Offline(e) => {
            bail!(
                "Sync failed: {}\n{} change(s) still pending sync",
                e,
                pending
            );
        }
    };
    let delivered = startup.flush.as_ref().map_or(0, |summary| summary.succeeded);

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "remote_words": remote_words,
                    "words": engine.view().len(),
                    "delivered": delivered,
                    "pending": pending
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", pending);
        }
        OutputFormat::Human => {
            output.success(&format!(
                "Sync complete - loaded {} words from the remote list",
                remote_words
            ));
            if delivered > 0 {
                output.message(&format!("  Delivered: {} queued change(s)", delivered));
            }
            if pending > 0 {
                output.message(&format!("  Pending:   {} change(s)", pending));
            }
            output.message(&format!("  Words:     {}", engine.view().len()));
        }
    }

    Ok(())
}
