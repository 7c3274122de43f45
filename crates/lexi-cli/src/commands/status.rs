//! Status command handler

use anyhow::Result;
use chrono::{DateTime, Local, Utc};

use lexi_core::storage::PENDING_OPS_KEY;
use lexi_core::{Config, Engine, InitOutcome, SqliteStore, WordRepository};

use crate::commands::sync::Startup;
use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show<R: WordRepository>(
    engine: &Engine<SqliteStore, R>,
    config: &Config,
    startup: &Startup,
    output: &Output,
) -> Result<()> {
    let queue = engine.queue();
    let oldest = queue.oldest_queued_at();
    let last_queue_write = engine.store().last_modified(PENDING_OPS_KEY)?;
    let (online, remote_error) = match &startup.outcome {
        InitOutcome::Online { .. } => (true, None),
        InitOutcome::Offline(e) => (false, Some(e.to_string())),
    };

    match output.format {
        OutputFormat::Json => {
            let pending: Vec<_> = queue
                .iter()
                .map(|queued| {
                    serde_json::json!({
                        "action": queued.op.action(),
                        "word": queued.op.word(),
                        "old_word": queued.op.old_word(),
                        "queued_at": queued.queued_at
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::json!({
                    "sync_enabled": config.sync_enabled,
                    "endpoint_url": config.endpoint_url,
                    "online": online,
                    "remote_error": remote_error,
                    "storage": {
                        "data_dir": config.data_dir,
                        "database": config.sqlite_path(),
                        "last_queue_write": last_queue_write
                    },
                    "counts": {
                        "words": engine.view().len(),
                        "local": engine.cache().len(),
                        "pending": queue.len()
                    },
                    "pending": pending
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", queue.len());
        }
        OutputFormat::Human => {
            println!("Lexi Status");
            println!("===========");
            println!();
            println!("Sync:");
            println!(
                "  Status:   {}",
                if config.sync_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            );
            if let Some(ref url) = config.endpoint_url {
                println!("  Endpoint: {}", url);
            }
            match remote_error {
                None => println!("  Remote:   reachable"),
                Some(reason) => println!("  Remote:   offline ({})", reason),
            }
            println!();
            println!("Storage:");
            println!("  Location: {}", config.data_dir.display());
            println!("  Database: {}", config.sqlite_path().display());
            println!();
            println!("Contents:");
            println!("  Words:   {}", engine.view().len());
            println!("  Local:   {}", engine.cache().len());
            println!("  Pending: {}", queue.len());
            if let Some(oldest) = oldest {
                println!("  Oldest pending change: {}", local_time(oldest));
            }
            if let Some(written) = last_queue_write {
                println!("  Queue last written:    {}", local_time(written));
            }
            for queued in queue.iter() {
                match queued.op.old_word() {
                    Some(old) if old != queued.op.word() => println!(
                        "    {} {} (was {})",
                        queued.op.action(),
                        queued.op.word(),
                        old
                    ),
                    _ => println!("    {} {}", queued.op.action(), queued.op.word()),
                }
            }
        }
    }

    Ok(())
}

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}
