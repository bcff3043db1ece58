//! Runs one sync cycle against the upstream site.

use clap::Args;
use std::sync::Arc;
use tokio::sync::RwLock;

use mealcache::config::Config;
use mealcache::fetch::HttpPageFetcher;
use mealcache::store::MergePath;
use mealcache::sync::{SyncEngine, SyncOutcome, SyncReport};

use super::{clock, data_lock, load_cursor, open_store, CommandError};

/// Fetch new weeks and merge them into the store
#[derive(Debug, Args)]
pub struct SyncCommand {}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), CommandError> {
        let mut lock = data_lock(config)?;
        let _guard = lock.try_acquire()?;

        let store = open_store(config, clock(config))?;
        let cursor = load_cursor(config)?;
        let fetcher = HttpPageFetcher::new(config.fetch_config())?;

        println!("Syncing from page {}...", cursor.value() + 1);
        println!();

        let engine = SyncEngine::new(
            fetcher,
            cursor,
            Arc::new(RwLock::new(store)),
            config.sync_options(),
        );

        match engine.sync().await? {
            SyncOutcome::Completed(report) => print_report(&report),
            SyncOutcome::Skipped => println!("Another sync is already running."),
        }

        Ok(())
    }
}

fn print_report(report: &SyncReport) {
    println!(
        "  {} page{} fetched, {} with data",
        report.pages_fetched,
        if report.pages_fetched == 1 { "" } else { "s" },
        report.pages_with_data
    );
    println!("  cursor at {}", report.cursor);

    let merge = &report.merge;
    println!();
    match merge.path {
        MergePath::Noop => println!("Already up to date."),
        MergePath::Append | MergePath::Splice => {
            println!(
                "Sync complete: {} new, {} updated, {} evicted.",
                merge.inserted, merge.overwritten, merge.evicted
            );
        }
    }
}
