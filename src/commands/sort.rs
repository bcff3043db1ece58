use clap::Args;

use mealcache::config::Config;

use super::{clock, data_lock, open_store, CommandError};

/// Re-sort the store by date and drop expired days
#[derive(Args)]
pub struct SortCommand {}

impl SortCommand {
    pub fn run(&self, config: &Config) -> Result<(), CommandError> {
        let mut lock = data_lock(config)?;
        let _guard = lock.try_acquire()?;

        let mut store = open_store(config, clock(config))?;
        let evicted = store.sort()?;

        println!(
            "Sorted {} day{} ({} evicted)",
            store.len(),
            if store.len() == 1 { "" } else { "s" },
            evicted
        );
        Ok(())
    }
}
