mod config_cmd;
mod cursor_cmd;
mod show;
mod sort;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use cursor_cmd::CursorCommand;
pub use show::ShowCommand;
pub use sort::SortCommand;
pub use sync_cmd::SyncCommand;

use clap::ValueEnum;
use std::sync::Arc;

use mealcache::clock::{Clock, SystemClock};
use mealcache::config::Config;
use mealcache::cursor::{Cursor, CursorError};
use mealcache::fetch::FetchError;
use mealcache::lock::{DataLock, LockError};
use mealcache::store::{MealStore, StoreError};
use mealcache::sync::SyncError;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Clock for "today" in the configured offset.
pub fn clock(config: &Config) -> Arc<dyn Clock> {
    Arc::new(SystemClock::with_offset_hours(config.utc_offset_hours.value))
}

/// Opens the configured store. A defaulted load is already logged.
pub fn open_store(config: &Config, clock: Arc<dyn Clock>) -> Result<MealStore, CommandError> {
    let store = MealStore::open(config.store_path(), config.retention_days.value, clock)?;
    Ok(store.into_inner())
}

/// Lock file of the configured data directory. Commands that move the cursor
/// or rewrite the store hold it for their whole run.
pub fn data_lock(config: &Config) -> Result<DataLock, CommandError> {
    Ok(DataLock::open(&config.data_dir.value)?)
}

pub fn load_cursor(config: &Config) -> Result<Cursor, CommandError> {
    let cursor = Cursor::load(config.cursor_path(), config.initial_page.value)?;
    Ok(cursor.into_inner())
}

/// Errors from CLI commands
#[derive(Debug)]
pub enum CommandError {
    Store(StoreError),
    Cursor(CursorError),
    Lock(LockError),
    Fetch(FetchError),
    Sync(SyncError),
    Output(serde_json::Error),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::Store(e) => write!(f, "{}", e),
            CommandError::Cursor(e) => write!(f, "{}", e),
            CommandError::Lock(e) => write!(f, "{}", e),
            CommandError::Fetch(e) => write!(f, "{}", e),
            CommandError::Sync(e) => write!(f, "{}", e),
            CommandError::Output(e) => write!(f, "Failed to format output: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::Store(e) => Some(e),
            CommandError::Cursor(e) => Some(e),
            CommandError::Lock(e) => Some(e),
            CommandError::Fetch(e) => Some(e),
            CommandError::Sync(e) => Some(e),
            CommandError::Output(e) => Some(e),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Store(e)
    }
}

impl From<CursorError> for CommandError {
    fn from(e: CursorError) -> Self {
        CommandError::Cursor(e)
    }
}

impl From<LockError> for CommandError {
    fn from(e: LockError) -> Self {
        CommandError::Lock(e)
    }
}

impl From<FetchError> for CommandError {
    fn from(e: FetchError) -> Self {
        CommandError::Fetch(e)
    }
}

impl From<SyncError> for CommandError {
    fn from(e: SyncError) -> Self {
        CommandError::Sync(e)
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(e: serde_json::Error) -> Self {
        CommandError::Output(e)
    }
}
