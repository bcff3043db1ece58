//! Incremental fetch-and-merge of upstream pages.
//!
//! One cycle:
//! 1. advance the cursor and fetch that page, repeating while pages have data;
//! 2. roll the cursor back over the first empty page so the next cycle asks
//!    for it again;
//! 3. merge everything fetched into the store in one step.

use tokio::sync::Mutex;

use crate::cursor::{Cursor, CursorError};
use crate::fetch::{FetchError, PageFetcher};
use crate::models::MealBatch;
use crate::store::{MergeReport, SharedStore, StoreError};

/// Behaviour switches for [`SyncEngine`].
#[derive(Debug, Clone, Copy)]
pub struct SyncOptions {
    /// After a failed fetch, rewind the cursor to where the cycle started so
    /// the next cycle fetches the discarded pages again instead of skipping
    /// them.
    pub rollback_on_fetch_error: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            rollback_on_fetch_error: true,
        }
    }
}

/// Summary of one completed cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Fetch calls issued, including the final empty one.
    pub pages_fetched: usize,
    /// Pages that returned records.
    pub pages_with_data: usize,
    /// Cursor value after the rollback.
    pub cursor: u64,
    /// Distinct days fetched across all pages.
    pub days_fetched: usize,
    pub merge: MergeReport,
}

/// Result of calling [`SyncEngine::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Completed(SyncReport),
    /// Another cycle was already running; nothing was done.
    Skipped,
}

/// Drives fetch cycles against one cursor and one store.
pub struct SyncEngine<F> {
    fetcher: F,
    cursor: Mutex<Cursor>,
    store: SharedStore,
    options: SyncOptions,
}

impl<F: PageFetcher> SyncEngine<F> {
    pub fn new(fetcher: F, cursor: Cursor, store: SharedStore, options: SyncOptions) -> Self {
        Self {
            fetcher,
            cursor: Mutex::new(cursor),
            store,
            options,
        }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Current cursor value, waiting for a running cycle to finish.
    pub async fn cursor_value(&self) -> u64 {
        self.cursor.lock().await.value()
    }

    /// Runs one cycle unless one is already in progress.
    ///
    /// A fetch failure aborts the cycle before anything is merged. The store
    /// lock is taken only for the final merge, so readers are not blocked
    /// while pages download.
    ///
    /// Records are only ever dropped together with the cursor moves that
    /// consumed them: a failed commit always rewinds the cursor to where the
    /// cycle started, and so does a failed fetch when
    /// [`SyncOptions::rollback_on_fetch_error`] is set.
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let Ok(mut cursor) = self.cursor.try_lock() else {
            tracing::info!("Sync already running, skipping");
            return Ok(SyncOutcome::Skipped);
        };

        let start = cursor.value();
        tracing::info!("Sync starts at page {}", start);

        let mut accumulated = MealBatch::new();
        let mut pages_fetched = 0;
        let mut pages_with_data = 0;

        loop {
            let page = cursor.advance(1)?;
            pages_fetched += 1;

            let batch = match self.fetcher.fetch(page).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::error!("Sync aborted at page {}: {}", page, e);
                    if self.options.rollback_on_fetch_error {
                        rewind(&mut cursor, start);
                    }
                    return Err(SyncError::Fetch(e));
                }
            };

            if batch.is_empty() {
                break;
            }

            tracing::debug!("Page {} returned {} day(s)", page, batch.len());
            pages_with_data += 1;
            accumulated.extend(batch);
        }

        let cursor_value = cursor.rollback(1)?;
        let days_fetched = accumulated.len();

        let merge = match self.store.write().await.merge(accumulated) {
            Ok(merge) => merge,
            Err(e) => {
                tracing::error!("Sync could not commit: {}", e);
                rewind(&mut cursor, start);
                return Err(SyncError::Store(e));
            }
        };

        let report = SyncReport {
            pages_fetched,
            pages_with_data,
            cursor: cursor_value,
            days_fetched,
            merge,
        };
        tracing::info!(
            "Sync finished: {} page(s) with data, {} day(s), cursor at {}",
            report.pages_with_data,
            report.days_fetched,
            report.cursor
        );
        Ok(SyncOutcome::Completed(report))
    }
}

/// Moves the cursor back to `start` so the next cycle fetches the same pages.
fn rewind(cursor: &mut Cursor, start: u64) {
    let delta = cursor.value().saturating_sub(start);
    if delta == 0 {
        return;
    }
    match cursor.rollback(delta) {
        Ok(value) => tracing::info!("Cursor rewound to {}", value),
        Err(e) => tracing::error!("Could not rewind cursor to {}: {}", start, e),
    }
}

/// Errors that abort a sync cycle.
#[derive(Debug)]
pub enum SyncError {
    /// The upstream page could not be fetched.
    Fetch(FetchError),
    /// The cursor could not be moved or persisted.
    Cursor(CursorError),
    /// The merged store could not be persisted.
    Store(StoreError),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Fetch(e) => write!(f, "Fetch error: {}", e),
            SyncError::Cursor(e) => write!(f, "Cursor error: {}", e),
            SyncError::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncError::Fetch(e) => Some(e),
            SyncError::Cursor(e) => Some(e),
            SyncError::Store(e) => Some(e),
        }
    }
}

impl From<FetchError> for SyncError {
    fn from(e: FetchError) -> Self {
        SyncError::Fetch(e)
    }
}

impl From<CursorError> for SyncError {
    fn from(e: CursorError) -> Self {
        SyncError::Cursor(e)
    }
}

impl From<StoreError> for SyncError {
    fn from(e: StoreError) -> Self {
        SyncError::Store(e)
    }
}
