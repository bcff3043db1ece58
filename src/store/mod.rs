//! Date-ordered, retention-bounded cache of daily menus.
//!
//! The store is one JSON object on disk:
//! ```text
//! {"2024-01-10": [["breakfast dish", ...], ["lunch dish", ...], [...]], ...}
//! ```
//! Member order is the store order. Every mutation builds a new entry list,
//! drops entries older than the retention window, writes the file, and only
//! then replaces the in-memory list.

mod error;
mod merge;
mod snapshot;

pub use error::StoreError;
pub use merge::{MergePath, MergeReport};
pub use snapshot::MealSnapshot;

use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::clock::Clock;
use crate::fallback::Fallback;
use crate::models::{DateKey, MealBatch, MealRecord};
use crate::persist::write_atomic;
use merge::{block_splice, evict_before, first_out_of_order, Entries};
use snapshot::StoredEntries;

/// Default number of trailing days kept.
pub const DEFAULT_RETENTION_DAYS: u64 = 30;

/// A store shared between the sync engine and HTTP readers.
pub type SharedStore = Arc<RwLock<MealStore>>;

pub struct MealStore {
    path: PathBuf,
    retention_days: u64,
    clock: Arc<dyn Clock>,
    entries: Entries,
}

impl std::fmt::Debug for MealStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MealStore")
            .field("path", &self.path)
            .field("retention_days", &self.retention_days)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl MealStore {
    /// Loads the store file, drops expired days, and writes it back.
    ///
    /// A missing or unreadable file gives an empty store marked as defaulted.
    /// Only the write-back can fail.
    pub fn open(
        path: impl Into<PathBuf>,
        retention_days: u64,
        clock: Arc<dyn Clock>,
    ) -> Result<Fallback<Self>, StoreError> {
        let path = path.into();
        let loaded = read_entries(&path);

        if let Some(reason) = loaded.reason() {
            tracing::warn!("Starting with an empty meal store: {}", reason);
        }

        let mut store = Self {
            path,
            retention_days,
            clock,
            entries: Vec::new(),
        };
        let loaded = loaded.map(|entries| {
            store.entries = entries;
        });

        let evicted = store.prune()?;
        tracing::info!(
            "Meal store {} holds {} day(s) ({} expired on load)",
            store.path.display(),
            store.entries.len(),
            evicted
        );

        Ok(loaded.map(|_| store))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retention_days(&self) -> u64 {
        self.retention_days
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = DateKey> + '_ {
        self.entries.iter().map(|(k, _)| *k)
    }

    pub fn first_key(&self) -> Option<DateKey> {
        self.entries.first().map(|(k, _)| *k)
    }

    pub fn last_key(&self) -> Option<DateKey> {
        self.entries.last().map(|(k, _)| *k)
    }

    pub fn get(&self, key: DateKey) -> Option<&MealRecord> {
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }

    /// Oldest key the retention window keeps, relative to the clock's today.
    pub fn cutoff(&self) -> DateKey {
        DateKey::new(self.clock.today()).days_before(self.retention_days)
    }

    /// Merges a batch of records; incoming records win on key collision.
    ///
    /// An empty batch changes nothing and writes nothing.
    pub fn merge(&mut self, incoming: MealBatch) -> Result<MergeReport, StoreError> {
        if incoming.is_empty() {
            return Ok(MergeReport::noop());
        }

        let (mut merged, path, overwritten) = block_splice(&self.entries, &incoming);
        if let Some(key) = first_out_of_order(&merged) {
            tracing::warn!(
                "Merged batch overlaps later days; store is out of order at {} (run sort to repair)",
                key
            );
        }

        let evicted = evict_before(&mut merged, self.cutoff());
        self.replace(merged)?;

        let report = MergeReport {
            path,
            inserted: incoming.len() - overwritten,
            overwritten,
            evicted,
        };
        tracing::info!(
            "Merged {} day(s) via {:?}: {} new, {} replaced, {} expired",
            incoming.len(),
            report.path,
            report.inserted,
            report.overwritten,
            report.evicted
        );
        Ok(report)
    }

    /// Drops leading days older than `reference - retention_days` and writes
    /// the store. Returns the number of days removed.
    pub fn evict(&mut self, retention_days: u64, reference: NaiveDate) -> Result<usize, StoreError> {
        let cutoff = DateKey::new(reference).days_before(retention_days);
        let mut kept = self.entries.clone();
        let evicted = evict_before(&mut kept, cutoff);
        self.replace(kept)?;
        if evicted > 0 {
            tracing::debug!("Evicted {} day(s) before {}", evicted, cutoff);
        }
        Ok(evicted)
    }

    /// Applies the store's own retention window against the clock's today.
    pub fn prune(&mut self) -> Result<usize, StoreError> {
        self.evict(self.retention_days, self.clock.today())
    }

    /// Fully re-sorts the store, then prunes and writes it.
    ///
    /// Only needed after a merge reported out-of-order keys.
    pub fn sort(&mut self) -> Result<usize, StoreError> {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|(k, _)| *k);
        // Keep the later copy of any duplicated key.
        sorted.reverse();
        sorted.dedup_by_key(|(k, _)| *k);
        sorted.reverse();
        let evicted = evict_before(&mut sorted, self.cutoff());
        self.replace(sorted)?;
        Ok(evicted)
    }

    /// All entries with key ≥ `since`, in store order.
    ///
    /// Once one key qualifies, every later entry is included without
    /// comparing it.
    pub fn range_from(&self, since: DateKey) -> MealSnapshot {
        let start = self
            .entries
            .iter()
            .position(|(key, _)| *key >= since)
            .unwrap_or(self.entries.len());
        MealSnapshot::new(self.entries[start..].to_vec())
    }

    pub fn snapshot(&self) -> MealSnapshot {
        MealSnapshot::new(self.entries.clone())
    }

    /// Human-readable listing of the whole store.
    pub fn render(&self) -> String {
        self.snapshot().to_string()
    }

    /// Writes `entries` to disk, then swaps them in.
    fn replace(&mut self, entries: Entries) -> Result<(), StoreError> {
        let snapshot = MealSnapshot::new(entries);
        let bytes = serde_json::to_vec(&snapshot)?;
        write_atomic(&self.path, &bytes)?;
        self.entries = snapshot.into_entries();
        Ok(())
    }
}

/// Reads the store file, falling back to an empty list on any failure.
fn read_entries(path: &Path) -> Fallback<Entries> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            return Fallback::defaulted(
                Vec::new(),
                format!("cannot read {}: {}", path.display(), e),
            )
        }
    };

    match serde_json::from_str::<StoredEntries>(&contents) {
        Ok(stored) => {
            for key in &stored.rejected {
                tracing::warn!("Dropping stored entry with invalid date key '{}'", key);
            }
            Fallback::Loaded(stored.entries)
        }
        Err(e) => Fallback::defaulted(
            Vec::new(),
            format!("cannot parse {}: {}", path.display(), e),
        ),
    }
}
