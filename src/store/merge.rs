//! Pure ordering operations on the store's entry list.

use crate::models::{DateKey, MealBatch, MealRecord};

pub(crate) type Entries = Vec<(DateKey, MealRecord)>;

/// Which branch a merge took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergePath {
    /// Nothing was merged.
    Noop,
    /// Every incoming key was later than the store's last key.
    Append,
    /// The store was rebuilt with the batch spliced in as one block.
    Splice,
}

/// Outcome of merging one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    pub path: MergePath,
    /// Keys that were not in the store before.
    pub inserted: usize,
    /// Keys whose existing record was replaced.
    pub overwritten: usize,
    /// Leading keys dropped by the retention pass after the merge.
    pub evicted: usize,
}

impl MergeReport {
    pub fn noop() -> Self {
        Self {
            path: MergePath::Noop,
            inserted: 0,
            overwritten: 0,
            evicted: 0,
        }
    }
}

/// Builds the merged entry list without touching `existing`.
///
/// If the store is empty or the batch starts after the store's last key, the
/// batch is appended. Otherwise the whole batch is inserted as one block
/// right before the first existing key greater than the batch's first key,
/// and existing records whose key is in the batch are dropped.
///
/// The block is not interleaved: a batch that spans past later existing keys
/// leaves the result out of order. Upstream pages are contiguous weeks, so
/// this only happens with hand-built input; `MealStore::sort` repairs it.
pub(crate) fn block_splice(existing: &[(DateKey, MealRecord)], incoming: &MealBatch) -> (Entries, MergePath, usize) {
    let Some(first) = incoming.keys().next().copied() else {
        return (existing.to_vec(), MergePath::Noop, 0);
    };

    let batch = || incoming.iter().map(|(k, v)| (*k, v.clone()));
    let mut merged = Vec::with_capacity(existing.len() + incoming.len());

    match existing.last() {
        Some((last, _)) if first <= *last => {
            let mut overwritten = 0;
            let mut spliced = false;
            for (key, record) in existing {
                if !spliced && *key > first {
                    merged.extend(batch());
                    spliced = true;
                }
                if incoming.contains_key(key) {
                    overwritten += 1;
                } else {
                    merged.push((*key, record.clone()));
                }
            }
            if !spliced {
                merged.extend(batch());
            }
            (merged, MergePath::Splice, overwritten)
        }
        _ => {
            merged.extend_from_slice(existing);
            merged.extend(batch());
            (merged, MergePath::Append, 0)
        }
    }
}

/// Removes leading entries older than `cutoff`.
///
/// Stops at the first retained key; entries behind it are not inspected.
pub(crate) fn evict_before(entries: &mut Entries, cutoff: DateKey) -> usize {
    let stale = entries
        .iter()
        .position(|(key, _)| *key >= cutoff)
        .unwrap_or(entries.len());
    entries.drain(..stale);
    stale
}

/// The first key that is not strictly greater than its predecessor.
pub(crate) fn first_out_of_order(entries: &[(DateKey, MealRecord)]) -> Option<DateKey> {
    entries
        .windows(2)
        .find(|pair| pair[0].0 >= pair[1].0)
        .map(|pair| pair[1].0)
}
