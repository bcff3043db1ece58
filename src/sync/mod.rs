//! Keeps the meal store up to date with the upstream weekly pages.
//!
//! [`SyncEngine`] runs one fetch-and-merge cycle at a time; [`run_scheduler`]
//! calls it on a fixed interval.

pub mod engine;
pub mod scheduler;

pub use engine::{SyncEngine, SyncError, SyncOptions, SyncOutcome, SyncReport};
pub use scheduler::{run_scheduler, DEFAULT_SYNC_INTERVAL};
