//! Rolling, date-indexed cache of a cafeteria's weekly menus.
//!
//! [`sync::SyncEngine`] walks upstream pages with a persisted [`cursor::Cursor`]
//! and merges what it finds into the [`store::MealStore`]; [`server`] exposes
//! the store read-only over HTTP.

pub mod clock;
pub mod config;
pub mod cursor;
pub mod fallback;
pub mod fetch;
pub mod lock;
pub mod models;
mod persist;
pub mod server;
pub mod store;
pub mod sync;
