//! SQLite backend for the vigil incident store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. The optimistic-concurrency
//! contract of `conditional_update_status` rides on a single version-guarded
//! UPDATE statement.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
