//! SQLite backend for the Timbro time-accounting store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Records are kept as JSON documents and
//! merge-written with SQLite's `json_patch`.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
