//! SQLite backend for the cleaned message table.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use schema::DEFAULT_TABLE;
pub use store::SqliteStore;
