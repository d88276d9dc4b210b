//! Error type for `relief-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] relief_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("invalid table name: {0:?}")]
  InvalidTableName(String),

  #[error("table {0:?} does not exist")]
  TableNotFound(String),

  /// The table exists but does not start with `id, message, genre` followed
  /// by at least one category column.
  #[error("table {table:?} has an unexpected layout: {detail}")]
  UnexpectedLayout { table: String, detail: String },

  #[error("row {id}: category {category:?} holds {value}, expected 0 or 1")]
  InvalidFlag {
    id:       i64,
    category: String,
    value:    i64,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
