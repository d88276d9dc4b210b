//! Error type for `relief-etl`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to open {path:?}: {source}")]
  Open {
    path:   PathBuf,
    #[source]
    source: csv::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("message {id}: malformed categories cell: {detail}")]
  MalformedCategories { id: i64, detail: String },

  #[error("message {id}: categories differ from the vocabulary: {detail}")]
  InconsistentVocabulary { id: i64, detail: String },

  #[error("no message matched a category row; nothing to ingest")]
  NothingMerged,

  #[error("core error: {0}")]
  Core(#[from] relief_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
