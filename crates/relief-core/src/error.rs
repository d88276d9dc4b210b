//! Error types for `relief-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("category vocabulary is empty")]
  EmptyVocabulary,

  #[error("duplicate category name: {0:?}")]
  DuplicateCategory(String),

  #[error("category name {0:?} clashes with a message column")]
  ReservedCategory(String),

  #[error("invalid category name: {0:?}")]
  InvalidCategoryName(String),

  #[error("record {id} carries {found} category flags, expected {expected}")]
  FlagCountMismatch {
    id:       i64,
    expected: usize,
    found:    usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
