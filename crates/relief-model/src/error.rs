//! Error type for `relief-model`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("need at least {needed} rows to train, found {rows}")]
  NotEnoughRows { rows: usize, needed: usize },

  #[error("invalid training parameters: {0}")]
  InvalidParams(String),

  #[error("i/o error on {path:?}: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid model artifact: {0}")]
  InvalidArtifact(String),

  #[error("core error: {0}")]
  Core(#[from] relief_core::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
