//! HTTP serving layer for the relief classifier.
//!
//! Exposes an axum [`Router`] with the HTML query pages and a JSON API,
//! backed by a loaded [`Classifier`] and, optionally, any [`MessageStore`]
//! for the dataset overview.

pub mod error;
pub mod handlers;
pub mod html;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;

use axum::{
  Router,
  routing::{get, post},
};
use relief_core::store::MessageStore;
use relief_model::Classifier;
use relief_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `RELIEF_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub model_path: PathBuf,
  /// SQLite file holding the cleaned messages; enables the overview tables.
  pub store_path: Option<PathBuf>,
  pub table:      String,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "0.0.0.0".to_string(),
      port:       3001,
      model_path: PathBuf::from("models/classifier.json"),
      store_path: None,
      table:      relief_store_sqlite::DEFAULT_TABLE.to_string(),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: MessageStore> {
  pub classifier: Arc<Classifier>,
  pub store:      Option<Arc<S>>,
}

/// Open the configured store and check that its message table is readable.
///
/// Neither a missing file nor a missing table is created.
pub async fn open_store(path: &Path, table: &str) -> anyhow::Result<SqliteStore> {
  let store = SqliteStore::open_existing(path, table)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))?;
  store
    .category_counts()
    .await
    .with_context(|| format!("store at {path:?} has no usable table {table:?}"))?;
  Ok(store)
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: MessageStore + Clone + 'static,
{
  Router::new()
    .route("/",             get(handlers::index::handler::<S>))
    .route("/index",        get(handlers::index::handler::<S>))
    .route("/go",           get(handlers::go::handler::<S>))
    .route("/api/classify", post(handlers::classify::handler::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
