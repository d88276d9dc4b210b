//! Handler for `GET /go?query=...`.

use axum::{
  extract::{Query, State},
  response::Html,
};
use relief_core::store::MessageStore;
use serde::Deserialize;

use crate::{AppState, error::Error, html};

#[derive(Debug, Deserialize)]
pub struct GoParams {
  #[serde(default)]
  pub query: Option<String>,
}

/// Classify the query and render every category with its flag. A missing
/// query is treated as empty.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<GoParams>,
) -> Result<Html<String>, Error>
where
  S: MessageStore + Clone + 'static,
{
  let query = params.query.unwrap_or_default();
  let prediction = state.classifier.predict(&query);
  tracing::debug!(flagged = ?prediction.flagged(), "classified query");
  Ok(Html(html::result_page(&query, &prediction)?))
}
