//! Handler for `GET /` and `GET /index`.

use axum::{extract::State, response::Html};
use relief_core::store::MessageStore;

use crate::{AppState, error::Error, html};

pub async fn handler<S>(State(state): State<AppState<S>>) -> Result<Html<String>, Error>
where
  S: MessageStore + Clone + 'static,
{
  let overview = match &state.store {
    Some(store) => Some(overview(store.as_ref()).await?),
    None => None,
  };
  Ok(Html(html::index_page(&state.classifier, overview.as_ref())?))
}

async fn overview<S: MessageStore>(store: &S) -> Result<html::Overview, Error> {
  let store_err = |e: S::Error| Error::Store(Box::new(e));
  Ok(html::Overview {
    genres:     store.genre_counts().await.map_err(store_err)?,
    categories: store.category_counts().await.map_err(store_err)?,
  })
}
