//! Handler for `POST /api/classify`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  response::{IntoResponse, Response},
};
use relief_core::{prediction::CategoryLabel, store::MessageStore};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::Error};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
  pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse<'a> {
  pub query:      &'a str,
  pub flagged:    Vec<&'a str>,
  pub categories: Vec<CategoryLabel<'a>>,
}

pub async fn handler<S>(
  State(state): State<AppState<S>>,
  payload: Result<Json<ClassifyRequest>, JsonRejection>,
) -> Result<Response, Error>
where
  S: MessageStore + Clone + 'static,
{
  let Json(request) = payload.map_err(|rejection| Error::BadRequest(rejection.body_text()))?;
  let prediction = state.classifier.predict(&request.text);
  let body = ClassifyResponse {
    query:      &request.text,
    flagged:    prediction.flagged(),
    categories: prediction.labels(),
  };
  Ok(Json(body).into_response())
}
