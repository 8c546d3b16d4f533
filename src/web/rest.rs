//! Json endpoints. Both answer 200, with an empty array when giphy is unreachable.

use axum::{extract::Query, Extension, Json};
use serde::Deserialize;

use super::AppState;
use crate::{giphy::Gif, utils::sanitize_text_field};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  term: String,
}

#[tracing::instrument(name = "GET /giphy/v1/trending", skip_all)]
pub async fn trending(Extension(state): Extension<AppState>) -> Json<Vec<Gif>> {
  Json(state.giphy.fetch_trending().await)
}

#[tracing::instrument(name = "GET /giphy/v1/search", skip_all, fields(term = tracing::field::Empty))]
pub async fn search(
  Extension(state): Extension<AppState>,
  Query(params): Query<SearchParams>,
) -> Json<Vec<Gif>> {
  let term = sanitize_text_field(&params.term);
  tracing::Span::current().record("term", &term.as_str());
  Json(state.giphy.search_gifs(&term).await)
}
