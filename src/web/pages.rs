use axum::{
  extract::{Path, Query},
  http::StatusCode,
  response::Html,
  Extension,
};
use serde::Deserialize;
use tracing::error;

use super::AppState;
use crate::{contracts::catalog::ProductId, render, storefront, utils::sanitize_text_field};

#[derive(Debug, Deserialize)]
pub struct SearchPageParams {
  giphy_search: Option<String>,
}

#[tracing::instrument(name = "GET /gifs/trending", skip_all)]
pub async fn trending(Extension(state): Extension<AppState>) -> Html<String> {
  let gifs = state.giphy.fetch_trending().await;
  Html(render::document("Trending GIFs", &render::trending_page(&gifs)))
}

#[tracing::instrument(name = "GET /gifs/search", skip_all, fields(term = tracing::field::Empty))]
pub async fn search(
  Extension(state): Extension<AppState>,
  Query(params): Query<SearchPageParams>,
) -> Html<String> {
  let results = match params.giphy_search {
    None => None,
    Some(term) => {
      let term = sanitize_text_field(&term);
      tracing::Span::current().record("term", &term.as_str());
      Some(state.giphy.search_gifs(&term).await)
    }
  };

  Html(render::document(
    "Search GIFs",
    &render::search_page(results.as_deref()),
  ))
}

#[tracing::instrument(name = "GET /products", skip_all)]
pub async fn products(
  Extension(state): Extension<AppState>,
) -> Result<Html<String>, (StatusCode, String)> {
  let products: Vec<_> = state
    .catalog
    .list()
    .await
    .map_err(internal_error)?
    .into_iter()
    .filter(|product| product.is_listed())
    .collect();

  Ok(Html(render::document(
    "Products",
    &storefront::product_listing_html(&products),
  )))
}

#[tracing::instrument(name = "GET /products/:id", skip_all, fields(id = tracing::field::Empty))]
pub async fn product(
  Extension(state): Extension<AppState>,
  Path(id): Path<ProductId>,
) -> Result<Html<String>, (StatusCode, String)> {
  tracing::Span::current().record("id", &id);

  match state.catalog.get(id).await.map_err(internal_error)? {
    None => Err((StatusCode::NOT_FOUND, format!("product {} not found", id))),
    Some(product) => Ok(Html(render::document(
      product.name(),
      &storefront::product_page_html(&product),
    ))),
  }
}

fn internal_error(err: anyhow::Error) -> (StatusCode, String) {
  error!("catalog request failed. error={:?}", err);
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    String::from("Something went wrong"),
  )
}
