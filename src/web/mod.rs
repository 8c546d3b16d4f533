//! Http server: json endpoints, gif pages, the product storefront and the
//! stylesheet.

use std::{path::PathBuf, sync::Arc};

use axum::{
  body::{boxed, Body, BoxBody},
  http::{Request, Response, StatusCode, Uri},
  routing::get,
  Extension, Router,
};
use tower::util::ServiceExt;
use tower_http::services::ServeDir;

use crate::{contracts::catalog::Catalog, giphy::GiphyClient};

mod pages;
mod rest;

#[derive(Clone)]
pub struct AppState {
  pub giphy: Arc<GiphyClient>,
  pub catalog: Arc<dyn Catalog>,
  /// Directory served under /static.
  pub assets_dir: PathBuf,
}

pub fn router(state: AppState) -> Router {
  Router::new()
    .route("/giphy/v1/trending", get(rest::trending))
    .route("/giphy/v1/search", get(rest::search))
    .route("/gifs/trending", get(pages::trending))
    .route("/gifs/search", get(pages::search))
    .route("/products", get(pages::products))
    .route("/products/:id", get(pages::product))
    .nest("/static", get(static_file))
    .layer(Extension(state))
}

#[tracing::instrument(name = "GET /static", skip_all, fields(uri = ?uri))]
async fn static_file(
  Extension(state): Extension<AppState>,
  uri: Uri,
) -> Result<Response<BoxBody>, (StatusCode, String)> {
  let req = Request::builder()
    .uri(uri)
    .body(Body::empty())
    .map_err(|err| (StatusCode::BAD_REQUEST, format!("invalid uri: {}", err)))?;

  // `ServeDir` implements `tower::Service` so we can call it with `tower::ServiceExt::oneshot`
  match ServeDir::new(&state.assets_dir).oneshot(req).await {
    Ok(res) => Ok(res.map(boxed)),
    Err(err) => Err((
      StatusCode::INTERNAL_SERVER_ERROR,
      format!("Something went wrong: {}", err),
    )),
  }
}
