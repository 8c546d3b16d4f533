use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

mod catalog_sync;
mod config;
mod contracts;
mod giphy;
mod infra;
mod render;
mod storefront;
mod telemetry;
mod utils;
mod web;

use crate::{
  catalog_sync::CatalogSync,
  config::{CacheBackend, Config},
  contracts::{cache::Cache, catalog::Catalog},
  giphy::GiphyClient,
  infra::{
    cache::{memory::MemoryCache, redis::RedisCache},
    catalog::memory::MemoryCatalog,
    http::client::ReqwestHttpClient,
  },
};

#[tokio::main]
async fn main() -> Result<()> {
  // A missing .env file is fine, the variables may come from the environment.
  let _ = dotenv::dotenv();

  let _guard = telemetry::init()?;

  let config = Config::from_env().context("unable to load configuration")?;

  let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));

  let app = web::router(build_state(config)?);

  info!("starting http server. addr={}", addr);

  axum::Server::bind(&addr)
    .serve(app.into_make_service())
    .await?;

  Ok(())
}

/// Wires the giphy client, its cache and the catalog sync together.
fn build_state(config: Config) -> Result<web::AppState> {
  let cache: Arc<dyn Cache> = match config.cache {
    CacheBackend::Memory { max_entries } => {
      Arc::new(MemoryCache::with_max_capacity(max_entries))
    }
    CacheBackend::Redis(redis_config) => Arc::new(RedisCache::new(redis_config)?),
  };

  let catalog: Arc<dyn Catalog> = Arc::new(MemoryCatalog::new());

  let mut giphy = GiphyClient::new(config.giphy, Arc::new(ReqwestHttpClient::new()), cache);
  giphy.subscribe(Arc::new(CatalogSync::new(Arc::clone(&catalog))));

  Ok(web::AppState {
    giphy: Arc::new(giphy),
    catalog,
    assets_dir: config.assets_dir,
  })
}
