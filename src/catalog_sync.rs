//! Mirrors fetched gifs into the product catalog.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{info, warn};

use crate::{
  contracts::{
    catalog::{Catalog, CatalogVisibility, NewProduct, ProductStatus},
    events::{GifEvent, GifSubscriber},
  },
  giphy::Gif,
  utils::slugify,
};

pub const GIF_PRICE_CENTS: u64 = 1000;
pub const GIF_DESCRIPTION: &str = "Buy this GIF from Giphy.";

/// Creates a product for every fetched gif whose title isn't in the catalog yet.
///
/// The title lookup and the insert are separate calls, two syncs of the same
/// gif running at the same time can both create a product.
pub struct CatalogSync {
  catalog: Arc<dyn Catalog>,
}

impl CatalogSync {
  pub fn new(catalog: Arc<dyn Catalog>) -> Self {
    Self { catalog }
  }

  #[tracing::instrument(name = "CatalogSync::sync", skip_all, fields(gifs = gifs.len()))]
  pub async fn sync(&self, gifs: &[Gif]) -> Result<()> {
    for gif in gifs.iter() {
      let title = gif.title();

      if title.is_empty() {
        warn!("skipping gif without a title. id={:?}", gif.id);
        continue;
      }

      if self.catalog.find_by_title(title).await?.is_some() {
        continue;
      }

      let product = self.catalog.create(new_product(gif)).await?;

      info!("created product from gif. product_id={} title={}", product.id, title);
    }

    Ok(())
  }
}

fn new_product(gif: &Gif) -> NewProduct {
  NewProduct {
    name: gif.title().to_owned(),
    slug: slugify(gif.title()),
    regular_price_cents: GIF_PRICE_CENTS,
    description: GIF_DESCRIPTION.to_owned(),
    short_description: gif.title().to_owned(),
    visibility: CatalogVisibility::Visible,
    sold_individually: true,
    status: ProductStatus::Published,
    external_image_url: gif.display_url().map(String::from),
  }
}

#[async_trait]
impl GifSubscriber for CatalogSync {
  async fn on_gifs_fetched(&self, event: &GifEvent) -> Result<()> {
    self.sync(event.gifs()).await
  }
}
