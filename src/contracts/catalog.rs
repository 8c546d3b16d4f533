use anyhow::Result;
use async_trait::async_trait;

pub type ProductId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductStatus {
  Draft,
  Published,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogVisibility {
  Visible,
  Hidden,
}

/// A product that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
  pub name: String,
  pub slug: String,
  pub regular_price_cents: u64,
  pub description: String,
  pub short_description: String,
  pub visibility: CatalogVisibility,
  pub sold_individually: bool,
  pub status: ProductStatus,
  /// Rendered instead of a local image asset when set.
  pub external_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
  pub id: ProductId,
  pub details: NewProduct,
}

impl Product {
  pub fn name(&self) -> &str {
    &self.details.name
  }

  pub fn external_image_url(&self) -> Option<&str> {
    self.details.external_image_url.as_deref()
  }

  /// Published and visible products are the ones shown in listings.
  pub fn is_listed(&self) -> bool {
    self.details.status == ProductStatus::Published
      && self.details.visibility == CatalogVisibility::Visible
  }

  /// Price as a decimal string, e.g. `10.00`.
  pub fn formatted_price(&self) -> String {
    format!(
      "{}.{:02}",
      self.details.regular_price_cents / 100,
      self.details.regular_price_cents % 100
    )
  }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Catalog: Send + Sync {
  /// Returns the first product whose name is exactly `title`.
  async fn find_by_title(&self, title: &str) -> Result<Option<Product>>;
  async fn create(&self, product: NewProduct) -> Result<Product>;
  async fn get(&self, id: ProductId) -> Result<Option<Product>>;
  async fn list(&self) -> Result<Vec<Product>>;
}
