use crate::contracts::catalog::{self, NewProduct, Product, ProductId};
use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Catalog that lives as long as the process. Ids start at 1.
pub struct MemoryCatalog {
  products: RwLock<Vec<Product>>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self {
      products: RwLock::new(Vec::new()),
    }
  }
}

#[async_trait]
impl catalog::Catalog for MemoryCatalog {
  #[tracing::instrument(name = "MemoryCatalog::find_by_title", skip_all, fields(title = %title))]
  async fn find_by_title(&self, title: &str) -> Result<Option<Product>> {
    let products = self.products.read().await;
    Ok(products.iter().find(|p| p.name() == title).cloned())
  }

  #[tracing::instrument(name = "MemoryCatalog::create", skip_all, fields(name = %product.name))]
  async fn create(&self, product: NewProduct) -> Result<Product> {
    let mut products = self.products.write().await;

    let product = Product {
      id: products.len() as ProductId + 1,
      details: product,
    };

    products.push(product.clone());

    Ok(product)
  }

  #[tracing::instrument(name = "MemoryCatalog::get", skip_all, fields(id = id))]
  async fn get(&self, id: ProductId) -> Result<Option<Product>> {
    let products = self.products.read().await;
    Ok(products.iter().find(|p| p.id == id).cloned())
  }

  #[tracing::instrument(name = "MemoryCatalog::list", skip_all)]
  async fn list(&self) -> Result<Vec<Product>> {
    Ok(self.products.read().await.clone())
  }
}
