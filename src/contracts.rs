use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

pub mod cache;
pub mod catalog;
pub mod events;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GetOptions {
  /// Appended to the url, form encoded.
  pub query: Vec<(String, String)>,
}

#[derive(Debug)]
pub struct GetResponse {
  pub body: Bytes,
}

/// Outbound http. Non-2xx responses are returned as errors.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
  async fn get(&self, url: &str, options: GetOptions) -> Result<GetResponse>;
}
