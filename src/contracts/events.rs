use anyhow::Result;
use async_trait::async_trait;

use crate::giphy::Gif;

/// Emitted by the giphy client after a successful upstream fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum GifEvent {
  TrendingFetched(Vec<Gif>),
  SearchFetched { term: String, gifs: Vec<Gif> },
}

impl GifEvent {
  pub fn name(&self) -> &'static str {
    match self {
      GifEvent::TrendingFetched(_) => "giphy_trending_gifs_fetched",
      GifEvent::SearchFetched { .. } => "giphy_search_gifs_fetched",
    }
  }

  pub fn gifs(&self) -> &[Gif] {
    match self {
      GifEvent::TrendingFetched(gifs) => gifs,
      GifEvent::SearchFetched { gifs, .. } => gifs,
    }
  }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GifSubscriber: Send + Sync {
  /// Runs inline, before the fetch that produced `event` returns to its caller.
  async fn on_gifs_fetched(&self, event: &GifEvent) -> Result<()>;
}
