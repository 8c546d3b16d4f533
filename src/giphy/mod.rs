//! Caching client for the giphy api.
//!
//! Every lookup goes to the cache first. Only a cache miss reaches giphy, and
//! only a successful giphy response is written back to the cache and announced
//! to the subscribers.

use std::{sync::Arc, time::Duration};

use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::contracts::{
  self,
  cache::Cache,
  events::{GifEvent, GifSubscriber},
  GetOptions,
};

mod gif;

pub use gif::Gif;

pub const TRENDING_CACHE_KEY: &str = "trending_gifs";
pub const SEARCH_CACHE_KEY_PREFIX: &str = "search_gifs_";
pub const CACHE_TTL: Duration = Duration::from_secs(60 * 60);
/// Number of gifs requested from giphy per query.
pub const RESULT_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub struct Config {
  pub api_key: String,
  /// e.g. https://api.giphy.com/v1/gifs
  pub base_url: String,
}

#[derive(Debug, thiserror::Error)]
enum FetchError {
  #[error("request to giphy failed: {0:?}")]
  Transport(anyhow::Error),
  #[error("giphy response is not valid json: {0}")]
  InvalidJson(serde_json::Error),
  #[error("giphy response has no data array")]
  MissingData,
}

#[derive(Debug, Deserialize)]
struct Envelope {
  #[serde(default)]
  data: Option<Value>,
}

#[derive(Debug, Clone, Copy)]
enum Query<'a> {
  Trending,
  Search(&'a str),
}

impl<'a> Query<'a> {
  /// Search terms are used as is, "Cat" and "cat" are different entries.
  fn cache_key(&self) -> String {
    match self {
      Query::Trending => TRENDING_CACHE_KEY.to_owned(),
      Query::Search(term) => format!("{SEARCH_CACHE_KEY_PREFIX}{term}"),
    }
  }

  fn path(&self) -> &'static str {
    match self {
      Query::Trending => "trending",
      Query::Search(_) => "search",
    }
  }

  fn event(&self, gifs: Vec<Gif>) -> GifEvent {
    match self {
      Query::Trending => GifEvent::TrendingFetched(gifs),
      Query::Search(term) => GifEvent::SearchFetched {
        term: (*term).to_owned(),
        gifs,
      },
    }
  }
}

pub struct GiphyClient {
  config: Config,
  http_client: Arc<dyn contracts::HttpClient>,
  cache: Arc<dyn Cache>,
  subscribers: Vec<Arc<dyn GifSubscriber>>,
}

impl GiphyClient {
  pub fn new(
    config: Config,
    http_client: Arc<dyn contracts::HttpClient>,
    cache: Arc<dyn Cache>,
  ) -> Self {
    Self {
      config,
      http_client,
      cache,
      subscribers: Vec::new(),
    }
  }

  /// Subscribers are called in the order they were added.
  pub fn subscribe(&mut self, subscriber: Arc<dyn GifSubscriber>) {
    self.subscribers.push(subscriber);
  }

  /// Returns the trending gifs. Returns an empty list when giphy can't be reached.
  #[tracing::instrument(name = "GiphyClient::fetch_trending", skip_all)]
  pub async fn fetch_trending(&self) -> Vec<Gif> {
    self.resolve(Query::Trending).await
  }

  /// Returns the gifs matching `term`. Returns an empty list when giphy can't be reached.
  #[tracing::instrument(name = "GiphyClient::search_gifs", skip_all, fields(term = %term))]
  pub async fn search_gifs(&self, term: &str) -> Vec<Gif> {
    self.resolve(Query::Search(term)).await
  }

  async fn resolve(&self, query: Query<'_>) -> Vec<Gif> {
    let key = query.cache_key();

    if let Some(gifs) = self.cached(&key).await {
      info!("cache hit. key={} gifs={}", key, gifs.len());
      return gifs;
    }

    info!("cache miss. key={}", key);

    let gifs = match self.fetch(query).await {
      Ok(gifs) => gifs,
      Err(err) => {
        warn!("unable to fetch gifs, returning no results. error={}", err);
        return Vec::new();
      }
    };

    self.store(key, &gifs).await;

    self.notify(query.event(gifs.clone())).await;

    gifs
  }

  /// A cache that errors or holds something unreadable counts as a miss.
  async fn cached(&self, key: &str) -> Option<Vec<Gif>> {
    let bytes = match self.cache.get(key.as_bytes()).await {
      Ok(bytes) => bytes?,
      Err(err) => {
        warn!("cache read failed. key={} error={:?}", key, err);
        return None;
      }
    };

    match serde_json::from_slice(&bytes) {
      Ok(gifs) => Some(gifs),
      Err(err) => {
        warn!("ignoring unreadable cache entry. key={} error={}", key, err);
        None
      }
    }
  }

  async fn store(&self, key: String, gifs: &[Gif]) {
    let value = match serde_json::to_vec(gifs) {
      Ok(value) => value,
      Err(err) => {
        error!("unable to serialize gifs. key={} error={}", key, err);
        return;
      }
    };

    if let Err(err) = self.cache.put(key.clone().into_bytes(), value, CACHE_TTL).await {
      warn!("cache write failed. key={} error={:?}", key, err);
    }
  }

  async fn fetch(&self, query: Query<'_>) -> Result<Vec<Gif>, FetchError> {
    let url = format!(
      "{}/{}",
      self.config.base_url.trim_end_matches('/'),
      query.path()
    );

    let response = self
      .http_client
      .get(&url, self.request_options(query))
      .await
      .map_err(FetchError::Transport)?;

    let gifs = parse_gifs(&response.body)?;

    info!("fetched gifs from giphy. endpoint={} gifs={}", query.path(), gifs.len());

    Ok(gifs)
  }

  /// The api key travels in the query string together with the search params.
  fn request_options(&self, query: Query<'_>) -> GetOptions {
    let mut params = vec![("api_key".to_owned(), self.config.api_key.clone())];
    if let Query::Search(term) = query {
      params.push(("q".to_owned(), term.to_owned()));
    }
    params.push(("limit".to_owned(), RESULT_LIMIT.to_string()));

    GetOptions { query: params }
  }

  async fn notify(&self, event: GifEvent) {
    for subscriber in self.subscribers.iter() {
      if let Err(err) = subscriber.on_gifs_fetched(&event).await {
        error!("gif subscriber failed. event={} error={:?}", event.name(), err);
      }
    }
  }
}

/// Reads the `data` array out of a giphy response body.
/// Entries that aren't gif objects are skipped.
fn parse_gifs(body: &[u8]) -> Result<Vec<Gif>, FetchError> {
  let envelope: Envelope = serde_json::from_slice(body).map_err(FetchError::InvalidJson)?;

  let entries = match envelope.data {
    Some(Value::Array(entries)) => entries,
    _ => return Err(FetchError::MissingData),
  };

  let mut gifs = Vec::with_capacity(entries.len());

  for entry in entries.into_iter() {
    match serde_json::from_value::<Gif>(entry) {
      Ok(gif) => gifs.push(gif),
      Err(err) => warn!("skipping malformed gif. error={}", err),
    }
  }

  Ok(gifs)
}

#[cfg(test)]
mod tests {
  use std::sync::Mutex;

  use bytes::Bytes;

  use super::*;
  use crate::{
    contracts::{
      cache::MockCache, events::MockGifSubscriber, GetResponse, MockHttpClient,
    },
    infra::cache::memory::MemoryCache,
  };

  const FUNNY_CAT_BODY: &str =
    r#"{"data":[{"title":"Funny Cat","images":{"fixed_height":{"url":"http://x/cat.gif"}}}]}"#;

  fn config() -> Config {
    Config {
      api_key: "key".to_owned(),
      base_url: "https://api.giphy.com/v1/gifs".to_owned(),
    }
  }

  fn funny_cat() -> Vec<Gif> {
    vec![Gif::new("Funny Cat", "http://x/cat.gif")]
  }

  fn ok_response(body: &'static str) -> anyhow::Result<GetResponse> {
    Ok(GetResponse {
      body: Bytes::from_static(body.as_bytes()),
    })
  }

  /// Http client that answers every request with `body` and records the urls,
  /// query string included.
  fn http_client_returning(
    body: &'static str,
    times: usize,
  ) -> (MockHttpClient, Arc<Mutex<Vec<String>>>) {
    let urls = Arc::new(Mutex::new(Vec::new()));
    let recorded = Arc::clone(&urls);

    let mut http_client = MockHttpClient::new();
    http_client
      .expect_get()
      .times(times)
      .returning(move |url, options| {
        let url = reqwest::Url::parse_with_params(url, options.query.iter()).unwrap();
        recorded.lock().unwrap().push(url.to_string());
        ok_response(body)
      });

    (http_client, urls)
  }

  fn subscriber_expecting(expected: GifEvent, times: usize) -> Arc<MockGifSubscriber> {
    let mut subscriber = MockGifSubscriber::new();
    subscriber
      .expect_on_gifs_fetched()
      .withf(move |event| *event == expected)
      .times(times)
      .returning(|_| Ok(()));
    Arc::new(subscriber)
  }

  async fn cached_gifs(cache: &MemoryCache, key: &str) -> Option<Vec<Gif>> {
    contracts::cache::Cache::get(cache, key.as_bytes())
      .await
      .unwrap()
      .map(|bytes| serde_json::from_slice(&bytes).unwrap())
  }

  #[tokio::test]
  async fn trending_cache_miss_fetches_stores_and_notifies() {
    let (http_client, urls) = http_client_returning(FUNNY_CAT_BODY, 1);
    let cache = Arc::new(MemoryCache::new());

    let mut client = GiphyClient::new(config(), Arc::new(http_client), cache.clone());
    client.subscribe(subscriber_expecting(GifEvent::TrendingFetched(funny_cat()), 1));

    assert_eq!(funny_cat(), client.fetch_trending().await);
    assert_eq!(Some(funny_cat()), cached_gifs(&cache, TRENDING_CACHE_KEY).await);
    assert_eq!(
      vec!["https://api.giphy.com/v1/gifs/trending?api_key=key&limit=10".to_owned()],
      *urls.lock().unwrap()
    );
  }

  #[tokio::test]
  async fn repeated_trending_call_is_served_from_cache() {
    let (http_client, _urls) = http_client_returning(FUNNY_CAT_BODY, 1);

    let mut client = GiphyClient::new(
      config(),
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );
    client.subscribe(subscriber_expecting(GifEvent::TrendingFetched(funny_cat()), 1));

    assert_eq!(funny_cat(), client.fetch_trending().await);
    assert_eq!(funny_cat(), client.fetch_trending().await);
  }

  #[tokio::test]
  async fn cached_empty_list_is_a_hit() -> Result<(), Box<dyn std::error::Error>> {
    let mut http_client = MockHttpClient::new();
    http_client.expect_get().never();

    let mut subscriber = MockGifSubscriber::new();
    subscriber.expect_on_gifs_fetched().never();

    let cache = Arc::new(MemoryCache::new());
    contracts::cache::Cache::put(
      cache.as_ref(),
      b"search_gifs_nothing".to_vec(),
      b"[]".to_vec(),
      CACHE_TTL,
    )
    .await?;

    let mut client = GiphyClient::new(config(), Arc::new(http_client), cache);
    client.subscribe(Arc::new(subscriber));

    assert!(client.search_gifs("nothing").await.is_empty());

    Ok(())
  }

  #[tokio::test]
  async fn search_transport_failure_returns_nothing_and_caches_nothing() {
    let mut http_client = MockHttpClient::new();
    http_client
      .expect_get()
      .times(1)
      .returning(|_, _| Err(anyhow::anyhow!("connection refused")));

    let mut subscriber = MockGifSubscriber::new();
    subscriber.expect_on_gifs_fetched().never();

    let cache = Arc::new(MemoryCache::new());
    let mut client = GiphyClient::new(config(), Arc::new(http_client), cache.clone());
    client.subscribe(Arc::new(subscriber));

    assert!(client.search_gifs("dog").await.is_empty());
    assert_eq!(None, cached_gifs(&cache, "search_gifs_dog").await);
  }

  #[tokio::test]
  async fn failures_are_retried_on_the_next_call() {
    let mut http_client = MockHttpClient::new();
    let mut sequence = mockall::Sequence::new();
    http_client
      .expect_get()
      .times(1)
      .in_sequence(&mut sequence)
      .returning(|_, _| Err(anyhow::anyhow!("connection refused")));
    http_client
      .expect_get()
      .times(1)
      .in_sequence(&mut sequence)
      .returning(|_, _| ok_response(FUNNY_CAT_BODY));

    let client = GiphyClient::new(
      config(),
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );

    assert!(client.fetch_trending().await.is_empty());
    assert_eq!(funny_cat(), client.fetch_trending().await);
  }

  #[tokio::test(start_paused = true)]
  async fn trending_is_fetched_again_after_the_entry_expires() {
    let (http_client, _urls) = http_client_returning(FUNNY_CAT_BODY, 2);

    let mut client = GiphyClient::new(
      config(),
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );
    client.subscribe(subscriber_expecting(GifEvent::TrendingFetched(funny_cat()), 2));

    assert_eq!(funny_cat(), client.fetch_trending().await);

    tokio::time::advance(CACHE_TTL - Duration::from_secs(1)).await;
    assert_eq!(funny_cat(), client.fetch_trending().await);

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(funny_cat(), client.fetch_trending().await);
  }

  #[tokio::test]
  async fn search_cache_keys_are_case_sensitive() {
    let (http_client, urls) = http_client_returning(FUNNY_CAT_BODY, 2);
    let cache = Arc::new(MemoryCache::new());

    let client = GiphyClient::new(config(), Arc::new(http_client), cache.clone());

    client.search_gifs("cat").await;
    client.search_gifs("Cat").await;
    client.search_gifs("cat").await;

    assert_eq!(Some(funny_cat()), cached_gifs(&cache, "search_gifs_cat").await);
    assert_eq!(Some(funny_cat()), cached_gifs(&cache, "search_gifs_Cat").await);
    assert_eq!(None, cached_gifs(&cache, TRENDING_CACHE_KEY).await);
    assert_eq!(
      vec![
        "https://api.giphy.com/v1/gifs/search?api_key=key&q=cat&limit=10".to_owned(),
        "https://api.giphy.com/v1/gifs/search?api_key=key&q=Cat&limit=10".to_owned(),
      ],
      *urls.lock().unwrap()
    );
  }

  #[tokio::test]
  async fn search_escapes_the_term_and_emits_search_event() {
    let (http_client, urls) = http_client_returning(FUNNY_CAT_BODY, 1);

    let mut client = GiphyClient::new(
      Config {
        api_key: "key".to_owned(),
        base_url: "http://localhost:9999/v1/gifs/".to_owned(),
      },
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );
    client.subscribe(subscriber_expecting(
      GifEvent::SearchFetched {
        term: "funny cat&dog".to_owned(),
        gifs: funny_cat(),
      },
      1,
    ));

    assert_eq!(funny_cat(), client.search_gifs("funny cat&dog").await);
    assert_eq!(
      vec!["http://localhost:9999/v1/gifs/search?api_key=key&q=funny+cat%26dog&limit=10".to_owned()],
      *urls.lock().unwrap()
    );
  }

  #[tokio::test]
  async fn malformed_bodies_return_nothing_and_are_not_cached() {
    let bodies = vec!["not json", "{}", r#"{"data":null}"#, r#"{"data":{"title":"x"}}"#];

    for body in bodies {
      let (http_client, _urls) = http_client_returning(body, 1);

      let mut subscriber = MockGifSubscriber::new();
      subscriber.expect_on_gifs_fetched().never();

      let cache = Arc::new(MemoryCache::new());
      let mut client = GiphyClient::new(config(), Arc::new(http_client), cache.clone());
      client.subscribe(Arc::new(subscriber));

      assert!(client.fetch_trending().await.is_empty(), "body={}", body);
      assert_eq!(None, cached_gifs(&cache, TRENDING_CACHE_KEY).await, "body={}", body);
    }
  }

  #[tokio::test]
  async fn empty_data_is_cached() {
    let (http_client, _urls) = http_client_returning(r#"{"data":[]}"#, 1);
    let cache = Arc::new(MemoryCache::new());

    let mut client = GiphyClient::new(config(), Arc::new(http_client), cache.clone());
    client.subscribe(subscriber_expecting(GifEvent::TrendingFetched(vec![]), 1));

    assert!(client.fetch_trending().await.is_empty());
    assert!(client.fetch_trending().await.is_empty());
    assert_eq!(Some(vec![]), cached_gifs(&cache, TRENDING_CACHE_KEY).await);
  }

  #[tokio::test]
  async fn skips_entries_that_are_not_gifs() {
    let (http_client, _urls) = http_client_returning(
      r#"{"data":[1,{"title":"Funny Cat","images":{"fixed_height":{"url":"http://x/cat.gif"}}},{"title":5}]}"#,
      1,
    );

    let client = GiphyClient::new(
      config(),
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );

    assert_eq!(funny_cat(), client.fetch_trending().await);
  }

  #[tokio::test]
  async fn cache_errors_fall_back_to_giphy() {
    let (http_client, _urls) = http_client_returning(FUNNY_CAT_BODY, 1);

    let mut cache = MockCache::new();
    cache
      .expect_get()
      .times(1)
      .returning(|_| Err(anyhow::anyhow!("connection reset")));
    cache
      .expect_put()
      .withf(|key, _, ttl| key == b"trending_gifs" && *ttl == CACHE_TTL)
      .times(1)
      .returning(|_, _, _| Err(anyhow::anyhow!("connection reset")));

    let mut client = GiphyClient::new(config(), Arc::new(http_client), Arc::new(cache));
    client.subscribe(subscriber_expecting(GifEvent::TrendingFetched(funny_cat()), 1));

    assert_eq!(funny_cat(), client.fetch_trending().await);
  }

  #[tokio::test]
  async fn failing_subscriber_does_not_stop_delivery() {
    let (http_client, _urls) = http_client_returning(FUNNY_CAT_BODY, 1);

    let order = Arc::new(Mutex::new(Vec::new()));

    let mut first = MockGifSubscriber::new();
    let first_order = Arc::clone(&order);
    first.expect_on_gifs_fetched().times(1).returning(move |_| {
      first_order.lock().unwrap().push("first");
      Err(anyhow::anyhow!("catalog unavailable"))
    });

    let mut second = MockGifSubscriber::new();
    let second_order = Arc::clone(&order);
    second.expect_on_gifs_fetched().times(1).returning(move |_| {
      second_order.lock().unwrap().push("second");
      Ok(())
    });

    let mut client = GiphyClient::new(
      config(),
      Arc::new(http_client),
      Arc::new(MemoryCache::new()),
    );
    client.subscribe(Arc::new(first));
    client.subscribe(Arc::new(second));

    assert_eq!(funny_cat(), client.fetch_trending().await);
    assert_eq!(vec!["first", "second"], *order.lock().unwrap());
  }
}
