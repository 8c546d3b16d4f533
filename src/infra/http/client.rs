use crate::contracts::{self, GetOptions, GetResponse};
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(10);

pub struct ReqwestHttpClient {
  client: reqwest::Client,
}

impl ReqwestHttpClient {
  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
    }
  }
}

/// `url` with the query pairs from `options` appended.
fn request_url(url: &str, options: &GetOptions) -> Result<reqwest::Url> {
  let url = reqwest::Url::parse_with_params(url, options.query.iter())?;
  Ok(url)
}

#[async_trait]
impl contracts::HttpClient for ReqwestHttpClient {
  #[tracing::instrument(name = "ReqwestHttpClient::get", skip_all)]
  async fn get(&self, url: &str, options: GetOptions) -> Result<GetResponse> {
    let body = self
      .client
      .get(request_url(url, &options)?)
      .timeout(TIMEOUT)
      .send()
      .await?
      .error_for_status()?
      .bytes()
      .await?;

    Ok(GetResponse { body })
  }
}
