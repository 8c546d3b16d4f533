use std::time::Duration;

use crate::contracts;
use anyhow::Result;
use async_trait::async_trait;
use redis::AsyncCommands;

#[derive(Debug)]
pub struct Config {
  pub host: String,
  pub port: u16,
  pub password: String,
}

pub struct RedisCache {
  client: redis::Client,
}

impl RedisCache {
  #[tracing::instrument(skip_all, fields(host = %config.host, port = config.port))]
  pub fn new(config: Config) -> Result<Self> {
    let password = if config.password.is_empty() {
      None
    } else {
      Some(config.password)
    };

    let client = redis::Client::open(redis::ConnectionInfo {
      addr: redis::ConnectionAddr::Tcp(config.host, config.port),
      redis: redis::RedisConnectionInfo {
        db: 0,
        username: None,
        password,
      },
    })?;

    Ok(Self { client })
  }
}

#[async_trait]
impl contracts::cache::Cache for RedisCache {
  #[tracing::instrument(name = "RedisCache::get", skip_all, fields(key = %String::from_utf8_lossy(key)))]
  async fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
    let value: Option<Vec<u8>> = self.client.get_async_connection().await?.get(key).await?;
    Ok(value)
  }

  #[tracing::instrument(name = "RedisCache::put", skip_all, fields(key = %String::from_utf8_lossy(&key)))]
  async fn put(&self, key: Vec<u8>, value: Vec<u8>, ttl: Duration) -> Result<()> {
    // SETEX rejects a zero expiration.
    let seconds = ttl.as_secs().max(1) as usize;

    self
      .client
      .get_async_connection()
      .await?
      .set_ex::<_, _, ()>(key, value, seconds)
      .await?;
    Ok(())
  }
}
