use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{
  giphy,
  infra::cache::{memory::DEFAULT_MAX_ENTRIES, redis},
  utils::{env_key, env_key_or},
};

pub const DEFAULT_GIPHY_API_BASE_URL: &str = "https://api.giphy.com/v1/gifs";

#[derive(Debug)]
pub enum CacheBackend {
  Memory { max_entries: u64 },
  Redis(redis::Config),
}

#[derive(Debug)]
pub struct Config {
  pub giphy: giphy::Config,
  pub http_port: u16,
  pub cache: CacheBackend,
  pub assets_dir: PathBuf,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
  #[error("GIPHY_API_KEY must not be empty")]
  EmptyApiKey,
  #[error("unknown cache backend: {0}. expected memory or redis")]
  UnknownCacheBackend(String),
}

impl Config {
  /// Reads the configuration from the environment. Fails when GIPHY_API_KEY is missing.
  pub fn from_env() -> Result<Self> {
    let api_key = env_key("GIPHY_API_KEY")?;
    if api_key.trim().is_empty() {
      return Err(ConfigError::EmptyApiKey.into());
    }

    let http_port = env_key_or("HTTP_PORT", "3000")
      .parse()
      .context("HTTP_PORT must be a port number")?;

    let cache = match env_key_or("CACHE_BACKEND", "memory").as_str() {
      "memory" => CacheBackend::Memory {
        max_entries: env_key_or("CACHE_MAX_ENTRIES", &DEFAULT_MAX_ENTRIES.to_string())
          .parse()
          .context("CACHE_MAX_ENTRIES must be a positive number")?,
      },
      "redis" => CacheBackend::Redis(redis::Config {
        host: env_key_or("REDIS_HOST", "127.0.0.1"),
        port: env_key_or("REDIS_PORT", "6379")
          .parse()
          .context("REDIS_PORT must be a port number")?,
        password: env_key_or("REDIS_PASSWORD", ""),
      }),
      other => return Err(ConfigError::UnknownCacheBackend(other.to_owned()).into()),
    };

    Ok(Self {
      giphy: giphy::Config {
        api_key,
        base_url: env_key_or("GIPHY_API_BASE_URL", DEFAULT_GIPHY_API_BASE_URL),
      },
      http_port,
      cache,
      assets_dir: PathBuf::from(env_key_or("ASSETS_DIR", "./assets")),
    })
  }
}
