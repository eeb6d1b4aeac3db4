use crate::errors::ConfigError;
use std::{env, path::PathBuf, str::FromStr, time::Duration};
use tracing::info;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_CACHE_PATH: &str = "data/local_cache.json";
const DEFAULT_CAROUSEL_SECS: u64 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub cache_path: PathBuf,
    pub carousel_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let api_url = lookup("APP_API_URL")
            .map(|value| value.trim().trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let cache_path = lookup("APP_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_PATH));
        let carousel_secs = parse_or(&lookup, "APP_CAROUSEL_SECS", DEFAULT_CAROUSEL_SECS)?;

        Ok(Self {
            port,
            api_url,
            cache_path,
            carousel_interval: Duration::from_secs(carousel_secs.max(1)),
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
        None => {
            info!("{key} not set, using default");
            Ok(default)
        }
    }
}
