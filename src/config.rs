use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_TRANSLATE_API_URL: &str = "https://translate.googleapis.com";

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // Storage
    pub database_url: String,
    pub database_max_connections: u32,
    pub redis_url: Option<String>,
    pub cache_ttl: Duration,

    // Translation
    pub translate_api_url: String,
    pub translation_pacing: Duration,

    // Admin
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: parse_or("PORT", DEFAULT_PORT),

            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            database_max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 5),
            redis_url: non_empty("REDIS_URL"),
            // Redis cannot expire a key after 0s
            cache_ttl: Duration::from_secs(parse_or::<u64>("FAQ_CACHE_TTL_SECS", 3600).max(1)),

            translate_api_url: non_empty("TRANSLATE_API_URL")
                .unwrap_or_else(|| DEFAULT_TRANSLATE_API_URL.to_string()),
            translation_pacing: Duration::from_millis(parse_or("TRANSLATION_PACING_MS", 1000)),

            api_key: non_empty("API_KEY"),
        })
    }
}

/// Read `key`, treating blank values as unset.
fn non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse `key`, falling back to `default` when missing or malformed.
fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
