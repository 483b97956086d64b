use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::talent::ranking::TopK;

/// Application configuration loaded from environment variables.
/// Fails at startup, before any network call, if required variables are missing
/// or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Narrative generation is disabled when unset.
    pub anthropic_api_key: Option<String>,
    pub port: u16,
    pub rust_log: String,
    pub directory_cache_ttl: Duration,
    pub recalibrate_scores: bool,
    pub default_top_k: TopK,
    pub db_acquire_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            database_url: optional("DATABASE_URL").with_context(|| {
                "Required environment variable 'DATABASE_URL' is not set".to_string()
            })?,
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            port: parse_or(optional("PORT"), "PORT", 8080)?,
            rust_log: optional("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            directory_cache_ttl: Duration::from_secs(parse_or(
                optional("DIRECTORY_CACHE_TTL_SECS"),
                "DIRECTORY_CACHE_TTL_SECS",
                3600,
            )?),
            recalibrate_scores: parse_or(
                optional("RECALIBRATE_SCORES"),
                "RECALIBRATE_SCORES",
                true,
            )?,
            default_top_k: parse_or(optional("DEFAULT_TOP_K"), "DEFAULT_TOP_K", TopK::default())?,
            db_acquire_timeout: Duration::from_secs(parse_or(
                optional("DB_ACQUIRE_TIMEOUT_SECS"),
                "DB_ACQUIRE_TIMEOUT_SECS",
                10,
            )?),
        })
    }

    pub fn narrative_enabled(&self) -> bool {
        self.anthropic_api_key.is_some()
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| {
                format!("Environment variable '{key}' has an invalid value '{value}'")
            }),
    }
}
