// ⚙️ Configuration
// Environment variables (optionally from a .env file), with defaults for all

use crate::entropy::{FraudThresholds, DEFAULT_HIGH, DEFAULT_LOW};
use anyhow::{bail, Context, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LOOKUP_URL: &str = "https://lookup.binlist.net";
pub const DEFAULT_DB_PATH: &str = "bin_lookup.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Lookup services, tried in order. `BIN_LOOKUP_URLS`, comma separated.
    pub lookup_urls: Vec<String>,

    /// Entropy window for the fraud flag. `FRAUD_ENTROPY_LOW` / `FRAUD_ENTROPY_HIGH`.
    pub fraud: FraudThresholds,

    /// SQLite cache file. `BIN_CACHE_PATH`.
    pub db_path: PathBuf,

    /// Per-request HTTP timeout. `BIN_LOOKUP_TIMEOUT_SECS`.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            lookup_urls: vec![DEFAULT_LOOKUP_URL.to_string()],
            fraud: FraudThresholds::default(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup_urls = match get("BIN_LOOKUP_URLS") {
            Some(raw) => {
                let urls: Vec<String> = raw
                    .split(',')
                    .map(|s| s.trim())
                    .filter(|s| !s.is_empty())
                    .map(|s| s.to_string())
                    .collect();
                if urls.is_empty() {
                    bail!("BIN_LOOKUP_URLS is set but contains no URLs");
                }
                urls
            }
            None => vec![DEFAULT_LOOKUP_URL.to_string()],
        };

        let low = parse_or(&get, "FRAUD_ENTROPY_LOW", DEFAULT_LOW)?;
        let high = parse_or(&get, "FRAUD_ENTROPY_HIGH", DEFAULT_HIGH)?;
        let fraud = FraudThresholds::new(low, high).context("Invalid fraud entropy thresholds")?;

        let db_path = get("BIN_CACHE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let timeout_secs = parse_or(&get, "BIN_LOOKUP_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            bail!("BIN_LOOKUP_TIMEOUT_SECS must be at least 1 second, got 0");
        }

        Ok(Config {
            lookup_urls,
            fraud,
            db_path,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a number, got '{raw}'")),
        None => Ok(default),
    }
}
