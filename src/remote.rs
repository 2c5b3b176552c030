// 🌐 Remote BIN Lookup
// API: GET https://lookup.binlist.net/{bin} (free, rate limited, no key)
//
// A source never fails loudly: every outcome is a `FetchOutcome`. A 429 is
// `RateLimited` so the caller can stop; anything else that yields no data is
// a `Miss` with the reason kept for logs and tests. Sources never write to
// the cache. Request errors are stored without their URL, which carries the
// plaintext BIN prefix.

use crate::db::BinRecord;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

pub const UNKNOWN_BANK: &str = "Unknown Bank";
pub const UNKNOWN_COUNTRY: &str = "Unknown Country";
pub const UNKNOWN_LEVEL: &str = "Unknown Level";
pub const UNKNOWN_TYPE: &str = "Unknown Type";
pub const NO_PHONE: &str = "No contact details available";

// ============================================================================
// OUTCOMES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(BinRecord),
    RateLimited,
    Miss(MissReason),
}

/// Why a source produced no record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// Non-200, non-429 status
    Status(u16),
    /// 200 but the body has no `bank` object
    NoBankData,
    /// Connection, TLS, timeout or body read failure
    Transport(String),
    /// Body was not the JSON we expect
    Parse(String),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::Status(code) => write!(f, "HTTP status {}", code),
            MissReason::NoBankData => write!(f, "no bank data in response"),
            MissReason::Transport(e) => write!(f, "transport error: {}", e),
            MissReason::Parse(e) => write!(f, "parse error: {}", e),
        }
    }
}

/// Anything that can resolve a BIN prefix to issuer data
pub trait BinSource {
    /// Label used in logs and rate-limit errors
    fn name(&self) -> &str;

    fn fetch(&self, bin_prefix: &str) -> FetchOutcome;
}

// ============================================================================
// RESPONSE SHAPE
// ============================================================================

#[derive(Debug, Deserialize)]
struct BinlistResponse {
    #[serde(default)]
    bank: Option<BinlistBank>,
    #[serde(default)]
    country: Option<BinlistCountry>,
    #[serde(default)]
    level: Option<String>,
    #[serde(default, rename = "type")]
    card_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BinlistBank {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    phone: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BinlistCountry {
    #[serde(default)]
    name: Option<String>,
}

impl BinlistResponse {
    fn into_record(self) -> Option<BinRecord> {
        let bank = self.bank?;
        Some(BinRecord {
            bank_name: bank.name.unwrap_or_else(|| UNKNOWN_BANK.to_string()),
            country: self
                .country
                .and_then(|c| c.name)
                .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string()),
            card_level: self.level.unwrap_or_else(|| UNKNOWN_LEVEL.to_string()),
            card_category: self.card_type.unwrap_or_else(|| UNKNOWN_TYPE.to_string()),
            issuer_phone: bank.phone.unwrap_or_else(|| NO_PHONE.to_string()),
        })
    }
}

/// Map an HTTP status + body to an outcome.
pub fn parse_response(status: u16, body: &str) -> FetchOutcome {
    if status == 429 {
        return FetchOutcome::RateLimited;
    }
    if status != 200 {
        return FetchOutcome::Miss(MissReason::Status(status));
    }

    match serde_json::from_str::<BinlistResponse>(body) {
        Ok(response) => match response.into_record() {
            Some(record) => FetchOutcome::Found(record),
            None => FetchOutcome::Miss(MissReason::NoBankData),
        },
        Err(e) => FetchOutcome::Miss(MissReason::Parse(e.to_string())),
    }
}

// ============================================================================
// BINLIST CLIENT
// ============================================================================

pub struct BinlistClient {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl BinlistClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, bin_prefix: &str) -> String {
        format!("{}/{}", self.base_url, bin_prefix)
    }
}

impl BinSource for BinlistClient {
    fn name(&self) -> &str {
        &self.base_url
    }

    fn fetch(&self, bin_prefix: &str) -> FetchOutcome {
        let url = self.url_for(bin_prefix);
        info!("🔍 BIN lookup via {}", self.base_url);

        let response = match self
            .client
            .get(&url)
            .header("Accept-Version", "3")
            .send()
        {
            Ok(response) => response,
            Err(e) => {
                let message = e.without_url().to_string();
                warn!("BIN lookup request to {} failed: {}", self.base_url, message);
                return FetchOutcome::Miss(MissReason::Transport(message));
            }
        };

        let status = response.status().as_u16();
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                let message = e.without_url().to_string();
                warn!("Failed to read BIN lookup response from {}: {}", self.base_url, message);
                return FetchOutcome::Miss(MissReason::Transport(message));
            }
        };

        let outcome = parse_response(status, &body);
        match &outcome {
            FetchOutcome::RateLimited => warn!("{} rate limited the BIN lookup", self.base_url),
            FetchOutcome::Miss(reason @ MissReason::Parse(_)) => {
                warn!("Unexpected BIN lookup response from {}: {}", self.base_url, reason)
            }
            FetchOutcome::Miss(reason) => info!("No BIN data from {}: {}", self.base_url, reason),
            FetchOutcome::Found(_) => {}
        }
        outcome
    }
}
