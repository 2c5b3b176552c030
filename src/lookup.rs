// 🔎 BIN Lookup - validate a card, resolve its issuer
//
// The two caller-facing operations. Front ends hold a `BinLookup`, call
// `validate` / `lookup`, and render what comes back. No state survives a
// call other than the cache rows written by a successful remote lookup.

use crate::card;
use crate::config::Config;
use crate::db::{short_hash, BinCache, BinRecord};
use crate::entropy::{FraudSignal, FraudThresholds};
use crate::error::{CardError, LookupError};
use crate::network::{classify_network, CardNetwork};
use crate::remote::{BinSource, BinlistClient, FetchOutcome};
use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CardValidation {
    pub valid: bool,
    pub network: CardNetwork,
}

impl CardValidation {
    pub fn render(&self) -> String {
        if self.valid {
            "✅ Valid Card Number".to_string()
        } else {
            "❌ Invalid Card Number".to_string()
        }
    }
}

/// Where the issuer record came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LookupOrigin {
    Cache,
    Remote(String),
    /// No source had data. A valid outcome, not an error.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub network: CardNetwork,
    pub record: Option<BinRecord>,
    pub origin: LookupOrigin,
    pub fraud: FraudSignal,
}

impl LookupReport {
    pub fn is_suspicious(&self) -> bool {
        self.fraud.suspicious
    }

    /// Display text. The fraud warning replaces the entropy line.
    pub fn render(&self) -> String {
        let mut out = match &self.record {
            Some(r) => format!(
                "🔎 Card Type: {}\nCard Level: {}\nCard Category: {}\nBank: {}\nCountry: {}\nIssuer Phone: {}",
                self.network, r.card_level, r.card_category, r.bank_name, r.country, r.issuer_phone
            ),
            None => format!("🔎 Card Type: {}\nIssuer: Unknown (BIN not found)", self.network),
        };

        out.push('\n');
        if self.fraud.suspicious {
            out.push_str("⚠ Fraudulent BIN Detected (Entropy Out of Range)");
        } else {
            out.push_str(&format!("Entropy: {:.2}", self.fraud.entropy));
        }
        out
    }
}

// ============================================================================
// VALIDATE
// ============================================================================

/// Exactly 16 digits after stripping separators, then Luhn.
pub fn validate_card(card_number: &str) -> Result<CardValidation, CardError> {
    let digits = card::normalize(card_number);
    card::require_full_number(&digits)?;

    Ok(CardValidation {
        valid: card::luhn_check(&digits),
        network: classify_network(&digits),
    })
}

// ============================================================================
// LOOKUP ORCHESTRATOR
// ============================================================================

pub struct BinLookup {
    cache: BinCache,
    sources: Vec<Box<dyn BinSource>>,
    fraud: FraudThresholds,
}

impl BinLookup {
    pub fn new(cache: BinCache, sources: Vec<Box<dyn BinSource>>, fraud: FraudThresholds) -> Self {
        BinLookup {
            cache,
            sources,
            fraud,
        }
    }

    /// File-backed cache plus one binlist client per configured URL
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = BinCache::open(&config.db_path)
            .with_context(|| format!("Failed to open BIN cache at {:?}", config.db_path))?;

        let mut sources: Vec<Box<dyn BinSource>> = Vec::new();
        for url in &config.lookup_urls {
            sources.push(Box::new(BinlistClient::new(url, config.request_timeout)?));
        }

        Ok(BinLookup::new(cache, sources, config.fraud))
    }

    pub fn cache(&self) -> &BinCache {
        &self.cache
    }

    pub fn validate(&self, card_number: &str) -> Result<CardValidation, CardError> {
        validate_card(card_number)
    }

    pub fn lookup(&self, card_number: &str) -> Result<LookupReport, LookupError> {
        let digits = card::normalize(card_number);
        card::require_lookup_number(&digits)?;

        if !card::luhn_check(&digits) {
            return Err(LookupError::ChecksumFailure);
        }

        let bin_prefix = card::bin_prefix(&digits);
        let bin_hash = card::hash_bin(bin_prefix);
        let fraud = FraudSignal::evaluate(bin_prefix, &self.fraud);
        let network = classify_network(&digits);

        let (record, origin) = match self.cache.get(&bin_hash)? {
            Some(record) => {
                debug!(bin_hash = short_hash(&bin_hash), "BIN cache hit");
                (Some(record), LookupOrigin::Cache)
            }
            None => self.fetch_remote(bin_prefix, &bin_hash)?,
        };

        Ok(LookupReport {
            network,
            record,
            origin,
            fraud,
        })
    }

    /// Try each source in order. The first record found is cached.
    fn fetch_remote(
        &self,
        bin_prefix: &str,
        bin_hash: &str,
    ) -> Result<(Option<BinRecord>, LookupOrigin), LookupError> {
        for source in &self.sources {
            match source.fetch(bin_prefix) {
                FetchOutcome::Found(record) => {
                    self.cache.put(bin_hash, &record)?;
                    info!(
                        bin_hash = short_hash(bin_hash),
                        source = source.name(),
                        "BIN resolved remotely and cached"
                    );
                    return Ok((Some(record), LookupOrigin::Remote(source.name().to_string())));
                }
                FetchOutcome::RateLimited => {
                    warn!(source = source.name(), "BIN lookup rate limited");
                    return Err(LookupError::RateLimited {
                        source_name: source.name().to_string(),
                    });
                }
                FetchOutcome::Miss(reason) => {
                    debug!(source = source.name(), %reason, "BIN source miss");
                }
            }
        }

        info!(bin_hash = short_hash(bin_hash), "BIN not found by any source");
        Ok((None, LookupOrigin::NotFound))
    }
}
