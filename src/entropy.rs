// 🎲 Entropy Fraud Signal
//
// Shannon entropy of the BIN string, thresholded into a "suspicious" flag.
//
// ⚠️ This is an empirical heuristic with no derivation or validation data
// behind it. Its false-positive and false-negative rates are unknown. Treat
// the flag as a best-effort hint for a human, never as a fraud decision.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default lower bound: flag anything strictly below
pub const DEFAULT_LOW: f64 = 1.5;

/// Default upper bound: flag anything strictly above
pub const DEFAULT_HIGH: f64 = 3.8;

// ============================================================================
// ENTROPY ESTIMATOR
// ============================================================================

/// Shannon entropy (bits per symbol) of the character distribution.
///
/// `0.0` for a single repeated character, `log2(k)` for `k` equally frequent
/// characters. Empty input returns `0.0`.
pub fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    let mut total = 0usize;
    for c in s.chars() {
        *counts.entry(c).or_insert(0) += 1;
        total += 1;
    }

    if total == 0 {
        return 0.0;
    }

    let total = total as f64;
    let entropy = -counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            p * p.log2()
        })
        .sum::<f64>();

    // -0.0 for a single symbol
    entropy.max(0.0)
}

// ============================================================================
// FRAUD HEURISTIC
// ============================================================================

/// Entropy window outside of which a BIN is flagged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudThresholds {
    /// Flag when entropy < low
    pub low: f64,
    /// Flag when entropy > high
    pub high: f64,
}

impl Default for FraudThresholds {
    fn default() -> Self {
        FraudThresholds {
            low: DEFAULT_LOW,
            high: DEFAULT_HIGH,
        }
    }
}

impl FraudThresholds {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        let thresholds = FraudThresholds { low, high };
        thresholds.check()?;
        Ok(thresholds)
    }

    pub fn check(&self) -> Result<()> {
        if !self.low.is_finite() || !self.high.is_finite() {
            bail!("Entropy thresholds must be finite (low={}, high={})", self.low, self.high);
        }
        if self.low < 0.0 {
            bail!("Entropy low threshold must be >= 0, got {}", self.low);
        }
        if self.low > self.high {
            bail!(
                "Entropy low threshold {} is above high threshold {}",
                self.low,
                self.high
            );
        }
        Ok(())
    }

    /// Strict on both ends: the boundary values themselves pass
    pub fn is_suspicious(&self, entropy: f64) -> bool {
        entropy < self.low || entropy > self.high
    }
}

/// Entropy plus the flag derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FraudSignal {
    pub entropy: f64,
    pub suspicious: bool,
}

impl FraudSignal {
    pub fn evaluate(bin_prefix: &str, thresholds: &FraudThresholds) -> Self {
        let entropy = shannon_entropy(bin_prefix);
        FraudSignal {
            entropy,
            suspicious: thresholds.is_suspicious(entropy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_single_symbol_is_zero() {
        assert!(shannon_entropy("000000").abs() < EPS);
        assert!(shannon_entropy("7").abs() < EPS);
    }

    #[test]
    fn test_distinct_symbols() {
        assert!((shannon_entropy("123456") - 6f64.log2()).abs() < EPS);
        assert!((shannon_entropy("0101") - 1.0).abs() < EPS);
    }

    #[test]
    fn test_empty_is_guarded() {
        assert_eq!(shannon_entropy(""), 0.0);
    }

    #[test]
    fn test_mixed_distribution() {
        // "411111": p = 1/6, 5/6
        let p1: f64 = 1.0 / 6.0;
        let p5: f64 = 5.0 / 6.0;
        let expected = -(p1 * p1.log2() + p5 * p5.log2());
        assert!((shannon_entropy("411111") - expected).abs() < EPS);
    }

    #[test]
    fn test_threshold_boundaries_not_flagged() {
        let t = FraudThresholds::default();
        assert!(!t.is_suspicious(1.5));
        assert!(!t.is_suspicious(3.8));
        assert!(t.is_suspicious(1.4999));
        assert!(t.is_suspicious(3.8001));
        assert!(!t.is_suspicious(2.585));
    }

    #[test]
    fn test_signal_for_prefixes() {
        let t = FraudThresholds::default();
        // Repeated digits: entropy 0 → flagged
        assert!(FraudSignal::evaluate("000000", &t).suspicious);
        // Six distinct digits: log2(6) ≈ 2.585 → not flagged
        let s = FraudSignal::evaluate("123456", &t);
        assert!(!s.suspicious);
        assert!((s.entropy - 6f64.log2()).abs() < EPS);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = FraudThresholds::new(0.5, 2.0).unwrap();
        assert!(FraudSignal::evaluate("123456", &t).suspicious);
        assert!(!FraudSignal::evaluate("411111", &t).suspicious);
    }

    #[test]
    fn test_invalid_thresholds() {
        assert!(FraudThresholds::new(3.0, 2.0).is_err());
        assert!(FraudThresholds::new(-1.0, 2.0).is_err());
        assert!(FraudThresholds::new(f64::NAN, 2.0).is_err());
        assert!(FraudThresholds::new(2.0, 2.0).is_ok());
    }
}
