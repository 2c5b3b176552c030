// 🏷️ Card Network Classification - Patterns as Data
// Ordered prefix/length patterns, first match wins

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CARD NETWORK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardNetwork {
    Visa,
    MasterCard,
    AmericanExpress,
    DinersClub,
    Discover,
    Jcb,
    Unknown,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "Visa",
            CardNetwork::MasterCard => "MasterCard",
            CardNetwork::AmericanExpress => "American Express",
            CardNetwork::DinersClub => "Diners Club",
            CardNetwork::Discover => "Discover",
            CardNetwork::Jcb => "JCB",
            CardNetwork::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PATTERNS
// ============================================================================

/// (network, pattern) in match order
const PATTERNS: &[(CardNetwork, &str)] = &[
    (CardNetwork::Visa, r"^4[0-9]{12}(?:[0-9]{3})?$"),
    (CardNetwork::MasterCard, r"^5[1-5][0-9]{14}$"),
    (CardNetwork::AmericanExpress, r"^3[47][0-9]{13}$"),
    (CardNetwork::DinersClub, r"^3(?:0[0-5]|[68][0-9])[0-9]{11}$"),
    (CardNetwork::Discover, r"^6(?:011|5[0-9]{2})[0-9]{12}$"),
    (CardNetwork::Jcb, r"^(?:2131|1800|35\d{3})\d{11}$"),
];

lazy_static::lazy_static! {
    static ref COMPILED: Vec<(CardNetwork, Regex)> = PATTERNS
        .iter()
        .map(|(network, pattern)| {
            (*network, Regex::new(pattern).expect("card network pattern is valid"))
        })
        .collect();
}

/// Classify a normalized digit string. Returns `Unknown` when nothing matches.
pub fn classify_network(digits: &str) -> CardNetwork {
    COMPILED
        .iter()
        .find(|(_, re)| re.is_match(digits))
        .map(|(network, _)| *network)
        .unwrap_or(CardNetwork::Unknown)
}
