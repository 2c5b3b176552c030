// 💳 Card Numbers - normalization, Luhn checksum, BIN extraction
//
// A card number is only ever handled as a digit string. The BIN prefix
// (first 6 digits) is sensitive: it leaves this module as a SHA-256 hash.

use crate::error::CardError;
use sha2::{Digest, Sha256};

/// Digits required by `validate`
pub const CARD_LENGTH: usize = 16;

/// Length of a BIN prefix (and the minimum length for a lookup)
pub const BIN_LENGTH: usize = 6;

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Strip the separators people type between digit groups.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Shape check for `validate`: exactly 16 digits, nothing else.
pub fn require_full_number(normalized: &str) -> Result<(), CardError> {
    if normalized.chars().count() != CARD_LENGTH {
        return Err(CardError::Input(
            "Card number must be 16 digits.".to_string(),
        ));
    }
    if !is_all_digits(normalized) {
        return Err(CardError::Input(
            "Card number must contain digits only.".to_string(),
        ));
    }
    Ok(())
}

/// Shape check for a BIN lookup: digits only, at least 6 of them.
pub fn require_lookup_number(normalized: &str) -> Result<(), CardError> {
    if !is_all_digits(normalized) || normalized.len() < BIN_LENGTH {
        return Err(CardError::Input(
            "Card number must be at least 6 digits for BIN lookup.".to_string(),
        ));
    }
    Ok(())
}

// ============================================================================
// LUHN CHECKSUM
// ============================================================================

/// Luhn (mod 10) checksum.
///
/// Every second digit counting leftwards from the second-to-last is doubled,
/// minus 9 when the result exceeds 9. Any non-digit makes the number invalid.
pub fn luhn_check(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }

    let mut sum = 0;
    let mut double = false;

    for c in digits.chars().rev() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };

        if double {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
        double = !double;
    }

    sum % 10 == 0
}

// ============================================================================
// BIN
// ============================================================================

/// First 6 digits of an already shape-checked number.
pub fn bin_prefix(digits: &str) -> &str {
    &digits[..BIN_LENGTH.min(digits.len())]
}

/// One-way key for the cache: lowercase hex SHA-256 of the prefix.
pub fn hash_bin(bin_prefix: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bin_prefix.as_bytes());
    format!("{:x}", hasher.finalize())
}
