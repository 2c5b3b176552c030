// ❗ Error Taxonomy
//
// Input and checksum problems are the caller's to display. A rate limit is a
// network fact worth surfacing on its own. Storage errors end the request.
// A BIN that no source knows about is NOT an error (see `LookupOrigin`).

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardError {
    /// Malformed or wrong-length card number
    #[error("Input Error: {0}")]
    Input(String),
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Input(#[from] CardError),

    #[error("The card number is invalid. Please enter a valid card number.")]
    ChecksumFailure,

    #[error("Rate limit exceeded by {source_name}. Please try again later.")]
    RateLimited { source_name: String },

    #[error("BIN cache failure: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LookupError {
    /// Short machine-readable tag, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            LookupError::Input(_) => "input_error",
            LookupError::ChecksumFailure => "checksum_failure",
            LookupError::RateLimited { .. } => "rate_limited",
            LookupError::Storage(_) => "storage_failure",
        }
    }
}
