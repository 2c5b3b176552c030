// BIN Checker - Core Library
// Card validation, network classification and cached BIN lookups for the CLI and tests

pub mod card;
pub mod config;
pub mod db;
pub mod entropy;
pub mod error;
pub mod lookup;
pub mod network;
pub mod remote;

// Re-export commonly used types
pub use card::{hash_bin, luhn_check, normalize};
pub use config::Config;
pub use db::{setup_database, BinCache, BinRecord};
pub use entropy::{shannon_entropy, FraudSignal, FraudThresholds};
pub use error::{CardError, LookupError};
pub use lookup::{validate_card, BinLookup, CardValidation, LookupOrigin, LookupReport};
pub use network::{classify_network, CardNetwork};
pub use remote::{parse_response, BinSource, BinlistClient, FetchOutcome, MissReason};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
