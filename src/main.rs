use anyhow::Result;
use std::env;
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use bin_checker::{BinCache, BinLookup, Config, LookupOrigin, VERSION};

fn main() -> ExitCode {
    init_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().skip(1).collect();
    let config = Config::from_env()?;

    match args.first().map(String::as_str) {
        Some("validate") => run_validate(&args[1..].join(" ")),
        Some("lookup") => run_lookup(&config, &args[1..].join(" ")),
        Some("init-db") => run_init_db(&config),
        _ => {
            print_usage();
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_validate(card_number: &str) -> Result<ExitCode> {
    match bin_checker::validate_card(card_number) {
        Ok(validation) => {
            println!("{}", validation.render());
            if validation.valid {
                println!("🔎 Card Type: {}", validation.network);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_lookup(config: &Config, card_number: &str) -> Result<ExitCode> {
    let lookup = BinLookup::from_config(config)?;

    match lookup.lookup(card_number) {
        Ok(report) => {
            println!("{}", report.render());
            match &report.origin {
                LookupOrigin::Cache => println!("(from local cache)"),
                LookupOrigin::Remote(source) => println!("(fetched from {})", source),
                LookupOrigin::NotFound => {}
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!(kind = e.kind(), "lookup refused");
            eprintln!("❌ {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_init_db(config: &Config) -> Result<ExitCode> {
    let cache = BinCache::open(&config.db_path)?;
    println!("✓ BIN cache ready at {:?}", config.db_path);
    println!("✓ Cached BINs: {}", cache.count()?);
    Ok(ExitCode::SUCCESS)
}

fn print_usage() {
    eprintln!("bin-checker {}", VERSION);
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  bin-checker validate <card number>   Luhn check (16 digits)");
    eprintln!("  bin-checker lookup <card number>     Issuer lookup for the BIN");
    eprintln!("  bin-checker init-db                  Create the BIN cache");
    eprintln!();
    eprintln!("Environment: BIN_LOOKUP_URLS, BIN_CACHE_PATH, BIN_LOOKUP_TIMEOUT_SECS,");
    eprintln!("             FRAUD_ENTROPY_LOW, FRAUD_ENTROPY_HIGH, RUST_LOG");
}
