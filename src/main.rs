//! NEAR Outcome Resolver Service
//!
//! Serves the greeting and price feed pages as a read-only REST API, or
//! resolves a single page URL from the command line.
//!
//! ## Overview
//!
//! After a user signs a contract call, the wallet redirects back to the page
//! with `?transactionHashes=<hash>`. This service:
//! 1. Reads the hash from the page query
//! 2. Fetches the transaction outcome from the node at FINAL finality
//! 3. Decodes the contract's return value
//! 4. Clears the consumed query parameter
//!
//! The service holds no keys; signing stays with the wallet.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use near_outcome_resolver::api::ApiServer;
use near_outcome_resolver::config::{Config, CONFIG_PATH_ENV, TESTNET_CONFIG_PATH};
use near_outcome_resolver::page::{PageLocation, Session};
use near_outcome_resolver::pages::{HelloNearPage, PriceFeedPage};
use near_outcome_resolver::price_feed::AssetDecimals;
use near_outcome_resolver::storage::LocalStore;

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

/// Main application entry point.
///
/// This function:
/// 1. Initializes logging and tracing
/// 2. Loads configuration from TOML file
/// 3. Opens local storage
/// 4. Either resolves one page URL (`resolve <url>`) or runs the API server
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(());
    }

    let mut config_path = None;
    let mut signed_account = None;
    let mut page_url = None;
    for (i, arg) in args.iter().enumerate() {
        match arg.as_str() {
            "--config" if i + 1 < args.len() => config_path = Some(args[i + 1].clone()),
            "--account" if i + 1 < args.len() => signed_account = Some(args[i + 1].clone()),
            "resolve" if i + 1 < args.len() => page_url = Some(args[i + 1].clone()),
            _ => {}
        }
    }

    if let Some(path) = config_path {
        std::env::set_var(CONFIG_PATH_ENV, &path);
        info!("Using custom config: {}", path);
    } else if args.iter().any(|arg| arg == "--testnet" || arg == "-t") {
        std::env::set_var(CONFIG_PATH_ENV, TESTNET_CONFIG_PATH);
        info!("Using testnet configuration");
    }

    let config = Config::load()?;
    info!("Configuration loaded for network {}", config.network.name);

    let store = Arc::new(LocalStore::open(&config.storage.path).await?);

    if let Some(page_url) = page_url {
        return resolve_once(&config, store, &page_url, signed_account).await;
    }

    info!("Starting NEAR Outcome Resolver Service");
    let api_server = ApiServer::new(config, store)?;
    api_server.run().await?;

    Ok(())
}

/// Loads one page URL the way the browser would after a wallet redirect and
/// prints the resulting page state.
async fn resolve_once(
    config: &Config,
    store: Arc<LocalStore>,
    page_url: &str,
    signed_account: Option<String>,
) -> Result<()> {
    let mut location = PageLocation::parse(page_url)
        .with_context(|| format!("Invalid page URL '{}'", page_url))?;
    let session = Session::from_config(config)?.with_signed_account(signed_account);
    let receipt_lookup = config.resolver.receipt_lookup;

    let rendered = if location.path.trim_end_matches('/').ends_with("price-feed") {
        let page = PriceFeedPage::new(
            &config.contracts.price_oracle,
            receipt_lookup,
            AssetDecimals::with_overrides(&config.assets),
            store,
        );
        serde_json::to_string_pretty(&page.on_load(&session, &mut location).await)?
    } else {
        let page = HelloNearPage::new(&config.contracts.hello_near, receipt_lookup, store);
        serde_json::to_string_pretty(&page.on_load(&session, &mut location).await)?
    };

    println!("{}", rendered);
    Ok(())
}

fn print_help() {
    println!("NEAR Outcome Resolver");
    println!();
    println!("Usage: near-outcome-resolver [OPTIONS] [resolve <page-url>]");
    println!();
    println!("Commands:");
    println!("  resolve <page-url>  Resolve the transaction in a page URL and print the page state");
    println!("                      (without a command the REST API server is started)");
    println!();
    println!("Options:");
    println!("  --testnet, -t       Use testnet configuration ({})", TESTNET_CONFIG_PATH);
    println!("  --config <path>     Use custom config file path (overrides --testnet)");
    println!("  --account <id>      Account the wallet session is signed in with");
    println!("  --help, -h          Show this help message");
    println!();
    println!("Environment variables:");
    println!("  {}  Path to config file", CONFIG_PATH_ENV);
}
