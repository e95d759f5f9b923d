//! Configuration Management Module
//!
//! This module handles loading and managing configuration for the outcome resolver.
//! Configuration includes the NEAR RPC endpoint, contract accounts, the receipt
//! lookup strategy, local storage location and API settings.

use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable that overrides the configuration file path
pub const CONFIG_PATH_ENV: &str = "OUTCOME_RESOLVER_CONFIG_PATH";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/resolver.toml";

/// Testnet configuration file path (selected with `--testnet`)
pub const TESTNET_CONFIG_PATH: &str = "config/resolver_testnet.toml";

// ============================================================================
// CONFIGURATION STRUCTURES
// ============================================================================

/// Main configuration structure containing all service settings.
///
/// This structure holds configuration for:
/// - NEAR network connection details
/// - Contract accounts the pages interact with
/// - Outcome resolution settings
/// - Local storage file location
/// - API server configuration
/// - Optional asset decimal overrides for price formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// NEAR network configuration (RPC endpoint, timeout)
    pub network: NetworkConfig,
    /// Contract accounts used by the pages
    pub contracts: ContractsConfig,
    /// Outcome resolution settings
    #[serde(default)]
    pub resolver: ResolverConfig,
    /// Local storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// API server configuration (host, port, CORS settings)
    pub api: ApiConfig,
    /// Extra or overriding asset decimals for price formatting
    #[serde(default)]
    pub assets: Vec<AssetDecimalsConfig>,
}

/// Configuration for the NEAR network connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Human-readable network name (e.g. "testnet")
    pub name: String,
    /// JSON-RPC endpoint URL
    pub rpc_url: String,
    /// Upper bound for a single RPC request in milliseconds
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Contract accounts the pages call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractsConfig {
    /// Greeting contract (`get_greeting` / `set_greeting`)
    pub hello_near: String,
    /// Cross-contract price feed caller (`query_price_feed`)
    pub price_oracle: String,
}

/// How the success value is located in the receipt list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptLookup {
    /// Read `receipts_outcome[1]` only
    #[default]
    FixedIndex,
    /// Scan from `receipts_outcome[1]` for the first receipt carrying a success value
    FirstSuccessValue,
}

/// Outcome resolution settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Receipt lookup strategy
    #[serde(default)]
    pub receipt_lookup: ReceiptLookup,
}

/// Local storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON file backing local storage
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: "data/local_storage.json".to_string(),
        }
    }
}

/// API server configuration for external communication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host address to bind the API server to
    pub host: String,
    /// Port number to bind the API server to
    pub port: u16,
    /// Allowed CORS origins for cross-origin requests
    pub cors_origins: Vec<String>,
}

/// Decimals of an asset's real-world unit, keyed by asset id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetDecimalsConfig {
    /// Asset id as reported by the price oracle
    pub asset_id: String,
    /// Number of decimals of the asset
    pub decimals: u8,
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

// ============================================================================
// CONFIGURATION LOADING AND MANAGEMENT
// ============================================================================

impl Config {
    /// Validates the configuration.
    ///
    /// This function ensures that:
    /// - The RPC URL is an absolute http(s) URL
    /// - The request timeout is non-zero
    /// - Both contract accounts are valid NEAR account ids
    ///
    /// # Returns
    ///
    /// - `Ok(())` - Configuration is valid
    /// - `Err(anyhow::Error)` - Validation failed
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = Url::parse(&self.network.rpc_url).map_err(|e| {
            anyhow::anyhow!(
                "Configuration error: invalid rpc_url '{}': {}",
                self.network.rpc_url,
                e
            )
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!(
                "Configuration error: rpc_url must use http or https (got '{}')",
                url.scheme()
            );
        }

        if self.network.request_timeout_ms == 0 {
            anyhow::bail!("Configuration error: request_timeout_ms must be greater than 0");
        }

        validate_account_id(&self.contracts.hello_near)
            .map_err(|e| anyhow::anyhow!("Invalid contracts.hello_near: {}", e))?;
        validate_account_id(&self.contracts.price_oracle)
            .map_err(|e| anyhow::anyhow!("Invalid contracts.price_oracle: {}", e))?;

        Ok(())
    }

    /// Loads configuration from the TOML file.
    ///
    /// The path is taken from `OUTCOME_RESOLVER_CONFIG_PATH` when set, otherwise
    /// `config/resolver.toml`.
    pub fn load() -> anyhow::Result<Self> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(&config_path)
    }

    /// Loads and validates configuration from an explicit path.
    ///
    /// # Returns
    ///
    /// - `Ok(Config)` - Successfully loaded and validated configuration
    /// - `Err(anyhow::Error)` - File missing, unparseable, or invalid
    pub fn load_from_path(config_path: &str) -> anyhow::Result<Self> {
        if std::path::Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Err(anyhow::anyhow!(
                "Configuration file '{}' not found. Please copy the template:\n\
                cp config/resolver.template.toml config/resolver.toml\n\
                Then edit config/resolver.toml with your actual values.",
                config_path
            ))
        }
    }

    /// Creates a default configuration pointing at NEAR testnet.
    #[allow(clippy::should_implement_trait)]
    pub fn default() -> Self {
        Self {
            network: NetworkConfig {
                name: "testnet".to_string(),
                rpc_url: "https://rpc.testnet.near.org".to_string(),
                request_timeout_ms: default_request_timeout_ms(),
            },
            contracts: ContractsConfig {
                hello_near: "hello.near-examples.testnet".to_string(),
                price_oracle: "price-feed.testnet".to_string(),
            },
            resolver: ResolverConfig::default(),
            storage: StorageConfig::default(),
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 3400,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            assets: Vec::new(),
        }
    }
}

/// Validates a NEAR account id.
///
/// Accepts 2-64 characters of lowercase alphanumerics separated by single
/// `-`, `_` or `.` characters, or a 64-character lowercase hex implicit account.
pub fn validate_account_id(account_id: &str) -> anyhow::Result<()> {
    if account_id.len() < 2 || account_id.len() > 64 {
        anyhow::bail!("account id '{}' must be 2-64 characters", account_id);
    }

    let mut last_was_separator = true;
    for c in account_id.chars() {
        match c {
            'a'..='z' | '0'..='9' => last_was_separator = false,
            '-' | '_' | '.' => {
                if last_was_separator {
                    anyhow::bail!("account id '{}' has a misplaced separator", account_id);
                }
                last_was_separator = true;
            }
            _ => anyhow::bail!(
                "account id '{}' contains invalid character '{}'",
                account_id,
                c
            ),
        }
    }
    if last_was_separator {
        anyhow::bail!("account id '{}' ends with a separator", account_id);
    }
    Ok(())
}
