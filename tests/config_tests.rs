//! Unit tests for configuration management
//!
//! These tests verify configuration loading, parsing, validation and defaults
//! without requiring a NEAR node.

use std::fs;

use near_outcome_resolver::config::{
    validate_account_id, Config, ReceiptLookup, CONFIG_PATH_ENV,
};

#[path = "mod.rs"]
mod test_helpers;
use test_helpers::build_test_config_with_mock_server;

// ============================================================================
// DEFAULTS
// ============================================================================

/// Test that default configuration creates valid structure
/// Why: Verify default config is valid and doesn't panic
#[test]
fn test_default_config_creation() {
    let config = Config::default();

    assert_eq!(config.network.name, "testnet");
    assert_eq!(config.network.rpc_url, "https://rpc.testnet.near.org");
    assert_eq!(config.network.request_timeout_ms, 30_000);
    assert_eq!(config.contracts.hello_near, "hello.near-examples.testnet");
    assert_eq!(config.resolver.receipt_lookup, ReceiptLookup::FixedIndex);
    assert!(config.assets.is_empty());
    assert!(config.validate().is_ok());
}

/// What is tested: Optional sections fall back to their defaults
/// Why: A minimal config file only needs network, contracts and api
#[test]
fn test_minimal_config_deserialize() {
    let toml = r#"
[network]
name = "localnet"
rpc_url = "http://127.0.0.1:3030"

[contracts]
hello_near = "hello.test.near"
price_oracle = "oracle.test.near"

[api]
host = "0.0.0.0"
port = 8080
cors_origins = ["*"]
"#;

    let config: Config = toml::from_str(toml).expect("Should deserialize minimal config");
    assert_eq!(config.network.request_timeout_ms, 30_000);
    assert_eq!(config.resolver.receipt_lookup, ReceiptLookup::FixedIndex);
    assert_eq!(config.storage.path, "data/local_storage.json");
    assert!(config.validate().is_ok());
}

/// What is tested: Receipt lookup strategy and asset overrides parse from TOML
/// Why: Both are optional knobs of the resolver
#[test]
fn test_resolver_and_assets_deserialize() {
    let toml = r#"
[network]
name = "testnet"
rpc_url = "https://rpc.testnet.near.org"
request_timeout_ms = 5000

[contracts]
hello_near = "hello.near-examples.testnet"
price_oracle = "price-feed.testnet"

[resolver]
receipt_lookup = "first_success_value"

[api]
host = "127.0.0.1"
port = 3400
cors_origins = []

[[assets]]
asset_id = "usdc.fakes.testnet"
decimals = 6
"#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.resolver.receipt_lookup, ReceiptLookup::FirstSuccessValue);
    assert_eq!(config.network.request_timeout_ms, 5000);
    assert_eq!(config.assets.len(), 1);
    assert_eq!(config.assets[0].decimals, 6);
}

// ============================================================================
// VALIDATION
// ============================================================================

/// What is tested: validate() rejects unusable RPC URLs
/// Why: A bad endpoint should fail at startup, not on the first page load
#[test]
fn test_validate_rejects_bad_rpc_url() {
    let mut config = build_test_config_with_mock_server("not a url");
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("invalid rpc_url"));

    config.network.rpc_url = "ws://127.0.0.1:3030".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("http or https"));
}

/// What is tested: validate() rejects a zero timeout
/// Why: Every request must be bounded
#[test]
fn test_validate_rejects_zero_timeout() {
    let mut config = Config::default();
    config.network.request_timeout_ms = 0;
    assert!(config.validate().is_err());
}

/// What is tested: validate() rejects invalid contract accounts
/// Why: Every lookup passes the contract account to the node
#[test]
fn test_validate_rejects_invalid_contract() {
    let mut config = Config::default();
    config.contracts.price_oracle = "Price-Feed.testnet".to_string();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("contracts.price_oracle"));
}

/// What is tested: Account id rules
/// Why: Named and implicit accounts pass; malformed ids fail
#[test]
fn test_validate_account_id() {
    assert!(validate_account_id("alice.testnet").is_ok());
    assert!(validate_account_id("hello.near-examples.testnet").is_ok());
    assert!(validate_account_id("a_b-c.near").is_ok());
    assert!(validate_account_id(
        "3e2210e1184b45b64c8a434c0a7e7b23cc04ea7eb7a6c3c32520d03d4afcb8af"
    )
    .is_ok());

    assert!(validate_account_id("a").is_err());
    assert!(validate_account_id(".alice").is_err());
    assert!(validate_account_id("alice.").is_err());
    assert!(validate_account_id("alice..near").is_err());
    assert!(validate_account_id("Alice.near").is_err());
    assert!(validate_account_id("alice near").is_err());
    assert!(validate_account_id(&"a".repeat(65)).is_err());
}

// ============================================================================
// FILE LOADING TESTS
// ============================================================================

/// What is tested: The shipped template and testnet configs load and validate
/// Why: Users start from these files
#[test]
fn test_shipped_configs_load() {
    let template = Config::load_from_path("config/resolver.template.toml").unwrap();
    assert_eq!(template.network.name, "testnet");

    let testnet = Config::load_from_path("config/resolver_testnet.toml").unwrap();
    assert_eq!(testnet.contracts.price_oracle, "price-feed.testnet");
}

/// What is tested: Config::load() reads the file named by the environment variable
/// Why: Deployments select their config through the environment
#[test]
fn test_config_load_from_env_path() {
    let test_config_dir = ".tmp/test_config";
    let test_config_file = format!("{}/resolver.toml", test_config_dir);
    fs::create_dir_all(test_config_dir).unwrap();

    let toml_content = r#"
[network]
name = "localnet"
rpc_url = "http://127.0.0.1:3030"
request_timeout_ms = 1000

[contracts]
hello_near = "hello.test.near"
price_oracle = "oracle.test.near"

[api]
host = "127.0.0.1"
port = 3401
cors_origins = ["*"]
"#;
    fs::write(&test_config_file, toml_content).unwrap();

    std::env::set_var(CONFIG_PATH_ENV, &test_config_file);
    let config = Config::load();
    std::env::remove_var(CONFIG_PATH_ENV);

    let config = config.unwrap();
    assert_eq!(config.network.name, "localnet");
    assert_eq!(config.api.port, 3401);

    fs::remove_file(&test_config_file).unwrap();
}

/// What is tested: load_from_path() returns an error when the file doesn't exist
/// Why: Ensure proper error message when config file is missing
#[test]
fn test_config_load_file_not_found() {
    let result = Config::load_from_path(".tmp/nonexistent/resolver.toml");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("not found"));
}

/// What is tested: load_from_path() validates what it loads
/// Why: An invalid file must not produce a usable config
#[test]
fn test_config_load_invalid_file() {
    let test_config_dir = ".tmp/test_config_invalid";
    let test_config_file = format!("{}/resolver.toml", test_config_dir);
    fs::create_dir_all(test_config_dir).unwrap();

    let toml_content = r#"
[network]
name = "localnet"
rpc_url = "http://127.0.0.1:3030"
request_timeout_ms = 0

[contracts]
hello_near = "hello.test.near"
price_oracle = "oracle.test.near"

[api]
host = "127.0.0.1"
port = 3401
cors_origins = []
"#;
    fs::write(&test_config_file, toml_content).unwrap();

    let result = Config::load_from_path(&test_config_file);
    fs::remove_file(&test_config_file).unwrap();

    assert!(result.unwrap_err().to_string().contains("request_timeout_ms"));
}
