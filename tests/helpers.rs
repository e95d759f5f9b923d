//! Shared test helpers
//!
//! This module provides helper functions used by the integration tests.
//!
//! The module is organized into several categories:
//! - **Configuration Builders**: Functions to create test configurations pointing at a mock node
//! - **Outcome Builders**: Functions to create transaction outcomes as the node returns them

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use near_outcome_resolver::config::{
    ApiConfig, Config, ContractsConfig, NetworkConfig, ResolverConfig, StorageConfig,
};
use near_outcome_resolver::outcome::TRANSACTION_HASHES_KEY;
use near_outcome_resolver::page::Session;
use near_outcome_resolver::NearRpcClient;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Dummy transaction hash (base58)
pub const DUMMY_TX_HASH: &str = "ABC123";

/// Dummy greeting contract account
pub const DUMMY_CONTRACT_ID: &str = "hello.near-examples.testnet";

/// Dummy price oracle contract account
pub const DUMMY_ORACLE_ID: &str = "price-feed.testnet";

/// Dummy signer account
pub const DUMMY_ACCOUNT_ID: &str = "alice.testnet";

/// Dummy receipt id (base58)
pub const DUMMY_RECEIPT_ID: &str = "3GTGoiN3FEoJenSw5ob4YMmFEV2Fbiichj3FDBnM78xK";

// ============================================================================
// CONFIGURATION BUILDERS
// ============================================================================

/// Build a test config pointing at a mock node.
#[allow(dead_code)]
pub fn build_test_config_with_mock_server(rpc_url: &str) -> Config {
    Config {
        network: NetworkConfig {
            name: "testnet".to_string(),
            rpc_url: rpc_url.to_string(),
            request_timeout_ms: 2_000,
        },
        contracts: ContractsConfig {
            hello_near: DUMMY_CONTRACT_ID.to_string(),
            price_oracle: DUMMY_ORACLE_ID.to_string(),
        },
        resolver: ResolverConfig::default(),
        storage: StorageConfig::default(),
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3400,
            cors_origins: vec!["*".to_string()],
        },
        assets: Vec::new(),
    }
}

/// Build an RPC client for a mock node with a short timeout.
#[allow(dead_code)]
pub fn build_test_client(rpc_url: &str) -> NearRpcClient {
    NearRpcClient::new(rpc_url, Duration::from_secs(2)).expect("client should build")
}

/// Build a session for a mock node, optionally signed in.
#[allow(dead_code)]
pub fn build_test_session(rpc_url: &str, signed_account_id: Option<&str>) -> Session {
    Session::new(
        "testnet",
        build_test_client(rpc_url),
        signed_account_id.map(str::to_string),
    )
}

/// Build a page query holding `transactionHashes=<hash>`.
#[allow(dead_code)]
pub fn page_query(hash: &str) -> HashMap<String, String> {
    HashMap::from([(TRANSACTION_HASHES_KEY.to_string(), hash.to_string())])
}

// ============================================================================
// OUTCOME BUILDERS
// ============================================================================

/// Base64-encode a success value the way the node reports it.
#[allow(dead_code)]
pub fn encode_success_value(raw: &[u8]) -> String {
    STANDARD.encode(raw)
}

/// Create a `tx` result for a single function call.
///
/// Receipt 0 is the call itself (it hands off to receipt 1); receipt 1 carries
/// `success_value`.
#[allow(dead_code)]
pub fn create_default_outcome(success_value: &str) -> serde_json::Value {
    create_outcome_with_receipts(vec![
        json!({"SuccessReceiptId": DUMMY_RECEIPT_ID}),
        json!({"SuccessValue": success_value}),
    ])
}

/// Create a `tx` result whose receipts have the given statuses, in order.
#[allow(dead_code)]
pub fn create_outcome_with_receipts(statuses: Vec<serde_json::Value>) -> serde_json::Value {
    let receipts: Vec<serde_json::Value> = statuses
        .into_iter()
        .enumerate()
        .map(|(i, status)| {
            json!({
                "id": format!("receipt-{}", i),
                "block_hash": "9MzuZrRPW1BGpFnZJUJg6SzCrixPpJDfjsNeUobRXsLe",
                "outcome": {
                    "executor_id": DUMMY_CONTRACT_ID,
                    "logs": [],
                    "receipt_ids": [],
                    "gas_burnt": 2428033654712u64,
                    "tokens_burnt": "242803365471200000000",
                    "status": status
                }
            })
        })
        .collect();

    json!({
        "final_execution_status": "FINAL",
        "status": {"SuccessValue": ""},
        "transaction": {
            "signer_id": DUMMY_ACCOUNT_ID,
            "receiver_id": DUMMY_CONTRACT_ID,
            "hash": DUMMY_TX_HASH,
            "nonce": 1,
            "actions": []
        },
        "transaction_outcome": {
            "id": DUMMY_TX_HASH,
            "block_hash": "9MzuZrRPW1BGpFnZJUJg6SzCrixPpJDfjsNeUobRXsLe",
            "outcome": {
                "executor_id": DUMMY_ACCOUNT_ID,
                "logs": [],
                "receipt_ids": [DUMMY_RECEIPT_ID],
                "gas_burnt": 223182562500u64,
                "status": {"SuccessReceiptId": DUMMY_RECEIPT_ID}
            }
        },
        "receipts_outcome": receipts
    })
}
