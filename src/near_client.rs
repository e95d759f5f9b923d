//! NEAR RPC Client Module
//!
//! This module provides a client for communicating with NEAR nodes via their
//! JSON-RPC API. It supports transaction status queries at a requested
//! finality and read-only contract view calls.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ResolveError;

/// Cause name the node reports for a hash it has never seen
const UNKNOWN_TRANSACTION: &str = "UNKNOWN_TRANSACTION";

// ============================================================================
// JSON-RPC TYPES
// ============================================================================

#[derive(Debug, Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

/// NEAR JSON-RPC error object.
///
/// Structured errors carry `name` and `cause`; older nodes only fill `code`,
/// `message` and `data`.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cause: Option<JsonRpcErrorCause>,
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorCause {
    pub name: String,
    #[serde(default)]
    pub info: Option<serde_json::Value>,
}

impl JsonRpcError {
    /// Whether the node reports the transaction as unknown.
    pub fn is_unknown_transaction(&self) -> bool {
        if let Some(cause) = &self.cause {
            return cause.name == UNKNOWN_TRANSACTION;
        }
        matches!(&self.data, Some(serde_json::Value::String(data)) if data.contains(UNKNOWN_TRANSACTION))
    }

    fn describe(&self) -> String {
        let detail = match (&self.cause, &self.data) {
            (Some(cause), _) => cause.name.clone(),
            (None, Some(data)) => data.to_string(),
            (None, None) => String::new(),
        };
        format!("{} (code: {}) {}", self.message, self.code, detail)
            .trim_end()
            .to_string()
    }
}

// ============================================================================
// TRANSACTION OUTCOME STRUCTURES
// ============================================================================

/// Level of commitment the node waits for before answering a status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxWaitUntil {
    None,
    Included,
    ExecutedOptimistic,
    IncludedFinal,
    Executed,
    /// Block irreversibly committed
    Final,
}

/// Per-receipt execution status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// The execution is pending or unknown
    Unknown,
    /// Execution failed
    Failure(serde_json::Value),
    /// Execution succeeded with a base64-encoded return value
    SuccessValue(String),
    /// Execution succeeded, producing a follow-up receipt
    SuccessReceiptId(String),
}

/// Overall transaction execution status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum FinalExecutionStatus {
    #[default]
    NotStarted,
    Started,
    Failure(serde_json::Value),
    SuccessValue(String),
}

/// Execution outcome of a transaction or receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Account that executed the receipt
    #[serde(default)]
    pub executor_id: String,
    /// Logs emitted during execution
    #[serde(default)]
    pub logs: Vec<String>,
    /// Receipts produced by this execution
    #[serde(default)]
    pub receipt_ids: Vec<String>,
    /// Gas burnt during execution
    #[serde(default)]
    pub gas_burnt: u64,
    /// Execution status
    pub status: ExecutionStatus,
}

/// Execution outcome with the id of the transaction or receipt it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcomeWithId {
    #[serde(default)]
    pub id: String,
    pub outcome: ExecutionOutcome,
    #[serde(default)]
    pub block_hash: Option<String>,
}

/// Minimal transaction view returned alongside the outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionView {
    pub signer_id: String,
    pub receiver_id: String,
    pub hash: String,
}

/// Result of the `tx` method: the transaction and every receipt it spawned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalExecutionOutcome {
    #[serde(default)]
    pub final_execution_status: Option<TxWaitUntil>,
    #[serde(default)]
    pub status: FinalExecutionStatus,
    #[serde(default)]
    pub transaction: Option<TransactionView>,
    #[serde(default)]
    pub transaction_outcome: Option<ExecutionOutcomeWithId>,
    /// Receipt outcomes in execution order
    #[serde(default)]
    pub receipts_outcome: Vec<ExecutionOutcomeWithId>,
}

/// Result of a `call_function` view query.
#[derive(Debug, Clone, Deserialize)]
struct ViewFunctionResult {
    #[serde(default)]
    result: Vec<u8>,
    #[serde(default)]
    logs: Vec<String>,
    /// Older nodes report contract errors inside an otherwise successful result
    #[serde(default)]
    error: Option<String>,
}

// ============================================================================
// NEAR CLIENT IMPLEMENTATION
// ============================================================================

/// Client for communicating with NEAR nodes via JSON-RPC
#[derive(Debug, Clone)]
pub struct NearRpcClient {
    /// HTTP client for making requests
    client: Client,
    /// JSON-RPC endpoint (e.g., "https://rpc.testnet.near.org")
    rpc_url: String,
}

impl NearRpcClient {
    /// Creates a new client for the given endpoint.
    ///
    /// Every request is bounded by `timeout`; a node that never answers
    /// surfaces as [`ResolveError::Network`].
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - JSON-RPC endpoint URL
    /// * `timeout` - Upper bound for a single request
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, ResolveError> {
        let client = Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()
            .map_err(|e| ResolveError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Queries the status of a transaction using the `tx` method.
    ///
    /// # Arguments
    ///
    /// * `hash` - Transaction hash (base58)
    /// * `account_id` - Sender or receiver account, used by the node for shard routing
    /// * `wait_until` - Finality the node waits for before answering
    ///
    /// # Returns
    ///
    /// * `Ok(FinalExecutionOutcome)` - Transaction and receipt outcomes
    /// * `Err(ResolveError::NotFound)` - The node does not know the transaction
    /// * `Err(ResolveError::Network)` - Transport or RPC failure
    /// * `Err(ResolveError::MalformedResponse)` - The result has an unexpected shape
    pub async fn tx_status(
        &self,
        hash: &str,
        account_id: &str,
        wait_until: TxWaitUntil,
    ) -> Result<FinalExecutionOutcome, ResolveError> {
        let params = serde_json::json!({
            "tx_hash": hash,
            "sender_account_id": account_id,
            "wait_until": wait_until,
        });

        match self.call("tx", params).await {
            Err(RpcFailure::Rpc(error)) if error.is_unknown_transaction() => {
                Err(ResolveError::NotFound(hash.to_string()))
            }
            Err(failure) => Err(failure.into_resolve_error(&self.rpc_url)),
            Ok(result) => parse_result(result, "tx"),
        }
    }

    /// Calls a read-only contract method at final finality.
    ///
    /// # Arguments
    ///
    /// * `contract_id` - Contract account
    /// * `method_name` - View method to call
    /// * `args` - JSON arguments
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<u8>)` - Raw bytes returned by the contract
    /// * `Err(ResolveError)` - Transport, RPC, or contract failure
    pub async fn view_function(
        &self,
        contract_id: &str,
        method_name: &str,
        args: &serde_json::Value,
    ) -> Result<Vec<u8>, ResolveError> {
        let args_bytes = serde_json::to_vec(args)
            .map_err(|e| ResolveError::Encoding(format!("Failed to encode view arguments: {}", e)))?;
        let params = serde_json::json!({
            "request_type": "call_function",
            "finality": "final",
            "account_id": contract_id,
            "method_name": method_name,
            "args_base64": STANDARD.encode(args_bytes),
        });

        let result = self
            .call("query", params)
            .await
            .map_err(|failure| failure.into_resolve_error(&self.rpc_url))?;
        let view: ViewFunctionResult = parse_result(result, "query")?;

        if let Some(error) = view.error {
            return Err(ResolveError::Network(format!(
                "View call {}.{} failed: {}",
                contract_id, method_name, error
            )));
        }
        for log in &view.logs {
            debug!("{}.{} log: {}", contract_id, method_name, log);
        }
        Ok(view.result)
    }

    /// Returns the endpoint URL of this client
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, RpcFailure> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: 1,
        };
        debug!("Sending {} request to {}", method, self.rpc_url);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcFailure::Transport(format!("Failed to send {} request: {}", method, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RpcFailure::Transport(format!("Failed to read {} response: {}", method, e)))?;

        // Error bodies are still JSON-RPC shaped on most nodes, so try them first.
        let parsed: JsonRpcResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(e) => {
                if !status.is_success() {
                    return Err(RpcFailure::Transport(format!(
                        "{} request returned HTTP {}",
                        method, status
                    )));
                }
                return Err(RpcFailure::Transport(format!(
                    "Failed to parse {} response: {}",
                    method, e
                )));
            }
        };

        if let Some(error) = parsed.error {
            warn!("JSON-RPC error for {}: {}", method, error.describe());
            return Err(RpcFailure::Rpc(error));
        }
        if !status.is_success() {
            return Err(RpcFailure::Transport(format!(
                "{} request returned HTTP {}",
                method, status
            )));
        }

        parsed
            .result
            .ok_or_else(|| RpcFailure::Transport(format!("No result in {} response", method)))
    }
}

/// Failure of a single JSON-RPC exchange, before it is mapped for the caller.
#[derive(Debug)]
enum RpcFailure {
    Transport(String),
    Rpc(JsonRpcError),
}

impl RpcFailure {
    fn into_resolve_error(self, rpc_url: &str) -> ResolveError {
        match self {
            RpcFailure::Transport(message) => {
                ResolveError::Network(format!("{} ({})", message, rpc_url))
            }
            RpcFailure::Rpc(error) => ResolveError::Network(format!(
                "JSON-RPC error from {}: {}",
                rpc_url,
                error.describe()
            )),
        }
    }
}

fn parse_result<T: DeserializeOwned>(
    result: serde_json::Value,
    method: &str,
) -> Result<T, ResolveError> {
    serde_json::from_value(result).map_err(|e| {
        ResolveError::MalformedResponse(format!("Unexpected {} result shape: {}", method, e))
    })
}
