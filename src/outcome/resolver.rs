//! Outcome resolver
//!
//! Takes the transaction hash a wallet redirect leaves in the page query,
//! fetches the finalised outcome from the node, and decodes the contract's
//! return value.

use std::collections::HashMap;
use tracing::{debug, info};

use super::decode::{decode, DecodedValue};
use crate::config::ReceiptLookup;
use crate::error::ResolveError;
use crate::near_client::{ExecutionStatus, FinalExecutionOutcome, NearRpcClient, TxWaitUntil};
use crate::page::PageLocation;

/// Query key the wallet appends after signing
pub const TRANSACTION_HASHES_KEY: &str = "transactionHashes";

/// Index of the receipt carrying the contract's return value.
///
/// Receipt 0 is the initiating call; for a single account-to-account function
/// call the value surfaces in the first follow-up receipt.
pub const SUCCESS_RECEIPT_INDEX: usize = 1;

/// Identifies a submitted transaction to query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReference {
    /// Transaction hash (base58)
    pub hash: String,
    /// Sender or receiver account passed to the node
    pub account_id: String,
}

/// Resolves transaction outcomes for a single contract account.
#[derive(Debug, Clone)]
pub struct OutcomeResolver {
    client: NearRpcClient,
    contract_id: String,
    receipt_lookup: ReceiptLookup,
}

impl OutcomeResolver {
    pub fn new(client: NearRpcClient, contract_id: &str) -> Self {
        Self {
            client,
            contract_id: contract_id.to_string(),
            receipt_lookup: ReceiptLookup::default(),
        }
    }

    pub fn with_receipt_lookup(mut self, receipt_lookup: ReceiptLookup) -> Self {
        self.receipt_lookup = receipt_lookup;
        self
    }

    pub fn contract_id(&self) -> &str {
        &self.contract_id
    }

    /// Looks up the pending transaction in the page query.
    ///
    /// `None` means there is nothing to resolve. An empty value counts as absent.
    pub fn extract_reference(&self, query: &HashMap<String, String>) -> Option<TransactionReference> {
        extract_reference(query, &self.contract_id)
    }

    /// Fetches the transaction outcome at `FINAL` finality.
    pub async fn fetch_outcome(
        &self,
        reference: &TransactionReference,
    ) -> Result<FinalExecutionOutcome, ResolveError> {
        debug!(
            "Fetching outcome of {} for {}",
            reference.hash, reference.account_id
        );
        self.client
            .tx_status(&reference.hash, &reference.account_id, TxWaitUntil::Final)
            .await
    }

    /// Extracts the base64 success value using the configured lookup strategy.
    pub fn extract_success_value<'a>(
        &self,
        outcome: &'a FinalExecutionOutcome,
    ) -> Result<&'a str, ResolveError> {
        match self.receipt_lookup {
            ReceiptLookup::FixedIndex => extract_success_value(outcome),
            ReceiptLookup::FirstSuccessValue => first_success_value(outcome),
        }
    }

    /// Resolves the pending transaction named in `query`, if any.
    ///
    /// Returns `Ok(None)` without touching the network when the query holds no
    /// reference. Failures are returned as-is; nothing is retried.
    pub async fn resolve(
        &self,
        query: &HashMap<String, String>,
    ) -> Result<Option<DecodedValue>, ResolveError> {
        let Some(reference) = self.extract_reference(query) else {
            return Ok(None);
        };
        self.resolve_reference(&reference).await.map(Some)
    }

    /// Fetches, extracts and decodes the outcome of one transaction.
    pub async fn resolve_reference(
        &self,
        reference: &TransactionReference,
    ) -> Result<DecodedValue, ResolveError> {
        let outcome = self.fetch_outcome(reference).await?;
        let success_value = self.extract_success_value(&outcome)?;
        let value = decode(success_value)?;

        info!("Resolved outcome of transaction {}", reference.hash);
        Ok(value)
    }

    /// Resolves the page's pending transaction and consumes it.
    ///
    /// On success the page query is cleared so the same reference is never
    /// resolved twice. On failure the location is left untouched.
    pub async fn resolve_page(
        &self,
        location: &mut PageLocation,
    ) -> Result<Option<(TransactionReference, DecodedValue)>, ResolveError> {
        let query = location.query_map();
        let Some(reference) = self.extract_reference(&query) else {
            return Ok(None);
        };

        let value = self.resolve_reference(&reference).await?;

        location.clear_query();
        Ok(Some((reference, value)))
    }
}

/// Looks up `transactionHashes` in a query mapping.
pub fn extract_reference(
    query: &HashMap<String, String>,
    account_id: &str,
) -> Option<TransactionReference> {
    query
        .get(TRANSACTION_HASHES_KEY)
        .filter(|hash| !hash.is_empty())
        .map(|hash| TransactionReference {
            hash: hash.clone(),
            account_id: account_id.to_string(),
        })
}

/// Reads `receipts_outcome[1].outcome.status.SuccessValue`.
///
/// # Returns
///
/// * `Ok(&str)` - The base64 success value
/// * `Err(ResolveError::MalformedResponse)` - Fewer than two receipts, or receipt 1 did not succeed with a value
pub fn extract_success_value(outcome: &FinalExecutionOutcome) -> Result<&str, ResolveError> {
    let receipt = outcome
        .receipts_outcome
        .get(SUCCESS_RECEIPT_INDEX)
        .ok_or_else(|| {
            ResolveError::MalformedResponse(format!(
                "expected at least {} receipts, got {}",
                SUCCESS_RECEIPT_INDEX + 1,
                outcome.receipts_outcome.len()
            ))
        })?;

    match &receipt.outcome.status {
        ExecutionStatus::SuccessValue(value) => Ok(value.as_str()),
        other => Err(ResolveError::MalformedResponse(format!(
            "receipt {} has no success value (status: {})",
            SUCCESS_RECEIPT_INDEX,
            describe_status(other)
        ))),
    }
}

/// Scans follow-up receipts for the first one carrying a success value.
pub fn first_success_value(outcome: &FinalExecutionOutcome) -> Result<&str, ResolveError> {
    outcome
        .receipts_outcome
        .iter()
        .skip(SUCCESS_RECEIPT_INDEX)
        .find_map(|receipt| match &receipt.outcome.status {
            ExecutionStatus::SuccessValue(value) => Some(value.as_str()),
            _ => None,
        })
        .ok_or_else(|| {
            ResolveError::MalformedResponse(format!(
                "none of {} receipts after the first carries a success value",
                outcome.receipts_outcome.len().saturating_sub(SUCCESS_RECEIPT_INDEX)
            ))
        })
}

fn describe_status(status: &ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Unknown => "Unknown".to_string(),
        ExecutionStatus::Failure(failure) => format!("Failure {}", failure),
        ExecutionStatus::SuccessReceiptId(id) => format!("SuccessReceiptId {}", id),
        ExecutionStatus::SuccessValue(_) => "SuccessValue".to_string(),
    }
}
