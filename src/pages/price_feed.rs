//! Price feed page
//!
//! After `query_price_feed` is signed, the wallet redirects back with the
//! transaction hash; the page resolves it and renders the returned snapshot.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::remember_transaction;
use crate::config::ReceiptLookup;
use crate::error::ResolveError;
use crate::outcome::{DecodedValue, OutcomeResolver};
use crate::page::{DisplayState, PageLocation, Session};
use crate::price_feed::{build_view, AssetDecimals, PriceData, PriceFeedView};
use crate::storage::LocalStore;

/// Everything the price feed page renders after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedState {
    pub contract_id: String,
    /// `Idle` until a transaction has been resolved
    pub prices: DisplayState<PriceFeedView>,
    /// Page address after loading (query cleared once resolved)
    pub location: String,
}

/// The price feed page.
pub struct PriceFeedPage {
    contract_id: String,
    receipt_lookup: ReceiptLookup,
    asset_decimals: AssetDecimals,
    store: Arc<LocalStore>,
}

impl PriceFeedPage {
    pub fn new(
        contract_id: &str,
        receipt_lookup: ReceiptLookup,
        asset_decimals: AssetDecimals,
        store: Arc<LocalStore>,
    ) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            receipt_lookup,
            asset_decimals,
            store,
        }
    }

    /// Loads the page, resolving the pending `query_price_feed` transaction.
    pub async fn on_load(&self, session: &Session, location: &mut PageLocation) -> PriceFeedState {
        let resolver = OutcomeResolver::new(session.client().clone(), &self.contract_id)
            .with_receipt_lookup(self.receipt_lookup);

        let prices = match resolver.resolve_page(location).await {
            Ok(Some((reference, value))) => {
                remember_transaction(&self.store, &reference.hash).await;
                match parse_price_data(&value) {
                    Ok(data) => {
                        info!(
                            "Price feed resolved from {} with {} assets",
                            reference.hash,
                            data.prices.len()
                        );
                        DisplayState::Ready {
                            value: build_view(&data, &self.asset_decimals),
                        }
                    }
                    Err(e) => {
                        error!("Transaction {} did not return price data: {}", reference.hash, e);
                        DisplayState::failed(&e)
                    }
                }
            }
            Ok(None) => DisplayState::Idle,
            Err(e) => {
                error!("Failed to resolve price feed transaction: {}", e);
                DisplayState::failed(&e)
            }
        };

        PriceFeedState {
            contract_id: self.contract_id.clone(),
            prices,
            location: location.href(),
        }
    }
}

/// Interprets a decoded outcome as a price snapshot.
///
/// The callback returns the oracle payload as a JSON string, so a JSON string
/// holding JSON is unwrapped once more.
pub fn parse_price_data(value: &DecodedValue) -> Result<PriceData, ResolveError> {
    let json = match value {
        DecodedValue::Json(serde_json::Value::String(inner)) | DecodedValue::Text(inner) => {
            serde_json::from_str::<serde_json::Value>(inner).map_err(|_| {
                ResolveError::MalformedResponse("outcome is plain text, not price data".to_string())
            })?
        }
        DecodedValue::Json(json) => json.clone(),
    };

    serde_json::from_value(json)
        .map_err(|e| ResolveError::MalformedResponse(format!("invalid price data: {}", e)))
}
