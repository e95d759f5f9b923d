//! Greeting page
//!
//! Shows the greeting stored in the hello-near contract and the decoded
//! outcome of the last transaction the wallet redirected back with.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::remember_transaction;
use crate::config::ReceiptLookup;
use crate::error::ResolveError;
use crate::outcome::{decode_bytes, DecodedValue, OutcomeResolver};
use crate::page::{DisplayState, PageLocation, Session};
use crate::storage::LocalStore;

/// View method returning the stored greeting
pub const GET_GREETING_METHOD: &str = "get_greeting";

/// Everything the greeting page renders after loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloNearState {
    /// Contract the page interacts with
    pub contract_id: String,
    /// Whether the greeting form is shown
    pub logged_in: bool,
    pub greeting: DisplayState<String>,
    /// Outcome of the pending transaction; `Idle` when there was none
    pub outcome: DisplayState<DecodedValue>,
    /// Page address after loading (query cleared once resolved)
    pub location: String,
}

/// The greeting page.
pub struct HelloNearPage {
    contract_id: String,
    receipt_lookup: ReceiptLookup,
    store: Arc<LocalStore>,
}

impl HelloNearPage {
    pub fn new(contract_id: &str, receipt_lookup: ReceiptLookup, store: Arc<LocalStore>) -> Self {
        Self {
            contract_id: contract_id.to_string(),
            receipt_lookup,
            store,
        }
    }

    /// Reads the current greeting with a `get_greeting` view call.
    pub async fn load_greeting(&self, session: &Session) -> Result<String, ResolveError> {
        let bytes = session
            .client()
            .view_function(&self.contract_id, GET_GREETING_METHOD, &serde_json::json!({}))
            .await?;

        match decode_bytes(&bytes) {
            DecodedValue::Text(text) => Ok(text),
            DecodedValue::Json(serde_json::Value::String(text)) => Ok(text),
            DecodedValue::Json(other) => Err(ResolveError::MalformedResponse(format!(
                "{} returned a non-string value: {}",
                GET_GREETING_METHOD, other
            ))),
        }
    }

    /// Loads the page: fetches the greeting and resolves any pending transaction.
    ///
    /// The greeting and the outcome fail independently of each other.
    pub async fn on_load(&self, session: &Session, location: &mut PageLocation) -> HelloNearState {
        let greeting = match self.load_greeting(session).await {
            Ok(greeting) => DisplayState::Ready { value: greeting },
            Err(e) => {
                error!("Failed to load greeting from {}: {}", self.contract_id, e);
                DisplayState::failed(&e)
            }
        };

        let resolver = OutcomeResolver::new(session.client().clone(), &self.contract_id)
            .with_receipt_lookup(self.receipt_lookup);
        let outcome = match resolver.resolve_page(location).await {
            Ok(Some((reference, value))) => {
                info!("Greeting page resolved transaction {}", reference.hash);
                remember_transaction(&self.store, &reference.hash).await;
                DisplayState::Ready { value }
            }
            Ok(None) => DisplayState::Idle,
            Err(e) => {
                error!("Failed to resolve pending transaction: {}", e);
                DisplayState::failed(&e)
            }
        };

        HelloNearState {
            contract_id: self.contract_id.clone(),
            logged_in: session.is_signed_in(),
            greeting,
            outcome,
            location: location.href(),
        }
    }
}
