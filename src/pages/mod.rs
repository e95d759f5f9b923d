//! Pages Module
//!
//! The two views of the front-end: the greeting page and the price feed page.
//! Each page resolves the transaction a wallet redirect left in its URL and
//! turns the outcome into display state; failures become a `Failed` state
//! the presentation layer can render and recover from.

mod hello_near;
mod price_feed;

pub use hello_near::{HelloNearPage, HelloNearState};
pub use price_feed::{PriceFeedPage, PriceFeedState};

use std::sync::Arc;
use tracing::warn;

use crate::storage::LocalStore;

/// Records the resolved hash without letting a storage failure affect the page.
async fn remember_transaction(store: &Arc<LocalStore>, hash: &str) {
    if let Err(e) = store.record_last_transaction(hash).await {
        warn!("Failed to record last transaction hash {}: {:#}", hash, e);
    }
}
