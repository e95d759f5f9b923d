//! Page State Module
//!
//! Addressable page state (path and query) with the one-shot clearing of a
//! consumed transaction reference, the explicitly passed wallet session, and
//! the display state handed to the presentation layer.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

use crate::config::Config;
use crate::error::{ErrorKind, ResolveError};
use crate::near_client::NearRpcClient;

// ============================================================================
// PAGE LOCATION
// ============================================================================

/// Current location of a page: its path plus the ordered query pairs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLocation {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl PageLocation {
    /// Builds a location from a path and a raw query string (without `?`).
    pub fn new(path: &str, raw_query: Option<&str>) -> Self {
        let query = raw_query
            .map(|raw| {
                url::form_urlencoded::parse(raw.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self {
            path: path.to_string(),
            query,
        }
    }

    /// Parses a full page URL such as `http://localhost:3000/price-feed?transactionHashes=ABC`.
    pub fn parse(page_url: &str) -> Result<Self, url::ParseError> {
        let url = Url::parse(page_url)?;
        Ok(Self::new(url.path(), url.query()))
    }

    /// Query mapping; the first occurrence of a key wins.
    pub fn query_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        for (key, value) in &self.query {
            map.entry(key.clone()).or_insert_with(|| value.clone());
        }
        map
    }

    /// Drops the whole query, leaving only the path.
    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Path plus query, as it would appear in the address bar.
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query.iter())
            .finish();
        format!("{}?{}", self.path, query)
    }
}

// ============================================================================
// SESSION
// ============================================================================

/// Wallet session threaded into every page operation.
///
/// Holds the RPC client for the selected network and the signed-in account,
/// if any. Signing itself stays with the wallet.
#[derive(Debug, Clone)]
pub struct Session {
    /// Network name (e.g. "testnet")
    pub network: String,
    /// Account the user signed in with, if any
    pub signed_account_id: Option<String>,
    client: NearRpcClient,
}

impl Session {
    pub fn new(network: &str, client: NearRpcClient, signed_account_id: Option<String>) -> Self {
        Self {
            network: network.to_string(),
            signed_account_id,
            client,
        }
    }

    /// Creates a session for the configured network with nobody signed in.
    pub fn from_config(config: &Config) -> Result<Self, ResolveError> {
        let client = NearRpcClient::new(
            &config.network.rpc_url,
            std::time::Duration::from_millis(config.network.request_timeout_ms),
        )?;
        Ok(Self::new(&config.network.name, client, None))
    }

    /// Returns a copy of this session signed in as `account_id`.
    pub fn with_signed_account(&self, account_id: Option<String>) -> Self {
        Self {
            signed_account_id: account_id,
            ..self.clone()
        }
    }

    pub fn client(&self) -> &NearRpcClient {
        &self.client
    }

    pub fn is_signed_in(&self) -> bool {
        self.signed_account_id.is_some()
    }
}

// ============================================================================
// DISPLAY STATE
// ============================================================================

/// What a page shows for a value that is loaded asynchronously.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DisplayState<T> {
    /// Nothing requested yet
    Idle,
    /// A request is outstanding
    Loading,
    /// The value is available
    Ready { value: T },
    /// The request failed; the page may retry
    Failed { kind: ErrorKind, message: String },
}

impl<T> DisplayState<T> {
    pub fn failed(error: &ResolveError) -> Self {
        DisplayState::Failed {
            kind: error.kind(),
            message: error.to_string(),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DisplayState::Ready { .. })
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            DisplayState::Ready { value } => Some(value),
            _ => None,
        }
    }
}
