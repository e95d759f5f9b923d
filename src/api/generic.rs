//! Generic API structures and handlers
//!
//! This module contains the shared response envelope, the page handlers, and
//! the server wiring. The API is read-only: it never signs or submits
//! transactions, it only resolves ones the wallet already submitted.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use warp::{http::{Method, StatusCode}, Filter, Rejection, Reply};

use crate::config::{Config, ReceiptLookup};
use crate::error::{ErrorKind, ResolveError};
use crate::outcome::{DecodedValue, OutcomeResolver, TransactionReference};
use crate::page::{PageLocation, Session};
use crate::pages::{HelloNearPage, PriceFeedPage};
use crate::price_feed::AssetDecimals;
use crate::storage::LocalStore;

/// Header carrying the account the wallet is signed in with
pub const SIGNED_ACCOUNT_HEADER: &str = "x-near-account-id";

// ============================================================================
// SHARED REQUEST/RESPONSE STRUCTURES
// ============================================================================

/// Standardized response structure for all API endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the request was successful
    pub success: bool,
    /// Response data (if successful)
    pub data: Option<T>,
    /// Error message (if failed)
    pub error: Option<String>,
}

/// Maps a resolution failure to the HTTP status reported to clients.
pub fn status_for(error: &ResolveError) -> StatusCode {
    match error.kind() {
        ErrorKind::Network => StatusCode::BAD_GATEWAY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::MalformedResponse | ErrorKind::Encoding => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

// ============================================================================
// HANDLERS
// ============================================================================

/// Handler for the greeting page.
pub async fn hello_near_handler(
    page: Arc<HelloNearPage>,
    session: Session,
    signed_account: Option<String>,
    query: String,
) -> Result<impl Reply, Rejection> {
    let session = session.with_signed_account(signed_account);
    let mut location = PageLocation::new("/hello-near", Some(&query));
    let state = page.on_load(&session, &mut location).await;

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some(state),
        error: None,
    }))
}

/// Handler for the price feed page.
pub async fn price_feed_handler(
    page: Arc<PriceFeedPage>,
    session: Session,
    query: String,
) -> Result<impl Reply, Rejection> {
    let mut location = PageLocation::new("/price-feed", Some(&query));
    let state = page.on_load(&session, &mut location).await;

    Ok(warp::reply::json(&ApiResponse {
        success: true,
        data: Some(state),
        error: None,
    }))
}

/// Handler for direct outcome lookups.
///
/// Query parameters:
/// - transactionHashes: transaction hash (absent means nothing to resolve)
/// - account_id: account passed to the node for the lookup
pub async fn outcome_handler(
    session: Session,
    receipt_lookup: ReceiptLookup,
    store: Arc<LocalStore>,
    query: String,
) -> Result<impl Reply, Rejection> {
    let location = PageLocation::new("/outcome", Some(&query));
    let params = location.query_map();

    let account_id = params
        .get("account_id")
        .filter(|account| !account.is_empty())
        .ok_or_else(|| warp::reject::custom(InvalidRequest("Missing account_id parameter".to_string())))?;

    let resolver = OutcomeResolver::new(session.client().clone(), account_id)
        .with_receipt_lookup(receipt_lookup);
    let Some(reference) = resolver.extract_reference(&params) else {
        return Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse::<DecodedValue> {
                success: true,
                data: None,
                error: None,
            }),
            StatusCode::OK,
        ));
    };

    match resolve_and_record(&resolver, &reference, &store).await {
        Ok(value) => Ok(warp::reply::with_status(
            warp::reply::json(&ApiResponse {
                success: true,
                data: Some(value),
                error: None,
            }),
            StatusCode::OK,
        )),
        Err(e) => {
            error!("Outcome lookup for {} failed: {}", reference.hash, e);
            Ok(warp::reply::with_status(
                warp::reply::json(&ApiResponse::<DecodedValue> {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                }),
                status_for(&e),
            ))
        }
    }
}

async fn resolve_and_record(
    resolver: &OutcomeResolver,
    reference: &TransactionReference,
    store: &LocalStore,
) -> Result<DecodedValue, ResolveError> {
    let value = resolver.resolve_reference(reference).await?;
    if let Err(e) = store.record_last_transaction(&reference.hash).await {
        error!("Failed to record last transaction hash: {:#}", e);
    }
    Ok(value)
}

// ============================================================================
// WARP FILTER HELPERS
// ============================================================================

/// Raw query string, or an empty string when the request has none.
fn optional_raw_query() -> impl Filter<Extract = (String,), Error = std::convert::Infallible> + Clone {
    warp::query::raw()
        .or(warp::any().map(String::new))
        .unify()
}

fn with_shared<T: Clone + Send + Sync + 'static>(
    value: T,
) -> impl Filter<Extract = (T,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || value.clone())
}

// ============================================================================
// CUSTOM REJECTION TYPES
// ============================================================================

/// Custom rejection for malformed requests
#[derive(Debug)]
pub struct InvalidRequest(pub String);

impl warp::reject::Reject for InvalidRequest {}

// ============================================================================
// CORS CONFIGURATION
// ============================================================================

/// Creates a CORS filter based on the configured allowed origins.
fn create_cors_filter(allowed_origins: &[String]) -> warp::cors::Builder {
    let methods = vec![Method::GET, Method::OPTIONS];

    if allowed_origins.contains(&"*".to_string()) {
        warp::cors()
            .allow_any_origin()
            .allow_methods(methods)
            .allow_headers(vec!["content-type", SIGNED_ACCOUNT_HEADER])
    } else {
        let origins: Vec<&str> = allowed_origins.iter().map(|s| s.as_str()).collect();
        warp::cors()
            .allow_origins(origins)
            .allow_methods(methods)
            .allow_headers(vec!["content-type", SIGNED_ACCOUNT_HEADER])
    }
}

// ============================================================================
// REJECTION HANDLER
// ============================================================================

/// Global rejection handler for all API routes.
pub async fn handle_rejection(rej: Rejection) -> Result<impl Reply, std::convert::Infallible> {
    let (status, message) = if let Some(err) = rej.find::<InvalidRequest>() {
        (StatusCode::BAD_REQUEST, err.0.clone())
    } else if rej.is_not_found() {
        (StatusCode::NOT_FOUND, "Endpoint not found".to_string())
    } else if rej.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string())
    } else {
        error!("Unhandled rejection: {:?}", rej);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(message),
        }),
        status,
    ))
}

// ============================================================================
// API SERVER IMPLEMENTATION
// ============================================================================

/// REST API server exposing the pages.
pub struct ApiServer {
    /// Service configuration
    config: Arc<Config>,
    /// Session for the configured network (nobody signed in)
    session: Session,
    /// Local storage for informational state
    store: Arc<LocalStore>,
    hello_near: Arc<HelloNearPage>,
    price_feed: Arc<PriceFeedPage>,
}

impl ApiServer {
    /// Creates a new API server for the given configuration and store.
    ///
    /// # Returns
    ///
    /// * `Ok(ApiServer)` - Server ready to run
    /// * `Err(anyhow::Error)` - The RPC client could not be created
    pub fn new(config: Config, store: Arc<LocalStore>) -> Result<Self> {
        let session = Session::from_config(&config).context("Failed to create NEAR session")?;
        let receipt_lookup = config.resolver.receipt_lookup;

        let hello_near = Arc::new(HelloNearPage::new(
            &config.contracts.hello_near,
            receipt_lookup,
            store.clone(),
        ));
        let price_feed = Arc::new(PriceFeedPage::new(
            &config.contracts.price_oracle,
            receipt_lookup,
            AssetDecimals::with_overrides(&config.assets),
            store.clone(),
        ));

        Ok(Self {
            config: Arc::new(config),
            session,
            store,
            hello_near,
            price_feed,
        })
    }

    /// Starts the API server and begins handling HTTP requests.
    pub async fn run(&self) -> Result<()> {
        info!(
            "Starting API server on {}:{}",
            self.config.api.host, self.config.api.port
        );

        let routes = self.create_routes();

        let addr: std::net::SocketAddr = format!("{}:{}", self.config.api.host, self.config.api.port)
            .parse()
            .context("Failed to parse API server address")?;

        warp::serve(routes).run(addr).await;

        Ok(())
    }

    /// Creates all API routes for the server.
    pub(crate) fn create_routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        // Health check endpoint - returns service status
        let network = self.config.network.name.clone();
        let health = warp::path("health").and(warp::get()).map(move || {
            warp::reply::json(&ApiResponse::<String> {
                success: true,
                data: Some(format!("Outcome resolver is running on {}", network)),
                error: None,
            })
        });

        // GET /hello-near?transactionHashes=... - greeting page
        let hello_near = warp::path("hello-near")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_shared(self.hello_near.clone()))
            .and(with_shared(self.session.clone()))
            .and(warp::header::optional::<String>(SIGNED_ACCOUNT_HEADER))
            .and(optional_raw_query())
            .and_then(hello_near_handler);

        // GET /price-feed?transactionHashes=... - price feed page
        let price_feed = warp::path("price-feed")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_shared(self.price_feed.clone()))
            .and(with_shared(self.session.clone()))
            .and(optional_raw_query())
            .and_then(price_feed_handler);

        // GET /outcome?transactionHashes=...&account_id=... - direct lookup
        let outcome = warp::path("outcome")
            .and(warp::path::end())
            .and(warp::get())
            .and(with_shared(self.session.clone()))
            .and(with_shared(self.config.resolver.receipt_lookup))
            .and(with_shared(self.store.clone()))
            .and(optional_raw_query())
            .and_then(outcome_handler);

        health
            .or(hello_near)
            .or(price_feed)
            .or(outcome)
            .with(create_cors_filter(&self.config.api.cors_origins))
            .recover(handle_rejection)
    }

    /// Public method for testing - exposes routes for integration tests
    #[allow(dead_code)] // Used by tests
    pub fn test_routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = std::convert::Infallible> + Clone {
        self.create_routes()
    }
}
