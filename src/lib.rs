//! NEAR Outcome Resolver Library
//!
//! This crate resolves transactions a wallet has submitted on behalf of a page:
//! it reads the transaction hash from the page URL, fetches the finalised
//! outcome from a NEAR JSON-RPC node, and decodes the contract's return value
//! for display.

pub mod api;
pub mod config;
pub mod error;
pub mod near_client;
pub mod outcome;
pub mod page;
pub mod pages;
pub mod price_feed;
pub mod storage;

// Re-export commonly used types
pub use config::{ApiConfig, Config, ContractsConfig, NetworkConfig, ReceiptLookup};
pub use error::{ErrorKind, ResolveError};
pub use near_client::NearRpcClient;
pub use outcome::{decode, DecodedValue, OutcomeResolver, TransactionReference};
pub use page::{DisplayState, PageLocation, Session};
