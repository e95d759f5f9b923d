//! REST API Server Module
//!
//! This module provides a REST API server exposing the greeting and price
//! feed pages, plus a direct outcome lookup endpoint.
//!
//! The API holds no keys and never signs; it only reads transaction outcomes.

// Shared envelope, handlers and server wiring
mod generic;

// Re-export ApiServer for convenience
pub use generic::ApiServer;
// Re-export response helpers for testing
#[allow(unused_imports)]
pub use generic::{status_for, ApiResponse, InvalidRequest, SIGNED_ACCOUNT_HEADER};
