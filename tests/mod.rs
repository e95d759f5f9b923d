//! Test module organization
//!
//! This module re-exports test helpers for use in test files.

mod helpers;

#[allow(unused_imports)]
pub use helpers::{
    build_test_client, build_test_config_with_mock_server, build_test_session,
    create_default_outcome, create_outcome_with_receipts, encode_success_value, page_query,
    DUMMY_ACCOUNT_ID, DUMMY_CONTRACT_ID, DUMMY_ORACLE_ID, DUMMY_RECEIPT_ID, DUMMY_TX_HASH,
};

#[allow(unused_imports)]
pub use helpers_mock_server::{
    create_price_data_json, mount_tx_error, mount_tx_outcome, mount_view_result,
    setup_mock_server_with_greeting, setup_mock_server_with_http_error,
    setup_mock_server_with_outcome, setup_mock_server_with_unknown_transaction,
};
