//! Transaction Outcome Module
//!
//! Resolution of submitted transactions into display-ready values:
//! reference extraction, outcome lookup, success value extraction and decoding.

mod decode;
mod resolver;

pub use decode::{decode, decode_bytes, DecodedValue};
pub use resolver::{
    extract_reference, extract_success_value, first_success_value, OutcomeResolver,
    TransactionReference, SUCCESS_RECEIPT_INDEX, TRANSACTION_HASHES_KEY,
};
