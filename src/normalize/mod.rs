//! Decoding of raw platform JSON into the unified model.
//!
//! One module per platform. Every decoder returns a typed value or a
//! `DecodeError`; deciding what to skip is up to the assembler.

pub mod kalshi;
pub mod polymarket;
pub mod time;
pub mod value;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("invalid field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),
}

pub use kalshi::StrikeMapping;
