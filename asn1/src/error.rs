//! Error types for ASN.1 element decoding.

use std::num::ParseIntError;

use thiserror::Error;

/// Errors that can occur while turning DER TLVs into ASN.1 elements.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    // Boolean errors
    #[error("invalid boolean")]
    InvalidBoolean,

    // Integer errors
    #[error("INTEGER: no data")]
    IntegerNoData,

    // ObjectIdentifier errors
    #[error("OBJECT IDENTIFIER: no data")]
    ObjectIdentifierNoData,
    #[error("OBJECT IDENTIFIER: incomplete encoding")]
    ObjectIdentifierIncompleteEncoding,
    #[error("OBJECT IDENTIFIER: too few components (need at least 2)")]
    ObjectIdentifierTooFewComponents,
    #[error("OBJECT IDENTIFIER: invalid component: {0}")]
    ObjectIdentifierInvalidComponent(ParseIntError),

    // BitString errors
    #[error("BIT STRING: no data")]
    BitStringNoData,
    #[error("BIT STRING: unused bits {0} out of range (must be 0-7)")]
    BitStringUnusedBitsOutOfRange(u8),

    // Context-specific errors
    #[error("invalid context-specific value: {slot}, {msg}")]
    InvalidContextSpecific { slot: u8, msg: String },

    // Constructed value in a primitive-only position, or the reverse
    #[error("unexpected {0} encoding")]
    UnexpectedEncoding(&'static str),

    // DER errors
    #[error("invalid DER encoding: {0}")]
    FailedToDecodeDer(#[source] keyprobe_der::error::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
