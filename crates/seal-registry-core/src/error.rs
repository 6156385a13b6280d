//! Error types for the Seal Registry Core.

use thiserror::Error;

/// Errors raised while turning a raw request into validated seal input.
///
/// These are boundary rejections: the engine never sees input that failed
/// here, and nothing is ever truncated or padded to make it fit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundaryError {
    #[error("{field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{field}: invalid hex: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("text exceeds maximum length of {max} bytes (got {actual})")]
    TextTooLong { max: usize, actual: usize },

    #[error("text contains non-printable or non-ascii characters")]
    NonAsciiText,

    #[error("merkle path exceeds maximum length of {max} (got {actual})")]
    MerklePathTooLong { max: usize, actual: usize },
}

/// Seal-time validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("merkle proof does not lead to the claimed root")]
    InvalidProof,

    #[error("signature verification failed")]
    InvalidSignature,
}
