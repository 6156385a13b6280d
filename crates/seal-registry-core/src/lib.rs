//! # Seal Registry Core
//!
//! Pure primitives for the Seal Registry: fixed-size seal types, merkle
//! inclusion proofs, signature envelopes and boundary validation.
//!
//! This crate contains no I/O, no storage, no networking.
//!
//! ## Key Types
//!
//! - [`DocumentRecord`] - A sealed document
//! - [`BatchRecord`] - Documents sealed together in one call
//! - [`Hash32`] - Content hashes, merkle roots and path nodes
//! - [`SealSignature`], [`SealPublicKey`] - Fixed 512/256-byte envelopes
//! - [`CryptoProvider`] - The pluggable hash and signature primitives
//!
//! ## Boundary
//!
//! Raw requests enter as [`SealRequest`] and leave as [`DocumentInput`]; see
//! the [`input`] module.

pub mod batch;
pub mod crypto;
pub mod document;
pub mod error;
pub mod input;
pub mod merkle;
pub mod status;
pub mod types;
pub mod validation;

pub use batch::BatchRecord;
pub use crypto::{
    signed_message, CryptoProvider, Ed25519Blake3, Hash32, Keypair, SealPublicKey, SealSignature,
    PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
pub use document::{DocumentInput, DocumentRecord, NewDocument};
pub use error::{BoundaryError, ValidationError};
pub use input::SealRequest;
pub use merkle::{verify_merkle_path, MerkleTree};
pub use status::{BatchStatus, DocumentStatus, StatusPolicy};
pub use types::{
    AsciiText, BatchId, Category, Description, DocumentId, Principal, Title,
    MAX_MERKLE_PATH_LEN,
};
pub use validation::validate_document_input;
