//! # Seal Registry
//!
//! A tamper-evident document sealing registry. Submitters register a
//! document's content hash together with a merkle inclusion proof and a
//! signature. The registry guarantees that a content hash is sealed at most
//! once, assigns gapless ids, and lets only the owner change a document's
//! status afterwards.
//!
//! ## Overview
//!
//! - **Sealing**: [`Registry::seal_document`] and the all-or-nothing
//!   [`Registry::seal_document_batch`]
//! - **Status**: [`Registry::update_document_status`], gated by ownership
//!   and the configured [`StatusPolicy`]
//! - **Verification**: [`Registry::verify_signature_of`] plus stateless
//!   merkle and signature checks
//!
//! ## Usage
//!
//! ```rust,no_run
//! use seal_registry::{Registry, RegistryConfig};
//! use seal_registry::core::{Principal, SealRequest};
//! use seal_registry::store::SqliteStore;
//!
//! async fn example(request: SealRequest) {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let registry = Registry::new(store, RegistryConfig::default());
//!
//!     let caller = Principal::new("alice");
//!     let input = request.into_input().unwrap();
//!     let id = registry.seal_document(input, &caller).await.unwrap();
//!
//!     registry
//!         .update_document_status(id, "revoked", &caller)
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `seal_registry::core` - Primitives (hashes, envelopes, records, merkle)
//! - `seal_registry::store` - Ledger traits, SQLite and in-memory stores

pub mod access;
pub mod config;
pub mod error;
pub mod registry;

pub use seal_registry_core as core;
pub use seal_registry_store as store;

pub use access::{authorize_status_change, StatusChange};
pub use config::RegistryConfig;
pub use error::{RegistryError, Result};
pub use registry::{Registry, AUDIT_TARGET};

pub use seal_registry_core::{
    BatchId, BatchRecord, DocumentId, DocumentInput, DocumentRecord, DocumentStatus, Hash32,
    Keypair, Principal, SealPublicKey, SealRequest, SealSignature, StatusPolicy,
};
