//! # Seal Registry Store
//!
//! Persistence for the Seal Registry: the Document Ledger and the Batch
//! Ledger, with SQLite and in-memory implementations.
//!
//! ## Overview
//!
//! The registry is storage-agnostic. It talks to the [`DocumentLedger`] and
//! [`BatchLedger`] traits (together, [`Store`]). The primary implementation
//! is [`SqliteStore`], with [`MemoryStore`] for testing.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use seal_registry_store::{DocumentLedger, SqliteStore};
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let next = store.next_document_id().await.unwrap();
//!     println!("next document id: {next}");
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Uniqueness**: a content hash maps to at most one document, ever
//! - **Gapless ids**: document and batch ids start at 1 and are consumed only
//!   by committed inserts
//! - **All-or-nothing batches**: a rejected batch writes nothing

pub mod error;
pub mod memory;
pub mod migration;
pub mod sequence;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sequence::Sequence;
pub use sqlite::SqliteStore;
pub use traits::{
    BatchInsertResult, BatchLedger, BatchRejection, DocumentLedger, InsertResult, Store,
};

/// Current time in Unix milliseconds.
pub(crate) fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
