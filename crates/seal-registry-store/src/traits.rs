//! Ledger traits: the abstract interface for seal persistence.
//!
//! The registry is storage-agnostic. Implementations include SQLite
//! (primary) and in-memory (for tests).

use async_trait::async_trait;
use seal_registry_core::{
    BatchId, BatchRecord, DocumentId, DocumentRecord, DocumentStatus, Hash32, NewDocument,
    Principal,
};

use crate::error::Result;

/// Result of inserting a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Document was committed under a freshly allocated id.
    Inserted(DocumentId),
    /// The content hash is already sealed. Nothing was written and no id
    /// was allocated.
    AlreadyExists {
        /// The document that holds the hash.
        existing: DocumentId,
    },
}

/// Why a batch was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRejection {
    /// The item's hash is already sealed in the ledger.
    AlreadySealed { existing: DocumentId },
    /// The item's hash repeats an earlier item of the same batch.
    DuplicateInBatch { first_index: usize },
}

/// Result of inserting a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchInsertResult {
    /// All documents and the batch record were committed.
    Inserted {
        batch_id: BatchId,
        /// Ids of the new documents, in submission order.
        document_ids: Vec<DocumentId>,
    },
    /// Nothing was written. `index` is the first offending item.
    Rejected { index: usize, reason: BatchRejection },
}

/// The Document Ledger: document records, the content-hash uniqueness index
/// and the document id sequence.
///
/// # Design Notes
///
/// - **Atomic check-then-insert**: `insert_document` checks uniqueness,
///   allocates the id and commits in one step relative to all other callers.
/// - **No gaps**: an id is allocated only when its record commits.
/// - **No deletes**: records are never removed; only status changes.
#[async_trait]
pub trait DocumentLedger: Send + Sync {
    /// Insert a document, enforcing content-hash uniqueness.
    async fn insert_document(&self, document: &NewDocument) -> Result<InsertResult>;

    /// Get a document by id. A missing id is `None`, never an error.
    async fn get_document(&self, id: DocumentId) -> Result<Option<DocumentRecord>>;

    /// Check whether a content hash is sealed.
    async fn has_content_hash(&self, content_hash: &Hash32) -> Result<bool> {
        Ok(self.document_id_for_hash(content_hash).await?.is_some())
    }

    /// Look up the document holding a content hash.
    async fn document_id_for_hash(&self, content_hash: &Hash32) -> Result<Option<DocumentId>>;

    /// Overwrite a document's status.
    ///
    /// Returns the previous status, or `None` if the id is unknown.
    /// Authorization and status validity are the caller's concern.
    async fn set_document_status(
        &self,
        id: DocumentId,
        status: &DocumentStatus,
    ) -> Result<Option<DocumentStatus>>;

    /// The id the next successful insert will receive.
    async fn next_document_id(&self) -> Result<DocumentId>;

    /// Ids of documents owned by `owner`, ascending.
    async fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<DocumentId>>;

    /// Number of sealed documents.
    async fn document_count(&self) -> Result<u64>;
}

/// The Batch Ledger: batch records and the batch id sequence.
#[async_trait]
pub trait BatchLedger: Send + Sync {
    /// Insert `documents` and a batch record over them as one atomic unit.
    ///
    /// Documents receive consecutive ids in submission order. If any item's
    /// hash is already sealed, or repeats an earlier item, nothing is written.
    async fn insert_batch(
        &self,
        documents: &[NewDocument],
        owner: &Principal,
        created_at: i64,
    ) -> Result<BatchInsertResult>;

    /// Get a batch by id. A missing id is `None`, never an error.
    async fn get_batch(&self, id: BatchId) -> Result<Option<BatchRecord>>;

    /// The id the next successful batch insert will receive.
    async fn next_batch_id(&self) -> Result<BatchId>;

    /// Number of committed batches.
    async fn batch_count(&self) -> Result<u64>;
}

/// A complete seal store: both ledgers behind one backend.
pub trait Store: DocumentLedger + BatchLedger {}

impl<S: DocumentLedger + BatchLedger + ?Sized> Store for S {}

/// Scan a batch in submission order for the first item that cannot be
/// sealed. `lookup` resolves a hash against the committed ledger.
pub(crate) fn first_rejection<F>(
    documents: &[NewDocument],
    mut lookup: F,
) -> Result<Option<(usize, BatchRejection)>>
where
    F: FnMut(&Hash32) -> Result<Option<DocumentId>>,
{
    let mut seen = std::collections::HashMap::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        if let Some(existing) = lookup(&document.content_hash)? {
            return Ok(Some((index, BatchRejection::AlreadySealed { existing })));
        }
        if let Some(&first_index) = seen.get(&document.content_hash) {
            return Ok(Some((index, BatchRejection::DuplicateInBatch { first_index })));
        }
        seen.insert(document.content_hash, index);
    }
    Ok(None)
}
