//! In-memory implementation of the ledger traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tracing::debug;

use seal_registry_core::{
    BatchId, BatchRecord, BatchStatus, DocumentId, DocumentRecord, DocumentStatus, Hash32,
    NewDocument, Principal,
};

use crate::error::{Result, StoreError};
use crate::sequence::Sequence;
use crate::traits::{
    first_rejection, BatchInsertResult, BatchLedger, DocumentLedger, InsertResult,
};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via one RwLock
/// over both ledgers, so every mutation is a single exclusive step.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    /// Documents indexed by id.
    documents: BTreeMap<DocumentId, DocumentRecord>,

    /// Uniqueness index: content hash -> document id.
    content_index: HashMap<Hash32, DocumentId>,

    /// Batches indexed by id.
    batches: BTreeMap<BatchId, BatchRecord>,

    document_seq: Sequence,
    batch_seq: Sequence,
}

impl MemoryStoreInner {
    fn commit_document(&mut self, document: &NewDocument) -> DocumentId {
        let id = DocumentId(self.document_seq.allocate());
        self.content_index.insert(document.content_hash, id);
        self.documents.insert(id, document.clone().into_record(id));
        id
    }
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Lock(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentLedger for MemoryStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<InsertResult> {
        let mut inner = self.write()?;

        if let Some(&existing) = inner.content_index.get(&document.content_hash) {
            debug!(content_hash = %document.content_hash, %existing, "content hash already sealed");
            return Ok(InsertResult::AlreadyExists { existing });
        }

        Ok(InsertResult::Inserted(inner.commit_document(document)))
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<DocumentRecord>> {
        let inner = self.read()?;
        Ok(inner.documents.get(&id).cloned())
    }

    async fn document_id_for_hash(&self, content_hash: &Hash32) -> Result<Option<DocumentId>> {
        let inner = self.read()?;
        Ok(inner.content_index.get(content_hash).copied())
    }

    async fn set_document_status(
        &self,
        id: DocumentId,
        status: &DocumentStatus,
    ) -> Result<Option<DocumentStatus>> {
        let mut inner = self.write()?;
        Ok(inner
            .documents
            .get_mut(&id)
            .map(|record| std::mem::replace(&mut record.status, status.clone())))
    }

    async fn next_document_id(&self) -> Result<DocumentId> {
        let inner = self.read()?;
        Ok(DocumentId(inner.document_seq.peek()))
    }

    async fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<DocumentId>> {
        let inner = self.read()?;
        Ok(inner
            .documents
            .values()
            .filter(|record| record.is_owned_by(owner))
            .map(|record| record.id)
            .collect())
    }

    async fn document_count(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.document_seq.allocated())
    }
}

#[async_trait]
impl BatchLedger for MemoryStore {
    async fn insert_batch(
        &self,
        documents: &[NewDocument],
        owner: &Principal,
        created_at: i64,
    ) -> Result<BatchInsertResult> {
        let mut inner = self.write()?;

        let rejection = first_rejection(documents, |hash| {
            Ok(inner.content_index.get(hash).copied())
        })?;
        if let Some((index, reason)) = rejection {
            debug!(index, ?reason, "batch rejected");
            return Ok(BatchInsertResult::Rejected { index, reason });
        }

        let document_ids: Vec<DocumentId> = documents
            .iter()
            .map(|document| inner.commit_document(document))
            .collect();

        let batch_id = BatchId(inner.batch_seq.allocate());
        inner.batches.insert(
            batch_id,
            BatchRecord {
                id: batch_id,
                document_ids: document_ids.clone(),
                status: BatchStatus::Sealed,
                owner: owner.clone(),
                created_at,
            },
        );

        Ok(BatchInsertResult::Inserted {
            batch_id,
            document_ids,
        })
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<BatchRecord>> {
        let inner = self.read()?;
        Ok(inner.batches.get(&id).cloned())
    }

    async fn next_batch_id(&self) -> Result<BatchId> {
        let inner = self.read()?;
        Ok(BatchId(inner.batch_seq.peek()))
    }

    async fn batch_count(&self) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.batch_seq.allocated())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BatchRejection;
    use seal_registry_core::{AsciiText, SealPublicKey, SealSignature};

    fn make_document(seed: u8, owner: &str) -> NewDocument {
        NewDocument {
            content_hash: Hash32::from_bytes([seed; 32]),
            title: AsciiText::new(format!("doc {seed}")).unwrap(),
            description: AsciiText::new("test").unwrap(),
            category: AsciiText::new("test").unwrap(),
            signature: SealSignature::ZERO,
            merkle_root: Hash32::from_bytes([seed; 32]),
            public_key: SealPublicKey::from_bytes([0u8; 256]),
            owner: Principal::new(owner),
            sealed_at: 1_700_000_000_000,
        }
    }

    #[tokio::test]
    async fn test_memory_store_basic() {
        let store = MemoryStore::new();
        assert_eq!(store.next_document_id().await.unwrap(), DocumentId(1));

        let result = store.insert_document(&make_document(1, "alice")).await.unwrap();
        assert_eq!(result, InsertResult::Inserted(DocumentId(1)));

        let record = store.get_document(DocumentId(1)).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Active);
        assert_eq!(record.owner, Principal::new("alice"));
        assert!(store.get_document(DocumentId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_hash_allocates_nothing() {
        let store = MemoryStore::new();
        store.insert_document(&make_document(1, "alice")).await.unwrap();

        let result = store.insert_document(&make_document(1, "bob")).await.unwrap();
        assert_eq!(result, InsertResult::AlreadyExists { existing: DocumentId(1) });
        assert_eq!(store.next_document_id().await.unwrap(), DocumentId(2));
        assert_eq!(store.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_status_returns_previous() {
        let store = MemoryStore::new();
        store.insert_document(&make_document(1, "alice")).await.unwrap();

        let previous = store
            .set_document_status(DocumentId(1), &DocumentStatus::Revoked)
            .await
            .unwrap();
        assert_eq!(previous, Some(DocumentStatus::Active));

        let missing = store
            .set_document_status(DocumentId(9), &DocumentStatus::Revoked)
            .await
            .unwrap();
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_batch_commits_in_order() {
        let store = MemoryStore::new();
        store.insert_document(&make_document(9, "alice")).await.unwrap();

        let docs = vec![make_document(1, "bob"), make_document(2, "bob")];
        let result = store
            .insert_batch(&docs, &Principal::new("bob"), 1_700_000_000_000)
            .await
            .unwrap();
        assert_eq!(
            result,
            BatchInsertResult::Inserted {
                batch_id: BatchId(1),
                document_ids: vec![DocumentId(2), DocumentId(3)],
            }
        );

        let batch = store.get_batch(BatchId(1)).await.unwrap().unwrap();
        assert_eq!(batch.status, BatchStatus::Sealed);
        assert_eq!(batch.document_ids, vec![DocumentId(2), DocumentId(3)]);
    }

    #[tokio::test]
    async fn test_batch_rejection_writes_nothing() {
        let store = MemoryStore::new();
        store.insert_document(&make_document(5, "alice")).await.unwrap();

        let docs = vec![make_document(1, "bob"), make_document(5, "bob")];
        let result = store
            .insert_batch(&docs, &Principal::new("bob"), 0)
            .await
            .unwrap();
        assert_eq!(
            result,
            BatchInsertResult::Rejected {
                index: 1,
                reason: BatchRejection::AlreadySealed { existing: DocumentId(1) },
            }
        );

        let docs = vec![make_document(1, "bob"), make_document(2, "bob"), make_document(1, "bob")];
        let result = store
            .insert_batch(&docs, &Principal::new("bob"), 0)
            .await
            .unwrap();
        assert_eq!(
            result,
            BatchInsertResult::Rejected {
                index: 2,
                reason: BatchRejection::DuplicateInBatch { first_index: 0 },
            }
        );

        assert_eq!(store.document_count().await.unwrap(), 1);
        assert_eq!(store.next_batch_id().await.unwrap(), BatchId(1));
        assert!(!store.has_content_hash(&Hash32::from_bytes([1; 32])).await.unwrap());
    }

    #[tokio::test]
    async fn test_documents_by_owner() {
        let store = MemoryStore::new();
        store.insert_document(&make_document(1, "alice")).await.unwrap();
        store.insert_document(&make_document(2, "bob")).await.unwrap();
        store.insert_document(&make_document(3, "alice")).await.unwrap();

        let ids = store.documents_by_owner(&Principal::new("alice")).await.unwrap();
        assert_eq!(ids, vec![DocumentId(1), DocumentId(3)]);
    }
}
