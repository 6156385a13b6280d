//! SQLite implementation of the ledger traits.
//!
//! This is the primary storage backend for the Seal Registry. It uses
//! rusqlite with bundled SQLite, wrapped in async via tokio::spawn_blocking.
//! Every mutation runs in a single transaction, so a rejected insert leaves
//! the documents, the content index and the sequence counters untouched.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use seal_registry_core::{
    AsciiText, BatchId, BatchRecord, BatchStatus, DocumentId, DocumentRecord, DocumentStatus,
    Hash32, NewDocument, Principal, SealPublicKey, SealSignature,
};

use crate::error::{Result, StoreError};
use crate::migration::{self, BATCH_SEQUENCE, DOCUMENT_SEQUENCE};
use crate::traits::{
    first_rejection, BatchInsertResult, BatchLedger, DocumentLedger, InsertResult,
};

const DOCUMENT_COLUMNS: &str = "id, content_hash, title, description, category, signature, \
                                merkle_root, public_key, owner, status, sealed_at";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Lock(e.to_string()))?;
            f(&mut conn)
        })
        .await?
    }
}

// ─────────────────────────────────────────────────────────────────────────
// Row helpers
// ─────────────────────────────────────────────────────────────────────────

fn conversion_error(idx: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, ty, message.into())
}

fn fixed_blob<const N: usize>(row: &Row<'_>, idx: usize) -> rusqlite::Result<[u8; N]> {
    let bytes: Vec<u8> = row.get(idx)?;
    let len = bytes.len();
    bytes
        .try_into()
        .map_err(|_| conversion_error(idx, Type::Blob, format!("expected {N} bytes, found {len}")))
}

fn ascii_text<const MAX: usize>(row: &Row<'_>, idx: usize) -> rusqlite::Result<AsciiText<MAX>> {
    let text: String = row.get(idx)?;
    AsciiText::new(text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_document(row: &Row<'_>) -> rusqlite::Result<DocumentRecord> {
    Ok(DocumentRecord {
        id: DocumentId(row.get::<_, i64>(0)? as u64),
        content_hash: Hash32::from_bytes(fixed_blob(row, 1)?),
        title: ascii_text(row, 2)?,
        description: ascii_text(row, 3)?,
        category: ascii_text(row, 4)?,
        signature: SealSignature::from_bytes(fixed_blob(row, 5)?),
        merkle_root: Hash32::from_bytes(fixed_blob(row, 6)?),
        public_key: SealPublicKey::from_bytes(fixed_blob(row, 7)?),
        owner: Principal::new(row.get::<_, String>(8)?),
        status: DocumentStatus::from(row.get::<_, String>(9)?),
        sealed_at: row.get(10)?,
    })
}

fn encode_document_ids(ids: &[DocumentId]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(ids, &mut buf).map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_document_ids(bytes: &[u8]) -> Result<Vec<DocumentId>> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn lookup_hash(conn: &Connection, content_hash: &Hash32) -> Result<Option<DocumentId>> {
    let id: Option<i64> = conn
        .query_row(
            "SELECT document_id FROM content_index WHERE content_hash = ?1",
            params![content_hash.as_bytes().as_slice()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(id.map(|id| DocumentId(id as u64)))
}

fn peek_sequence(conn: &Connection, name: &str) -> Result<u64> {
    let next: i64 = conn
        .query_row(
            "SELECT next_value FROM sequences WHERE name = ?1",
            params![name],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| StoreError::InvalidData(format!("missing sequence: {name}")))?;
    Ok(next as u64)
}

/// Take the next id of `name`. Must run inside the transaction that uses it.
fn allocate_sequence(conn: &Connection, name: &str) -> Result<u64> {
    let id = peek_sequence(conn, name)?;
    conn.execute(
        "UPDATE sequences SET next_value = next_value + 1 WHERE name = ?1",
        params![name],
    )?;
    Ok(id)
}

fn commit_document(conn: &Connection, document: &NewDocument) -> Result<DocumentId> {
    let id = allocate_sequence(conn, DOCUMENT_SEQUENCE)?;

    conn.execute(
        "INSERT INTO documents (
            id, content_hash, title, description, category, signature,
            merkle_root, public_key, owner, status, sealed_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            id as i64,
            document.content_hash.as_bytes().as_slice(),
            document.title.as_str(),
            document.description.as_str(),
            document.category.as_str(),
            document.signature.as_bytes().as_slice(),
            document.merkle_root.as_bytes().as_slice(),
            document.public_key.as_bytes().as_slice(),
            document.owner.as_str(),
            DocumentStatus::Active.as_str(),
            document.sealed_at,
        ],
    )?;
    conn.execute(
        "INSERT INTO content_index (content_hash, document_id) VALUES (?1, ?2)",
        params![document.content_hash.as_bytes().as_slice(), id as i64],
    )?;

    Ok(DocumentId(id))
}

// ─────────────────────────────────────────────────────────────────────────
// Ledgers
// ─────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DocumentLedger for SqliteStore {
    async fn insert_document(&self, document: &NewDocument) -> Result<InsertResult> {
        let document = document.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if let Some(existing) = lookup_hash(&tx, &document.content_hash)? {
                let content_hash = document.content_hash;
                debug!(%content_hash, %existing, "content hash already sealed");
                return Ok(InsertResult::AlreadyExists { existing });
            }

            let id = commit_document(&tx, &document)?;
            tx.commit()?;
            Ok(InsertResult::Inserted(id))
        })
        .await
    }

    async fn get_document(&self, id: DocumentId) -> Result<Option<DocumentRecord>> {
        self.run(move |conn| {
            let record = conn
                .query_row(
                    &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
                    params![id.0 as i64],
                    row_to_document,
                )
                .optional()?;
            Ok(record)
        })
        .await
    }

    async fn document_id_for_hash(&self, content_hash: &Hash32) -> Result<Option<DocumentId>> {
        let content_hash = *content_hash;
        self.run(move |conn| lookup_hash(conn, &content_hash)).await
    }

    async fn set_document_status(
        &self,
        id: DocumentId,
        status: &DocumentStatus,
    ) -> Result<Option<DocumentStatus>> {
        let status = status.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let previous: Option<String> = tx
                .query_row(
                    "SELECT status FROM documents WHERE id = ?1",
                    params![id.0 as i64],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(previous) = previous else {
                return Ok(None);
            };

            tx.execute(
                "UPDATE documents SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id.0 as i64],
            )?;
            tx.commit()?;

            Ok(Some(DocumentStatus::from(previous)))
        })
        .await
    }

    async fn next_document_id(&self) -> Result<DocumentId> {
        self.run(|conn| Ok(DocumentId(peek_sequence(conn, DOCUMENT_SEQUENCE)?)))
            .await
    }

    async fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<DocumentId>> {
        let owner = owner.clone();

        self.run(move |conn| {
            let mut stmt = conn.prepare("SELECT id FROM documents WHERE owner = ?1 ORDER BY id")?;
            let ids = stmt
                .query_map(params![owner.as_str()], |row| row.get::<_, i64>(0))?
                .map(|id| id.map(|id| DocumentId(id as u64)))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(ids)
        })
        .await
    }

    async fn document_count(&self) -> Result<u64> {
        self.run(|conn| Ok(peek_sequence(conn, DOCUMENT_SEQUENCE)? - 1))
            .await
    }
}

#[async_trait]
impl BatchLedger for SqliteStore {
    async fn insert_batch(
        &self,
        documents: &[NewDocument],
        owner: &Principal,
        created_at: i64,
    ) -> Result<BatchInsertResult> {
        let documents = documents.to_vec();
        let owner = owner.clone();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            if let Some((index, reason)) =
                first_rejection(&documents, |hash| lookup_hash(&tx, hash))?
            {
                debug!(index, ?reason, "batch rejected");
                return Ok(BatchInsertResult::Rejected { index, reason });
            }

            let document_ids = documents
                .iter()
                .map(|document| commit_document(&tx, document))
                .collect::<Result<Vec<_>>>()?;

            let batch_id = allocate_sequence(&tx, BATCH_SEQUENCE)?;
            tx.execute(
                "INSERT INTO batches (id, document_ids, status, owner, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    batch_id as i64,
                    encode_document_ids(&document_ids)?,
                    BatchStatus::Sealed.as_str(),
                    owner.as_str(),
                    created_at,
                ],
            )?;
            tx.commit()?;

            Ok(BatchInsertResult::Inserted {
                batch_id: BatchId(batch_id),
                document_ids,
            })
        })
        .await
    }

    async fn get_batch(&self, id: BatchId) -> Result<Option<BatchRecord>> {
        self.run(move |conn| {
            let row: Option<(Vec<u8>, String, String, i64)> = conn
                .query_row(
                    "SELECT document_ids, status, owner, created_at FROM batches WHERE id = ?1",
                    params![id.0 as i64],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;
            let Some((members, status, owner, created_at)) = row else {
                return Ok(None);
            };

            let status = BatchStatus::from_label(&status)
                .ok_or_else(|| StoreError::InvalidData(format!("unknown batch status: {status}")))?;

            Ok(Some(BatchRecord {
                id,
                document_ids: decode_document_ids(&members)?,
                status,
                owner: Principal::new(owner),
                created_at,
            }))
        })
        .await
    }

    async fn next_batch_id(&self) -> Result<BatchId> {
        self.run(|conn| Ok(BatchId(peek_sequence(conn, BATCH_SEQUENCE)?)))
            .await
    }

    async fn batch_count(&self) -> Result<u64> {
        self.run(|conn| Ok(peek_sequence(conn, BATCH_SEQUENCE)? - 1))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::BatchRejection;

    fn make_document(seed: u8, owner: &str) -> NewDocument {
        let mut signature = [0u8; 512];
        signature[0] = seed;
        let mut public_key = [0u8; 256];
        public_key[31] = seed;

        NewDocument {
            content_hash: Hash32::digest(&[seed]),
            title: AsciiText::new(format!("Deed #{seed}")).unwrap(),
            description: AsciiText::new("Land title transfer").unwrap(),
            category: AsciiText::new("property").unwrap(),
            signature: SealSignature::from_bytes(signature),
            merkle_root: Hash32::from_bytes([seed; 32]),
            public_key: SealPublicKey::from_bytes(public_key),
            owner: Principal::new(owner),
            sealed_at: 1_700_000_000_000 + seed as i64,
        }
    }

    #[tokio::test]
    async fn test_sqlite_store_basic() {
        let store = SqliteStore::open_memory().unwrap();
        let document = make_document(1, "alice");

        let result = store.insert_document(&document).await.unwrap();
        assert_eq!(result, InsertResult::Inserted(DocumentId(1)));

        let record = store.get_document(DocumentId(1)).await.unwrap().unwrap();
        assert_eq!(record, document.into_record(DocumentId(1)));
        assert!(store.get_document(DocumentId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_document(&make_document(1, "alice")).await.unwrap();

        let result = store.insert_document(&make_document(1, "bob")).await.unwrap();
        assert_eq!(result, InsertResult::AlreadyExists { existing: DocumentId(1) });
        assert_eq!(store.next_document_id().await.unwrap(), DocumentId(2));
        assert_eq!(store.document_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_status_update() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_document(&make_document(1, "alice")).await.unwrap();

        let previous = store
            .set_document_status(DocumentId(1), &DocumentStatus::Other("suspended".into()))
            .await
            .unwrap();
        assert_eq!(previous, Some(DocumentStatus::Active));

        let record = store.get_document(DocumentId(1)).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Other("suspended".into()));

        let missing = store
            .set_document_status(DocumentId(7), &DocumentStatus::Revoked)
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_batch_insert_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        let owner = Principal::new("alice");
        let docs: Vec<_> = (1..=3).map(|n| make_document(n, "alice")).collect();

        let result = store.insert_batch(&docs, &owner, 42).await.unwrap();
        assert_eq!(
            result,
            BatchInsertResult::Inserted {
                batch_id: BatchId(1),
                document_ids: vec![DocumentId(1), DocumentId(2), DocumentId(3)],
            }
        );

        let batch = store.get_batch(BatchId(1)).await.unwrap().unwrap();
        assert_eq!(batch.document_ids, vec![DocumentId(1), DocumentId(2), DocumentId(3)]);
        assert_eq!(batch.owner, owner);
        assert_eq!(batch.created_at, 42);
        assert_eq!(batch.status, BatchStatus::Sealed);
        assert!(store.get_batch(BatchId(2)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_batch_rejection_rolls_back() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_document(&make_document(3, "bob")).await.unwrap();

        let docs: Vec<_> = (1..=3).map(|n| make_document(n, "alice")).collect();
        let result = store
            .insert_batch(&docs, &Principal::new("alice"), 0)
            .await
            .unwrap();
        assert_eq!(
            result,
            BatchInsertResult::Rejected {
                index: 2,
                reason: BatchRejection::AlreadySealed { existing: DocumentId(1) },
            }
        );

        assert_eq!(store.document_count().await.unwrap(), 1);
        assert_eq!(store.batch_count().await.unwrap(), 0);
        assert_eq!(store.next_document_id().await.unwrap(), DocumentId(2));
        assert!(!store.has_content_hash(&make_document(1, "alice").content_hash).await.unwrap());
    }

    #[tokio::test]
    async fn test_documents_by_owner() {
        let store = SqliteStore::open_memory().unwrap();
        store.insert_document(&make_document(1, "alice")).await.unwrap();
        store.insert_document(&make_document(2, "bob")).await.unwrap();
        store.insert_document(&make_document(3, "alice")).await.unwrap();

        let ids = store.documents_by_owner(&Principal::new("alice")).await.unwrap();
        assert_eq!(ids, vec![DocumentId(1), DocumentId(3)]);
        assert!(store.documents_by_owner(&Principal::new("carol")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reopen_preserves_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert_document(&make_document(1, "alice")).await.unwrap();
            store
                .insert_batch(&[make_document(2, "alice")], &Principal::new("alice"), 7)
                .await
                .unwrap();
            store
                .set_document_status(DocumentId(1), &DocumentStatus::Revoked)
                .await
                .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.next_document_id().await.unwrap(), DocumentId(3));
        assert_eq!(store.next_batch_id().await.unwrap(), BatchId(2));

        let record = store.get_document(DocumentId(1)).await.unwrap().unwrap();
        assert_eq!(record.status, DocumentStatus::Revoked);

        let batch = store.get_batch(BatchId(1)).await.unwrap().unwrap();
        assert_eq!(batch.document_ids, vec![DocumentId(2)]);

        let result = store.insert_document(&make_document(2, "bob")).await.unwrap();
        assert_eq!(result, InsertResult::AlreadyExists { existing: DocumentId(2) });
    }
}
