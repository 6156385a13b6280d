//! The Registry: sealing engine and status controller over one store.
//!
//! Mutating calls (seal, batch seal, status update) are serialized through a
//! single write gate so each runs to completion before the next begins.
//! Reads go straight to the store.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use seal_registry_core::{
    validate_document_input, verify_merkle_path, BatchId, BatchRecord, CryptoProvider,
    DocumentId, DocumentInput, DocumentRecord, Ed25519Blake3, Hash32, Principal, SealPublicKey,
    SealSignature,
};
use seal_registry_store::{BatchInsertResult, BatchRejection, InsertResult, Store};

use crate::access::{authorize_status_change, StatusChange};
use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

/// Log target for status change audit events.
pub const AUDIT_TARGET: &str = "seal_registry::audit";

/// The document sealing registry.
///
/// Provides a unified API for:
/// - Sealing documents, singly or in atomic batches
/// - Changing the status of sealed documents (owner only)
/// - Verifying signatures and merkle paths
/// - Reading documents and batches
pub struct Registry<S: Store, P: CryptoProvider = Ed25519Blake3> {
    store: Arc<S>,
    provider: P,
    config: RegistryConfig,
    /// Serializes all mutating calls.
    write_gate: Mutex<()>,
}

impl<S: Store> Registry<S> {
    /// Create a registry using the default Ed25519/BLAKE3 provider.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self::with_provider(store, Ed25519Blake3, config)
    }
}

impl<S: Store, P: CryptoProvider> Registry<S, P> {
    /// Create a registry with a custom crypto provider.
    pub fn with_provider(store: S, provider: P, config: RegistryConfig) -> Self {
        Self {
            store: Arc::new(store),
            provider,
            config,
            write_gate: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    fn check_input(&self, input: &DocumentInput) -> Result<()> {
        if self.config.verify_on_seal {
            validate_document_input(&self.provider, input)?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sealing
    // ─────────────────────────────────────────────────────────────────────────

    /// Seal one document on behalf of `caller`.
    ///
    /// Checks, in order: merkle inclusion (405), signature (403), then
    /// uniqueness (402). A failure allocates no id. On success the caller
    /// owns the document and its status is `active`.
    pub async fn seal_document(
        &self,
        input: DocumentInput,
        caller: &Principal,
    ) -> Result<DocumentId> {
        self.check_input(&input)?;

        let _gate = self.write_gate.lock().await;
        let content_hash = input.content_hash;
        let document = input.into_new_document(caller.clone(), now_millis());

        match self.store.insert_document(&document).await? {
            InsertResult::Inserted(id) => {
                info!(%id, %content_hash, owner = %caller, "document sealed");
                Ok(id)
            }
            InsertResult::AlreadyExists { existing } => {
                debug!(%content_hash, %existing, "seal rejected: already sealed");
                Err(RegistryError::AlreadyExists { existing })
            }
        }
    }

    /// Seal several documents as one unit on behalf of `caller`.
    ///
    /// Either every document is sealed, with consecutive ids in submission
    /// order, and a batch record is created, or nothing is written. A failing
    /// item is reported as `BatchItem { index, .. }` carrying the item's own
    /// error. A hash repeated within the batch fails the batch.
    pub async fn seal_document_batch(
        &self,
        inputs: Vec<DocumentInput>,
        caller: &Principal,
    ) -> Result<BatchId> {
        if inputs.is_empty() {
            return Err(RegistryError::InvalidBatch("batch is empty".into()));
        }
        if inputs.len() > self.config.max_batch_size {
            return Err(RegistryError::InvalidBatch(format!(
                "batch of {} exceeds maximum of {}",
                inputs.len(),
                self.config.max_batch_size
            )));
        }

        for (index, input) in inputs.iter().enumerate() {
            self.check_input(input)
                .map_err(|e| RegistryError::batch_item(index, e))?;
        }

        let _gate = self.write_gate.lock().await;
        let now = now_millis();
        let documents: Vec<_> = inputs
            .into_iter()
            .map(|input| input.into_new_document(caller.clone(), now))
            .collect();

        match self.store.insert_batch(&documents, caller, now).await? {
            BatchInsertResult::Inserted {
                batch_id,
                document_ids,
            } => {
                info!(
                    %batch_id,
                    owner = %caller,
                    size = document_ids.len(),
                    first = ?document_ids.first(),
                    "batch sealed"
                );
                Ok(batch_id)
            }
            BatchInsertResult::Rejected { index, reason } => {
                debug!(index, ?reason, "batch rejected");
                let source = match reason {
                    BatchRejection::AlreadySealed { existing } => {
                        RegistryError::AlreadyExists { existing }
                    }
                    BatchRejection::DuplicateInBatch { first_index } => {
                        RegistryError::DuplicateInBatch { first_index }
                    }
                };
                Err(RegistryError::batch_item(index, source))
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────

    /// Set the status of document `id` to `requested`.
    ///
    /// Fails with `DocumentNotFound` (404) for an unknown id, `NotAuthorized`
    /// (401) if `caller` is not the owner, and `InvalidStatus` (406) if the
    /// status is not allowed by the configured policy.
    pub async fn update_document_status(
        &self,
        id: DocumentId,
        requested: &str,
        caller: &Principal,
    ) -> Result<StatusChange> {
        let _gate = self.write_gate.lock().await;

        let record = self
            .store
            .get_document(id)
            .await?
            .ok_or(RegistryError::DocumentNotFound(id))?;

        let policy = &self.config.status_policy;
        let current = authorize_status_change(&record, caller, requested, policy).map_err(|e| {
            debug!(%id, caller = %caller, requested, error = %e, "status change refused");
            e
        })?;

        let previous = self
            .store
            .set_document_status(id, &current)
            .await?
            .ok_or_else(|| {
                warn!(%id, "document vanished during status update");
                RegistryError::DocumentNotFound(id)
            })?;

        info!(
            target: AUDIT_TARGET,
            %id,
            owner = %caller,
            %previous,
            %current,
            "document status changed"
        );

        Ok(StatusChange {
            id,
            previous,
            current,
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Check a signature against the one stored for document `id`.
    ///
    /// Returns `true` iff `signature` is byte-identical to the stored
    /// envelope, compared in constant time. No cryptographic check is made
    /// here: a registry sealing with `verify_on_seal` already checked the
    /// envelope, and one sealing without it stores whatever it was handed.
    /// Only an unknown id is an error.
    pub async fn verify_signature_of(
        &self,
        id: DocumentId,
        signature: &SealSignature,
    ) -> Result<bool> {
        let record = self
            .store
            .get_document(id)
            .await?
            .ok_or(RegistryError::DocumentNotFound(id))?;

        Ok(record.signature.ct_eq(signature))
    }

    /// Check that `leaf` is included under `root` via `path`.
    pub fn verify_merkle_path(&self, leaf: &Hash32, path: &[Hash32], root: &Hash32) -> bool {
        verify_merkle_path(&self.provider, leaf, path, root)
    }

    /// Check `signature` over `message` under `public_key`.
    pub fn verify_signature(
        &self,
        message: &[u8],
        signature: &SealSignature,
        public_key: &SealPublicKey,
    ) -> bool {
        self.provider.verify_signature(message, signature, public_key)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a document by id.
    pub async fn get_document(&self, id: DocumentId) -> Result<Option<DocumentRecord>> {
        Ok(self.store.get_document(id).await?)
    }

    /// Get a batch by id.
    pub async fn get_batch(&self, id: BatchId) -> Result<Option<BatchRecord>> {
        Ok(self.store.get_batch(id).await?)
    }

    /// Get a batch by id, failing with `BatchNotFound` if it does not exist.
    pub async fn require_batch(&self, id: BatchId) -> Result<BatchRecord> {
        self.get_batch(id)
            .await?
            .ok_or(RegistryError::BatchNotFound(id))
    }

    /// Ids of the documents `owner` has sealed, ascending.
    pub async fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<DocumentId>> {
        Ok(self.store.documents_by_owner(owner).await?)
    }

    /// The id the next sealed document will receive.
    pub async fn next_document_id(&self) -> Result<DocumentId> {
        Ok(self.store.next_document_id().await?)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use seal_registry_core::{AsciiText, Keypair, MerkleTree};
    use seal_registry_store::MemoryStore;

    fn input(keypair: &Keypair, content: &[u8]) -> DocumentInput {
        let content_hash = Hash32::digest(content);
        let sibling = Hash32::digest(b"sibling");
        let tree = MerkleTree::from_leaves(&Ed25519Blake3, &[content_hash, sibling]).unwrap();

        DocumentInput {
            content_hash,
            title: AsciiText::new("Title").unwrap(),
            description: AsciiText::new("Description").unwrap(),
            category: AsciiText::new("category").unwrap(),
            signature: keypair.sign_content(&content_hash),
            merkle_root: tree.root(),
            public_key: keypair.public_key(),
            merkle_path: tree.proof(0).unwrap(),
        }
    }

    fn registry() -> Registry<MemoryStore> {
        Registry::new(MemoryStore::new(), RegistryConfig::default())
    }

    #[tokio::test]
    async fn test_seal_and_get() {
        let registry = registry();
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let alice = Principal::new("alice");

        let id = registry
            .seal_document(input(&keypair, b"deed"), &alice)
            .await
            .unwrap();
        assert_eq!(id, DocumentId(1));

        let record = registry.get_document(id).await.unwrap().unwrap();
        assert_eq!(record.owner, alice);
        assert_eq!(record.content_hash, Hash32::digest(b"deed"));
        assert!(record.sealed_at > 0);
    }

    #[tokio::test]
    async fn test_bad_proof_rejected_before_uniqueness() {
        let registry = registry();
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let alice = Principal::new("alice");

        registry
            .seal_document(input(&keypair, b"deed"), &alice)
            .await
            .unwrap();

        let mut bad = input(&keypair, b"deed");
        bad.merkle_root = Hash32::digest(b"elsewhere");
        let err = registry.seal_document(bad, &alice).await.unwrap_err();
        assert_eq!(err.code(), 405);
    }

    #[tokio::test]
    async fn test_bad_signature_rejected() {
        let registry = registry();
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let other = Keypair::from_seed(&[2u8; 32]);

        let mut bad = input(&keypair, b"deed");
        bad.signature = other.sign_content(&bad.content_hash);
        let err = registry
            .seal_document(bad, &Principal::new("alice"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 403);
        assert_eq!(registry.next_document_id().await.unwrap(), DocumentId(1));
    }

    #[tokio::test]
    async fn test_unverified_mode_skips_checks() {
        let registry = Registry::new(
            MemoryStore::new(),
            RegistryConfig::default().with_verify_on_seal(false),
        );
        let hash = Hash32::digest(b"deed");
        let trivial = DocumentInput {
            content_hash: hash,
            title: AsciiText::new("Title").unwrap(),
            description: AsciiText::new("").unwrap(),
            category: AsciiText::new("").unwrap(),
            signature: SealSignature::ZERO,
            merkle_root: hash,
            public_key: SealPublicKey::from_bytes([0u8; 256]),
            merkle_path: vec![hash],
        };

        let id = registry
            .seal_document(trivial, &Principal::new("alice"))
            .await
            .unwrap();
        assert_eq!(id, DocumentId(1));
    }

    #[tokio::test]
    async fn test_unverified_seal_matches_stored_placeholder_signature() {
        let registry = Registry::new(
            MemoryStore::new(),
            RegistryConfig::default().with_verify_on_seal(false),
        );
        let hash = Hash32::from_bytes([7u8; 32]);
        let placeholder = SealSignature::from_bytes([0xAB; 512]);
        let doc = DocumentInput {
            content_hash: hash,
            title: AsciiText::new("Title").unwrap(),
            description: AsciiText::new("").unwrap(),
            category: AsciiText::new("").unwrap(),
            signature: placeholder.clone(),
            merkle_root: hash,
            public_key: SealPublicKey::from_bytes([1u8; 256]),
            merkle_path: vec![hash],
        };

        let id = registry
            .seal_document(doc, &Principal::new("alice"))
            .await
            .unwrap();
        assert_eq!(id, DocumentId(1));
        assert!(registry.verify_signature_of(id, &placeholder).await.unwrap());

        let mut flipped = placeholder.0;
        flipped[511] ^= 0x80;
        assert!(!registry
            .verify_signature_of(id, &SealSignature::from_bytes(flipped))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_batch_size_limits() {
        let registry = Registry::new(
            MemoryStore::new(),
            RegistryConfig::default().with_max_batch_size(2),
        );
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let alice = Principal::new("alice");

        let err = registry
            .seal_document_batch(vec![], &alice)
            .await
            .unwrap_err();
        assert_eq!(err.code(), 407);

        let inputs = vec![
            input(&keypair, b"a"),
            input(&keypair, b"b"),
            input(&keypair, b"c"),
        ];
        let err = registry
            .seal_document_batch(inputs, &alice)
            .await
            .unwrap_err();
        assert_eq!(err.code(), 407);
    }

    #[tokio::test]
    async fn test_verify_signature_of() {
        let registry = registry();
        let keypair = Keypair::from_seed(&[1u8; 32]);
        let doc = input(&keypair, b"deed");
        let stored = doc.signature.clone();

        let id = registry
            .seal_document(doc, &Principal::new("alice"))
            .await
            .unwrap();

        assert!(registry.verify_signature_of(id, &stored).await.unwrap());

        let mut flipped = stored.0;
        flipped[7] ^= 0x01;
        assert!(!registry
            .verify_signature_of(id, &SealSignature::from_bytes(flipped))
            .await
            .unwrap());

        let err = registry
            .verify_signature_of(DocumentId(99), &stored)
            .await
            .unwrap_err();
        assert_eq!(err.code(), 404);
    }

    #[tokio::test]
    async fn test_require_batch_not_found() {
        let registry = registry();
        let err = registry.require_batch(BatchId(1)).await.unwrap_err();
        assert_eq!(err.code(), 404);
    }
}
