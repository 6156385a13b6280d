//! Document records: the unit the registry seals.
//!
//! A record is created once and never removed. Only its status changes, and
//! only through the registry's status controller.

use serde::{Deserialize, Serialize};

use crate::crypto::{Hash32, SealPublicKey, SealSignature};
use crate::status::DocumentStatus;
use crate::types::{Category, Description, DocumentId, Principal, Title};

/// Validated input for one seal.
///
/// Every field has already passed boundary checks: byte fields are exactly
/// sized and text fields are bounded ASCII.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Digest of the document content. The uniqueness key.
    pub content_hash: Hash32,
    pub title: Title,
    pub description: Description,
    pub category: Category,
    /// Submitter's signature over `signed_message(content_hash)`.
    pub signature: SealSignature,
    /// Root the merkle path is checked against.
    pub merkle_root: Hash32,
    pub public_key: SealPublicKey,
    /// Siblings from leaf to root. Not persisted.
    pub merkle_path: Vec<Hash32>,
}

impl DocumentInput {
    /// Turn the input into a ledger draft owned by `owner`.
    pub fn into_new_document(self, owner: Principal, sealed_at: i64) -> NewDocument {
        NewDocument {
            content_hash: self.content_hash,
            title: self.title,
            description: self.description,
            category: self.category,
            signature: self.signature,
            merkle_root: self.merkle_root,
            public_key: self.public_key,
            owner,
            sealed_at,
        }
    }
}

/// A document ready for insertion, before the ledger assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    pub content_hash: Hash32,
    pub title: Title,
    pub description: Description,
    pub category: Category,
    pub signature: SealSignature,
    pub merkle_root: Hash32,
    pub public_key: SealPublicKey,
    pub owner: Principal,
    /// Unix milliseconds.
    pub sealed_at: i64,
}

impl NewDocument {
    /// Materialize the record under `id`. New records are always `active`.
    pub fn into_record(self, id: DocumentId) -> DocumentRecord {
        DocumentRecord {
            id,
            content_hash: self.content_hash,
            title: self.title,
            description: self.description,
            category: self.category,
            signature: self.signature,
            merkle_root: self.merkle_root,
            public_key: self.public_key,
            owner: self.owner,
            status: DocumentStatus::Active,
            sealed_at: self.sealed_at,
        }
    }
}

/// A sealed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub content_hash: Hash32,
    pub title: Title,
    pub description: Description,
    pub category: Category,
    pub signature: SealSignature,
    pub merkle_root: Hash32,
    pub public_key: SealPublicKey,
    /// Submitting caller. Sole party allowed to change `status`.
    pub owner: Principal,
    pub status: DocumentStatus,
    /// Unix milliseconds.
    pub sealed_at: i64,
}

impl DocumentRecord {
    /// Whether `caller` owns this document.
    pub fn is_owned_by(&self, caller: &Principal) -> bool {
        &self.owner == caller
    }
}
