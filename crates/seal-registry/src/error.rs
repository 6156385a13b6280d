//! Error types for the Registry.

use seal_registry_core::{BatchId, DocumentId, ValidationError};
use seal_registry_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Registry operations.
///
/// Every variant maps to a stable numeric code via [`RegistryError::code`].
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The caller does not own the document.
    #[error("not authorized: {caller} does not own document {id}")]
    NotAuthorized { id: DocumentId, caller: String },

    /// The content hash is already sealed.
    #[error("content already sealed as document {existing}")]
    AlreadyExists { existing: DocumentId },

    /// The content hash repeats an earlier item of the same batch.
    #[error("content repeats batch item {first_index}")]
    DuplicateInBatch { first_index: usize },

    /// Seal-time proof or signature check failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    /// Batch not found.
    #[error("batch not found: {0}")]
    BatchNotFound(BatchId),

    /// The requested status is not in the allowed set.
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),

    /// The batch is empty or exceeds the configured size.
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    /// An item of a batch failed; the whole batch was rejected.
    #[error("batch item {index} rejected: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<RegistryError>,
    },

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    pub const NOT_AUTHORIZED: u32 = 401;
    pub const ALREADY_EXISTS: u32 = 402;
    pub const INVALID_SIGNATURE: u32 = 403;
    pub const NOT_FOUND: u32 = 404;
    pub const INVALID_PROOF: u32 = 405;
    pub const INVALID_STATUS: u32 = 406;
    pub const INVALID_BATCH: u32 = 407;
    pub const STORE: u32 = 500;

    /// The wire error code for this error.
    ///
    /// A batch item failure reports the code of the item's own error.
    pub fn code(&self) -> u32 {
        match self {
            Self::NotAuthorized { .. } => Self::NOT_AUTHORIZED,
            Self::AlreadyExists { .. } | Self::DuplicateInBatch { .. } => Self::ALREADY_EXISTS,
            Self::Validation(ValidationError::InvalidSignature) => Self::INVALID_SIGNATURE,
            Self::Validation(ValidationError::InvalidProof) => Self::INVALID_PROOF,
            Self::DocumentNotFound(_) | Self::BatchNotFound(_) => Self::NOT_FOUND,
            Self::InvalidStatus(_) => Self::INVALID_STATUS,
            Self::InvalidBatch(_) => Self::INVALID_BATCH,
            Self::BatchItem { source, .. } => source.code(),
            Self::Store(_) => Self::STORE,
        }
    }

    pub(crate) fn batch_item(index: usize, source: RegistryError) -> Self {
        Self::BatchItem {
            index,
            source: Box::new(source),
        }
    }
}

/// Result type for Registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
