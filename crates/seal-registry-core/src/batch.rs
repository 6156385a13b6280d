//! Batch records: documents sealed together in one call.

use serde::{Deserialize, Serialize};

use crate::status::BatchStatus;
use crate::types::{BatchId, DocumentId, Principal};

/// A committed batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRecord {
    pub id: BatchId,
    /// Member documents in submission order.
    pub document_ids: Vec<DocumentId>,
    pub status: BatchStatus,
    pub owner: Principal,
    /// Unix milliseconds.
    pub created_at: i64,
}
