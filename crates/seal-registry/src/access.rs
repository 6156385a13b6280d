//! Access/Status Controller.
//!
//! Decides whether a caller may move a document to a requested status. The
//! rule is ownership first, then membership in the configured allowed set.
//! There is no transition graph: an authorized owner may move a document
//! from any status to any allowed status, including back to `active`.

use serde::Serialize;

use seal_registry_core::{DocumentId, DocumentRecord, DocumentStatus, Principal, StatusPolicy};

use crate::error::{RegistryError, Result};

/// A committed status change, returned for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub id: DocumentId,
    pub previous: DocumentStatus,
    pub current: DocumentStatus,
}

/// Check that `caller` may set `record` to `requested` under `policy`.
///
/// A non-owner is refused with `NotAuthorized` whatever status they ask for.
/// Only then is the status checked against the policy.
pub fn authorize_status_change(
    record: &DocumentRecord,
    caller: &Principal,
    requested: &str,
    policy: &StatusPolicy,
) -> Result<DocumentStatus> {
    if !record.is_owned_by(caller) {
        return Err(RegistryError::NotAuthorized {
            id: record.id,
            caller: caller.to_string(),
        });
    }

    let status = DocumentStatus::from(requested.to_string());
    if !policy.permits(&status) {
        return Err(RegistryError::InvalidStatus(requested.to_string()));
    }

    Ok(status)
}
