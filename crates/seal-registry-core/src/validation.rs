//! Seal-time validation: merkle inclusion and signature checks.

use crate::crypto::{signed_message, CryptoProvider};
use crate::document::DocumentInput;
use crate::error::ValidationError;
use crate::merkle::verify_merkle_path;

/// Validate a seal input against `provider`.
///
/// This performs, in order:
/// - Merkle inclusion of `content_hash` under `merkle_root`
/// - Signature verification over `signed_message(content_hash)`
pub fn validate_document_input<P: CryptoProvider + ?Sized>(
    provider: &P,
    input: &DocumentInput,
) -> Result<(), ValidationError> {
    // 1. Merkle inclusion
    if !verify_merkle_path(
        provider,
        &input.content_hash,
        &input.merkle_path,
        &input.merkle_root,
    ) {
        return Err(ValidationError::InvalidProof);
    }

    // 2. Signature
    let message = signed_message(&input.content_hash);
    if !provider.verify_signature(&message, &input.signature, &input.public_key) {
        return Err(ValidationError::InvalidSignature);
    }

    Ok(())
}
