//! Boundary validation of raw seal requests.
//!
//! [`SealRequest`] is what arrives from outside: hex strings and plain text.
//! [`SealRequest::into_input`] either produces a fully validated
//! [`DocumentInput`] or rejects the request. Wrong sizes are never truncated
//! or padded.

use serde::{Deserialize, Serialize};

use crate::crypto::{
    strip_hex_prefix, Hash32, SealPublicKey, SealSignature, HASH_LEN, PUBLIC_KEY_LEN,
    SIGNATURE_LEN,
};
use crate::document::DocumentInput;
use crate::error::BoundaryError;
use crate::types::{AsciiText, MAX_MERKLE_PATH_LEN};

/// A seal request as received from a caller.
///
/// Byte fields are hex, with or without a `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SealRequest {
    pub content_hash: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub signature: String,
    pub merkle_root: String,
    pub public_key: String,
    #[serde(default)]
    pub merkle_path: Vec<String>,
}

impl SealRequest {
    /// Validate every field and build the engine input.
    pub fn into_input(self) -> Result<DocumentInput, BoundaryError> {
        if self.merkle_path.len() > MAX_MERKLE_PATH_LEN {
            return Err(BoundaryError::MerklePathTooLong {
                max: MAX_MERKLE_PATH_LEN,
                actual: self.merkle_path.len(),
            });
        }

        let merkle_path = self
            .merkle_path
            .iter()
            .map(|node| decode_fixed::<HASH_LEN>("merkle_path", node).map(Hash32))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DocumentInput {
            content_hash: Hash32(decode_fixed("content_hash", &self.content_hash)?),
            title: AsciiText::new(self.title)?,
            description: AsciiText::new(self.description)?,
            category: AsciiText::new(self.category)?,
            signature: SealSignature(decode_fixed::<SIGNATURE_LEN>("signature", &self.signature)?),
            merkle_root: Hash32(decode_fixed("merkle_root", &self.merkle_root)?),
            public_key: SealPublicKey(decode_fixed::<PUBLIC_KEY_LEN>(
                "public_key",
                &self.public_key,
            )?),
            merkle_path,
        })
    }
}

impl TryFrom<SealRequest> for DocumentInput {
    type Error = BoundaryError;

    fn try_from(request: SealRequest) -> Result<Self, Self::Error> {
        request.into_input()
    }
}

impl From<&DocumentInput> for SealRequest {
    fn from(input: &DocumentInput) -> Self {
        Self {
            content_hash: input.content_hash.to_hex(),
            title: input.title.to_string(),
            description: input.description.to_string(),
            category: input.category.to_string(),
            signature: input.signature.to_hex(),
            merkle_root: input.merkle_root.to_hex(),
            public_key: input.public_key.to_hex(),
            merkle_path: input.merkle_path.iter().map(Hash32::to_hex).collect(),
        }
    }
}

fn decode_fixed<const N: usize>(field: &'static str, s: &str) -> Result<[u8; N], BoundaryError> {
    let bytes = hex::decode(strip_hex_prefix(s)).map_err(|e| BoundaryError::InvalidHex {
        field,
        reason: e.to_string(),
    })?;

    let actual = bytes.len();
    bytes.try_into().map_err(|_| BoundaryError::InvalidLength {
        field,
        expected: N,
        actual,
    })
}
