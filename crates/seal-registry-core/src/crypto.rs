//! Cryptographic primitives for the Seal Registry.
//!
//! The registry treats hashing and signature verification as pluggable
//! primitives with fixed input/output sizes. [`CryptoProvider`] is the seam;
//! [`Ed25519Blake3`] is the default implementation.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use subtle::ConstantTimeEq;

/// Length of a [`Hash32`] in bytes.
pub const HASH_LEN: usize = 32;

/// Length of a [`SealSignature`] envelope in bytes.
pub const SIGNATURE_LEN: usize = 512;

/// Length of a [`SealPublicKey`] envelope in bytes.
pub const PUBLIC_KEY_LEN: usize = 256;

/// Domain separation prefix for the message a submitter signs.
pub const SEAL_SIGN_DOMAIN: &[u8] = b"seal-registry/seal-sig/v1";

const ED25519_SIGNATURE_LEN: usize = 64;
const ED25519_PUBLIC_KEY_LEN: usize = 32;

/// Prefix byte for interior merkle nodes.
const NODE_PREFIX: u8 = 0x01;

/// A 32-byte digest: content hashes, merkle roots and merkle path nodes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hash32(pub [u8; HASH_LEN]);

impl Hash32 {
    /// Compute the BLAKE3 digest of the given data.
    ///
    /// The registry itself never hashes documents; this is for submitters
    /// and tooling.
    pub fn digest(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; HASH_LEN];
        hex::decode_to_slice(strip_hex_prefix(s), &mut arr)?;
        Ok(Self(arr))
    }

    /// The zero hash (sentinel value).
    pub const ZERO: Self = Self([0u8; HASH_LEN]);
}

impl fmt::Debug for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash32({})", &self.to_hex()[..16])
    }
}

impl fmt::Display for Hash32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for Hash32 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; HASH_LEN]> for Hash32 {
    fn from(bytes: [u8; HASH_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for Hash32 {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; HASH_LEN] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// A 512-byte signature envelope.
///
/// The envelope size is fixed regardless of the scheme; a scheme with shorter
/// signatures stores them at the front and zero-pads the rest.
#[derive(Clone, PartialEq, Eq)]
pub struct SealSignature(pub [u8; SIGNATURE_LEN]);

impl SealSignature {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// Constant-time equality.
    pub fn ct_eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; SIGNATURE_LEN];
        hex::decode_to_slice(strip_hex_prefix(s), &mut arr)?;
        Ok(Self(arr))
    }

    /// The zero signature (never valid).
    pub const ZERO: Self = Self([0u8; SIGNATURE_LEN]);
}

impl fmt::Debug for SealSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealSig({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SealSignature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SealSignature {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; SIGNATURE_LEN] = slice.try_into()?;
        Ok(Self(arr))
    }
}

/// A 256-byte public-key envelope.
#[derive(Clone, PartialEq, Eq)]
pub struct SealPublicKey(pub [u8; PUBLIC_KEY_LEN]);

impl SealPublicKey {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; PUBLIC_KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut arr = [0u8; PUBLIC_KEY_LEN];
        hex::decode_to_slice(strip_hex_prefix(s), &mut arr)?;
        Ok(Self(arr))
    }
}

impl fmt::Debug for SealPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SealPub({}...)", &self.to_hex()[..16])
    }
}

impl AsRef<[u8]> for SealPublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl TryFrom<&[u8]> for SealPublicKey {
    type Error = std::array::TryFromSliceError;

    fn try_from(slice: &[u8]) -> Result<Self, Self::Error> {
        let arr: [u8; PUBLIC_KEY_LEN] = slice.try_into()?;
        Ok(Self(arr))
    }
}

macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(Hash32);
hex_serde!(SealSignature);
hex_serde!(SealPublicKey);

/// The message a submitter signs for a given content hash.
pub fn signed_message(content_hash: &Hash32) -> Vec<u8> {
    let mut message = Vec::with_capacity(SEAL_SIGN_DOMAIN.len() + HASH_LEN);
    message.extend_from_slice(SEAL_SIGN_DOMAIN);
    message.extend_from_slice(content_hash.as_bytes());
    message
}

/// The platform's hashing and signature primitives.
///
/// Implementations must be pure and must not panic: malformed input of the
/// correct size verifies as `false`.
pub trait CryptoProvider: Send + Sync {
    /// Hash two merkle nodes into their parent.
    fn hash_node(&self, left: &Hash32, right: &Hash32) -> Hash32;

    /// Verify `signature` over `message` under `public_key`.
    fn verify_signature(
        &self,
        message: &[u8],
        signature: &SealSignature,
        public_key: &SealPublicKey,
    ) -> bool;
}

/// Default provider: BLAKE3 merkle nodes, Ed25519 signatures in zero-padded
/// envelopes.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ed25519Blake3;

impl CryptoProvider for Ed25519Blake3 {
    fn hash_node(&self, left: &Hash32, right: &Hash32) -> Hash32 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[NODE_PREFIX]);
        hasher.update(&left.0);
        hasher.update(&right.0);
        Hash32(*hasher.finalize().as_bytes())
    }

    fn verify_signature(
        &self,
        message: &[u8],
        signature: &SealSignature,
        public_key: &SealPublicKey,
    ) -> bool {
        let (sig_bytes, sig_padding) = signature.0.split_at(ED25519_SIGNATURE_LEN);
        let (key_bytes, key_padding) = public_key.0.split_at(ED25519_PUBLIC_KEY_LEN);

        // Padding must be canonical so one key has exactly one envelope.
        if !is_zero(sig_padding) || !is_zero(key_padding) {
            return false;
        }

        let Ok(sig_arr) = <[u8; ED25519_SIGNATURE_LEN]>::try_from(sig_bytes) else {
            return false;
        };
        let Ok(key_arr) = <[u8; ED25519_PUBLIC_KEY_LEN]>::try_from(key_bytes) else {
            return false;
        };
        let Ok(verifying_key) = VerifyingKey::from_bytes(&key_arr) else {
            return false;
        };

        verifying_key
            .verify_strict(message, &Signature::from_bytes(&sig_arr))
            .is_ok()
    }
}

/// Drop a leading lowercase `0x`, if any.
pub(crate) fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().fold(0u8, |acc, b| acc | b) == 0
}

/// An Ed25519 keypair producing registry-sized envelopes.
///
/// Key management is out of the registry's scope; this exists for
/// submitters and tests.
#[derive(Clone)]
pub struct Keypair {
    signing_key: SigningKey,
}

impl Keypair {
    /// Generate a new random keypair.
    pub fn generate() -> Self {
        let mut rng = rand::thread_rng();
        let signing_key = SigningKey::generate(&mut rng);
        Self { signing_key }
    }

    /// Create from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key envelope.
    pub fn public_key(&self) -> SealPublicKey {
        let mut envelope = [0u8; PUBLIC_KEY_LEN];
        envelope[..ED25519_PUBLIC_KEY_LEN]
            .copy_from_slice(&self.signing_key.verifying_key().to_bytes());
        SealPublicKey(envelope)
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> SealSignature {
        let mut envelope = [0u8; SIGNATURE_LEN];
        let signature = self.signing_key.sign(message);
        envelope[..ED25519_SIGNATURE_LEN].copy_from_slice(&signature.to_bytes());
        SealSignature(envelope)
    }

    /// Sign the canonical seal message for a content hash.
    pub fn sign_content(&self, content_hash: &Hash32) -> SealSignature {
        self.sign(&signed_message(content_hash))
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keypair({:?})", self.public_key())
    }
}
