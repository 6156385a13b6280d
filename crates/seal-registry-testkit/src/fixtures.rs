//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use seal_registry_core::{
    AsciiText, DocumentInput, Ed25519Blake3, Hash32, Keypair, MerkleTree, Principal, SealRequest,
};

/// Leaf paired with a lone document so its proof is never empty.
const PADDING_LEAF: &[u8] = b"seal-registry/testkit/padding-leaf";

/// A submitter: a signing keypair and the identity it seals as.
pub struct TestFixture {
    pub keypair: Keypair,
    pub principal: Principal,
}

impl TestFixture {
    /// Create a fixture for `principal` with a random keypair.
    pub fn new(principal: &str) -> Self {
        Self {
            keypair: Keypair::generate(),
            principal: Principal::new(principal),
        }
    }

    /// Create with a deterministic keypair from seed.
    pub fn with_seed(principal: &str, seed: [u8; 32]) -> Self {
        Self {
            keypair: Keypair::from_seed(&seed),
            principal: Principal::new(principal),
        }
    }

    /// A ready-to-seal input for `content`, proven in a two-leaf tree.
    pub fn document(&self, content: &[u8]) -> DocumentInput {
        let content_hash = Hash32::digest(content);
        let leaves = [content_hash, Hash32::digest(PADDING_LEAF)];
        self.document_in_tree(&leaves, 0, &format!("Document {}", content_hash.to_hex()))
    }

    /// Ready-to-seal inputs for `contents`, all proven against one shared
    /// tree in the given order.
    pub fn batch(&self, contents: &[&[u8]]) -> Vec<DocumentInput> {
        let leaves: Vec<Hash32> = contents.iter().map(|c| Hash32::digest(c)).collect();
        (0..leaves.len())
            .map(|index| self.document_in_tree(&leaves, index, &format!("Batch item {index}")))
            .collect()
    }

    /// An input for `leaves[index]`, with root and proof taken from the tree
    /// over `leaves`.
    pub fn document_in_tree(&self, leaves: &[Hash32], index: usize, title: &str) -> DocumentInput {
        let tree =
            MerkleTree::from_leaves(&Ed25519Blake3, leaves).expect("leaves must be non-empty");
        let content_hash = leaves[index];

        DocumentInput {
            content_hash,
            title: AsciiText::new(title).expect("fixture title must be valid"),
            description: AsciiText::new("Sealed by the test fixture").expect("valid description"),
            category: AsciiText::new("test").expect("valid category"),
            signature: self.keypair.sign_content(&content_hash),
            merkle_root: tree.root(),
            public_key: self.keypair.public_key(),
            merkle_path: tree.proof(index).expect("index must be in range"),
        }
    }

    /// The wire form of [`TestFixture::document`].
    pub fn seal_request(&self, content: &[u8]) -> SealRequest {
        SealRequest::from(&self.document(content))
    }
}

/// Create multiple test fixtures for multi-party tests.
///
/// Parties are named `party-0`, `party-1`, ... with distinct seeds.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[1] = 0xA5;
            TestFixture::with_seed(&format!("party-{i}"), seed)
        })
        .collect()
}
