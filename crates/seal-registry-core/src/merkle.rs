//! Merkle inclusion proofs.
//!
//! Sibling pairs are combined in sorted order (`hash_node(min, max)`), so a
//! proof is just the ordered list of siblings from leaf to root and carries no
//! direction bits. Leaves are used as given: a content hash is already a
//! digest and is not hashed again.

use crate::crypto::{CryptoProvider, Hash32};

/// Combine two nodes with the sorted-pair rule.
pub fn combine<P: CryptoProvider + ?Sized>(provider: &P, a: &Hash32, b: &Hash32) -> Hash32 {
    if a <= b {
        provider.hash_node(a, b)
    } else {
        provider.hash_node(b, a)
    }
}

/// Recompute a root from `leaf` and `path` and compare it with `root`.
///
/// An empty path is valid only when `leaf == root`.
///
/// Leaves are not domain-separated from interior nodes, so an interior node
/// can be presented as a leaf with a shorter path and still verify. Callers
/// must trust both the root and the provenance of the leaf.
pub fn verify_merkle_path<P: CryptoProvider + ?Sized>(
    provider: &P,
    leaf: &Hash32,
    path: &[Hash32],
    root: &Hash32,
) -> bool {
    let computed = path
        .iter()
        .fold(*leaf, |node, sibling| combine(provider, &node, sibling));
    computed.ct_eq(root)
}

/// A fully materialized merkle tree, used to produce roots and proofs.
///
/// An odd node at the end of a level is promoted to the next level unchanged.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    levels: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree over `leaves`. Returns `None` for an empty leaf set.
    pub fn from_leaves<P>(provider: &P, leaves: &[Hash32]) -> Option<Self>
    where
        P: CryptoProvider + ?Sized,
    {
        if leaves.is_empty() {
            return None;
        }

        let mut levels = vec![leaves.to_vec()];
        while let Some(level) = levels.last().filter(|level| level.len() > 1) {
            let next = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => combine(provider, left, right),
                    [single] => *single,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            levels.push(next);
        }

        Some(Self { levels })
    }

    /// The root of the tree.
    pub fn root(&self) -> Hash32 {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash32::ZERO)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// The sibling path for the leaf at `index`, leaf to root.
    pub fn proof(&self, index: usize) -> Option<Vec<Hash32>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut path = Vec::new();
        let mut idx = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = idx ^ 1;
            // A promoted node has no sibling at this level.
            if let Some(node) = level.get(sibling) {
                path.push(*node);
            }
            idx /= 2;
        }

        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Ed25519Blake3;
    use proptest::prelude::*;

    fn leaves(n: u8) -> Vec<Hash32> {
        (0..n).map(|i| Hash32::digest(&[i])).collect()
    }

    #[test]
    fn test_empty_path_requires_leaf_equals_root() {
        let leaf = Hash32::from_bytes([0xab; 32]);
        assert!(verify_merkle_path(&Ed25519Blake3, &leaf, &[], &leaf));
        assert!(!verify_merkle_path(
            &Ed25519Blake3,
            &leaf,
            &[],
            &Hash32::from_bytes([0xac; 32])
        ));
    }

    #[test]
    fn test_single_leaf_tree() {
        let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves(1)).unwrap();
        assert_eq!(tree.root(), leaves(1)[0]);
        assert_eq!(tree.proof(0), Some(vec![]));
    }

    #[test]
    fn test_every_leaf_proves_inclusion() {
        for n in 1..=9 {
            let leaves = leaves(n);
            let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves).unwrap();
            let root = tree.root();
            for (i, leaf) in leaves.iter().enumerate() {
                let path = tree.proof(i).unwrap();
                assert!(
                    verify_merkle_path(&Ed25519Blake3, leaf, &path, &root),
                    "leaf {i} of {n} failed"
                );
            }
        }
    }

    #[test]
    fn test_proof_out_of_range() {
        let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves(3)).unwrap();
        assert!(tree.proof(3).is_none());
        assert!(MerkleTree::from_leaves(&Ed25519Blake3, &[]).is_none());
    }

    #[test]
    fn test_path_order_matters() {
        let leaves = leaves(4);
        let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves).unwrap();
        let mut path = tree.proof(0).unwrap();
        path.reverse();
        assert!(!verify_merkle_path(&Ed25519Blake3, &leaves[0], &path, &tree.root()));
    }

    #[test]
    fn test_root_used_as_own_sibling_fails() {
        // A leaf equal to the root, "proved" by a path containing the root.
        let root = Hash32::from_bytes([0x01; 32]);
        assert!(!verify_merkle_path(&Ed25519Blake3, &root, &[root], &root));
    }

    #[test]
    fn test_interior_node_verifies_as_leaf() {
        // Known limitation: no leaf prefix, so a subtree root passes as a leaf.
        let leaves = leaves(4);
        let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves).unwrap();
        let left = combine(&Ed25519Blake3, &leaves[0], &leaves[1]);
        let right = combine(&Ed25519Blake3, &leaves[2], &leaves[3]);
        assert!(verify_merkle_path(&Ed25519Blake3, &left, &[right], &tree.root()));
    }

    proptest! {
        #[test]
        fn prop_tampered_leaf_fails(
            n in 2u8..16,
            pick in any::<prop::sample::Index>(),
            flip in 0usize..256,
        ) {
            let leaves = leaves(n);
            let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves).unwrap();
            let i = pick.index(leaves.len());
            let path = tree.proof(i).unwrap();

            let mut tampered = leaves[i];
            tampered.0[flip / 8] ^= 1 << (flip % 8);
            prop_assert!(!verify_merkle_path(&Ed25519Blake3, &tampered, &path, &tree.root()));
        }
    }
}
