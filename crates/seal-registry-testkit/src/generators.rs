//! Proptest generators for property-based testing.

use proptest::prelude::*;

use seal_registry_core::{
    AsciiText, Category, Description, DocumentInput, DocumentStatus, Ed25519Blake3, Hash32,
    Keypair, MerkleTree, Principal, Title,
};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random Hash32.
pub fn hash32() -> impl Strategy<Value = Hash32> {
    any::<[u8; 32]>().prop_map(Hash32::from_bytes)
}

/// Generate a caller identity.
pub fn principal() -> impl Strategy<Value = Principal> {
    "[a-z][a-z0-9]{2,15}".prop_map(Principal::new)
}

/// Generate document content bytes.
pub fn content() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 1..=256)
}

/// Generate a valid title.
pub fn title() -> impl Strategy<Value = Title> {
    "[ -~]{0,64}".prop_map(|s| AsciiText::new(s).expect("printable ascii"))
}

/// Generate a valid description.
pub fn description() -> impl Strategy<Value = Description> {
    "[ -~]{0,200}".prop_map(|s| AsciiText::new(s).expect("printable ascii"))
}

/// Generate a valid category.
pub fn category() -> impl Strategy<Value = Category> {
    "[a-z-]{0,32}".prop_map(|s| AsciiText::new(s).expect("printable ascii"))
}

/// Generate a status label, allowed by the default policy or not.
pub fn status_label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("active".to_string()),
        Just("revoked".to_string()),
        Just("expired".to_string()),
        "[a-z]{1,12}",
    ]
}

/// Generate a status outside the default allowed set.
pub fn disallowed_status() -> impl Strategy<Value = String> {
    "[a-z]{1,12}".prop_filter("must not be a default status", |label| {
        !matches!(
            label.parse::<DocumentStatus>(),
            Ok(DocumentStatus::Active | DocumentStatus::Revoked | DocumentStatus::Expired)
        )
    })
}

/// Parameters for generating a valid seal input.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub keypair: Keypair,
    pub content: Vec<u8>,
    pub title: Title,
    pub description: Description,
    pub category: Category,
    /// Other leaves of the tree the document is proven in.
    pub siblings: Vec<Hash32>,
    /// Position of the document among the leaves.
    pub position: usize,
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            keypair(),
            content(),
            title(),
            description(),
            category(),
            prop::collection::vec(hash32(), 0..16),
            any::<prop::sample::Index>(),
        )
            .prop_map(
                |(keypair, content, title, description, category, siblings, position)| {
                    let position = position.index(siblings.len() + 1);
                    DocumentParams {
                        keypair,
                        content,
                        title,
                        description,
                        category,
                        siblings,
                        position,
                    }
                },
            )
            .boxed()
    }
}

/// Build a valid seal input from parameters.
pub fn input_from_params(params: &DocumentParams) -> DocumentInput {
    let content_hash = Hash32::digest(&params.content);

    let mut leaves = params.siblings.clone();
    leaves.insert(params.position, content_hash);
    let tree = MerkleTree::from_leaves(&Ed25519Blake3, &leaves).expect("at least one leaf");

    DocumentInput {
        content_hash,
        title: params.title.clone(),
        description: params.description.clone(),
        category: params.category.clone(),
        signature: params.keypair.sign_content(&content_hash),
        merkle_root: tree.root(),
        public_key: params.keypair.public_key(),
        merkle_path: tree.proof(params.position).expect("position in range"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seal_registry_core::{validate_document_input, MAX_MERKLE_PATH_LEN};

    proptest! {
        #[test]
        fn test_generated_inputs_validate(params: DocumentParams) {
            let input = input_from_params(&params);
            prop_assert!(validate_document_input(&Ed25519Blake3, &input).is_ok());
            prop_assert!(input.merkle_path.len() <= MAX_MERKLE_PATH_LEN);
        }

        #[test]
        fn test_disallowed_status_is_disallowed(label in disallowed_status()) {
            let policy = seal_registry_core::StatusPolicy::default();
            prop_assert!(!policy.permits(&DocumentStatus::from(label)));
        }
    }
}
