//! # Seal Registry Testkit
//!
//! Testing utilities for the Seal Registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: submitters with keypairs that produce ready-to-seal inputs
//!   carrying real merkle proofs and signatures
//! - **Generators**: Proptest strategies for property-based testing
//!
//! ## Test Fixtures
//!
//! ```rust
//! use seal_registry_testkit::fixtures::TestFixture;
//!
//! let alice = TestFixture::new("alice");
//! let input = alice.document(b"title deed #42");
//! let batch = alice.batch(&[b"page 1", b"page 2"]);
//! assert_eq!(batch.len(), 2);
//! # let _ = input;
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use seal_registry_testkit::generators::{input_from_params, DocumentParams};
//!
//! proptest! {
//!     #[test]
//!     fn generated_inputs_validate(params: DocumentParams) {
//!         let input = input_from_params(&params);
//!         prop_assert!(!input.merkle_path.is_empty() || params.siblings.is_empty());
//!     }
//! }
//! ```

pub mod fixtures;
pub mod generators;

pub use fixtures::{multi_party_fixtures, TestFixture};
pub use generators::{input_from_params, DocumentParams};
