//! Strong type definitions for the Seal Registry.
//!
//! All identifiers are newtypes to prevent misuse at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BoundaryError;

/// Maximum title length in bytes.
pub const MAX_TITLE_LEN: usize = 256;

/// Maximum description length in bytes.
pub const MAX_DESCRIPTION_LEN: usize = 1024;

/// Maximum category length in bytes.
pub const MAX_CATEGORY_LEN: usize = 64;

/// Maximum number of siblings in a merkle path.
pub const MAX_MERKLE_PATH_LEN: usize = 32;

/// Identifier of a sealed document. Assigned from 1, strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Identifier of a batch. Independent counter from [`DocumentId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BatchId(pub u64);

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// Identity of a caller, as asserted by the execution environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap an identity string.
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// The identity string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Principal {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Printable-ASCII text of at most `MAX` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AsciiText<const MAX: usize>(String);

/// Document title.
pub type Title = AsciiText<MAX_TITLE_LEN>;

/// Document description.
pub type Description = AsciiText<MAX_DESCRIPTION_LEN>;

/// Document category.
pub type Category = AsciiText<MAX_CATEGORY_LEN>;

impl<const MAX: usize> AsciiText<MAX> {
    /// Validate and wrap `text`.
    pub fn new(text: impl Into<String>) -> Result<Self, BoundaryError> {
        let text = text.into();
        if text.len() > MAX {
            return Err(BoundaryError::TextTooLong {
                max: MAX,
                actual: text.len(),
            });
        }
        if !text.bytes().all(|b| b == b' ' || b.is_ascii_graphic()) {
            return Err(BoundaryError::NonAsciiText);
        }
        Ok(Self(text))
    }

    /// The text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const MAX: usize> fmt::Display for AsciiText<MAX> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<const MAX: usize> TryFrom<String> for AsciiText<MAX> {
    type Error = BoundaryError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl<const MAX: usize> TryFrom<&str> for AsciiText<MAX> {
    type Error = BoundaryError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl<const MAX: usize> From<AsciiText<MAX>> for String {
    fn from(text: AsciiText<MAX>) -> Self {
        text.0
    }
}
