//! Document and batch status.
//!
//! Document status is a tagged value checked against a configured allowed set
//! ([`StatusPolicy`]). There is no transition graph: any allowed status may
//! follow any other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Status of a sealed document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    /// Initial status of every seal.
    Active,
    Revoked,
    Expired,
    /// Any other label. Whether it is usable depends on the policy.
    Other(String),
}

impl DocumentStatus {
    /// The status label.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
            Self::Other(label) => label,
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "active" => Self::Active,
            "revoked" => Self::Revoked,
            "expired" => Self::Expired,
            other => Self::Other(other.to_string()),
        })
    }
}

impl From<String> for DocumentStatus {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of statuses a document may be moved into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeSet<DocumentStatus>", into = "BTreeSet<DocumentStatus>")]
pub struct StatusPolicy {
    allowed: BTreeSet<DocumentStatus>,
}

impl StatusPolicy {
    /// A policy allowing exactly `statuses`. `active` is always included,
    /// since every document starts there.
    pub fn new(statuses: impl IntoIterator<Item = DocumentStatus>) -> Self {
        let mut allowed: BTreeSet<_> = statuses.into_iter().collect();
        allowed.insert(DocumentStatus::Active);
        Self { allowed }
    }

    /// Whether `status` is in the allowed set.
    pub fn permits(&self, status: &DocumentStatus) -> bool {
        self.allowed.contains(status)
    }

    /// Allow an additional status.
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.allowed.insert(status);
        self
    }
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self::new([
            DocumentStatus::Active,
            DocumentStatus::Revoked,
            DocumentStatus::Expired,
        ])
    }
}

impl From<BTreeSet<DocumentStatus>> for StatusPolicy {
    fn from(statuses: BTreeSet<DocumentStatus>) -> Self {
        Self::new(statuses)
    }
}

impl From<StatusPolicy> for BTreeSet<DocumentStatus> {
    fn from(policy: StatusPolicy) -> Self {
        policy.allowed
    }
}

/// Aggregate status of a batch. Batches only exist once fully committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Sealed,
}

impl BatchStatus {
    /// The status label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sealed => "sealed",
        }
    }

    /// Parse a stored label.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "sealed" => Some(Self::Sealed),
            _ => None,
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
