//! Registry configuration.

use seal_registry_core::{DocumentStatus, StatusPolicy};
use serde::Deserialize;

/// Default upper bound on documents per batch.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10;

/// Configuration for the Registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Whether to check merkle inclusion and the submitter's signature
    /// before sealing.
    pub verify_on_seal: bool,
    /// Statuses a document may be set to.
    pub status_policy: StatusPolicy,
    /// Largest batch `seal_document_batch` accepts.
    pub max_batch_size: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            verify_on_seal: true,
            status_policy: StatusPolicy::default(),
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
        }
    }
}

impl RegistryConfig {
    pub fn with_verify_on_seal(mut self, verify: bool) -> Self {
        self.verify_on_seal = verify;
        self
    }

    pub fn with_status_policy(mut self, policy: StatusPolicy) -> Self {
        self.status_policy = policy;
        self
    }

    /// Add one status to the allowed set.
    pub fn allow_status(mut self, status: DocumentStatus) -> Self {
        self.status_policy = self.status_policy.with_status(status);
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert!(config.verify_on_seal);
        assert_eq!(config.max_batch_size, 10);
        assert!(config.status_policy.permits(&DocumentStatus::Revoked));
        assert!(!config
            .status_policy
            .permits(&DocumentStatus::Other("bogus".into())));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RegistryConfig =
            serde_json::from_str(r#"{"max_batch_size": 3, "status_policy": ["suspended"]}"#)
                .unwrap();
        assert!(config.verify_on_seal);
        assert_eq!(config.max_batch_size, 3);
        assert!(config
            .status_policy
            .permits(&DocumentStatus::Other("suspended".into())));
        assert!(config.status_policy.permits(&DocumentStatus::Active));
        assert!(!config.status_policy.permits(&DocumentStatus::Revoked));
    }

    #[test]
    fn test_builder() {
        let config = RegistryConfig::default()
            .with_verify_on_seal(false)
            .with_max_batch_size(50)
            .allow_status(DocumentStatus::Other("archived".into()));
        assert!(!config.verify_on_seal);
        assert_eq!(config.max_batch_size, 50);
        assert!(config
            .status_policy
            .permits(&DocumentStatus::Other("archived".into())));
    }
}
