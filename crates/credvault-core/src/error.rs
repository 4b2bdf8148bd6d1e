//! Error types for vault operations

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during vault operations
#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No user is signed in")]
    Unauthenticated,

    #[error("Credential not found: {0}")]
    RecordNotFound(Uuid),

    #[error("Snapshot version {0} is newer than this build supports")]
    UnsupportedVersion(u32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VaultError {
    /// Input was rejected before any state changed
    pub fn is_validation(&self) -> bool {
        matches!(self, VaultError::Validation(_))
    }

    /// Operation needs a signed-in user
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, VaultError::Unauthenticated)
    }
}

pub type VaultResult<T> = Result<T, VaultError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discriminant_helpers() {
        let err = VaultError::Validation("password must not be empty".to_string());
        assert!(err.is_validation());
        assert!(!err.is_unauthenticated());

        assert!(VaultError::Unauthenticated.is_unauthenticated());
        assert!(!VaultError::RecordNotFound(Uuid::new_v4()).is_validation());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            VaultError::Unauthenticated.to_string(),
            "No user is signed in"
        );
        assert_eq!(
            VaultError::UnsupportedVersion(9).to_string(),
            "Snapshot version 9 is newer than this build supports"
        );
    }
}
