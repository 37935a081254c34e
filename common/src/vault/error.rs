use thiserror::Error;

use crate::crypto::Hash;

/// Vault operation result type
pub type VaultResult<T> = Result<T, VaultError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VaultError {
    #[error("Caller is not the vault owner")]
    OwnerRequired,

    #[error("Vault holds no balance for asset {0}")]
    UnknownAsset(Hash),

    #[error("Implementation hash cannot be zero")]
    InvalidImplementation,

    #[error("Balance overflow")]
    Overflow,
}
