use thiserror::Error;

use crate::crypto::Address;
use crate::serializer::ReaderError;
use crate::vault::VaultError;

/// Timelock operation result type
pub type TimelockResult<T> = Result<T, TimelockError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelockError {
    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    #[error("Operation is already scheduled")]
    AlreadyScheduled,

    #[error("Operation has already been executed")]
    AlreadyExecuted,

    #[error("Operation is not ready for execution")]
    NotReady,

    #[error("Delay of {delay} seconds exceeds the maximum of {max}")]
    InvalidDelay { delay: u64, max: u64 },

    #[error("Batch arrays must have equal lengths")]
    MalformedBatch,

    #[error("Batch must contain at least one call")]
    EmptyBatch,

    #[error("Batch of {len} calls exceeds the maximum of {max}")]
    BatchTooLarge { len: usize, max: usize },

    #[error("No target registered at address {0}")]
    UnknownTarget(Address),

    #[error("Malformed call payload: {0}")]
    Payload(#[from] ReaderError),

    #[error("Call {index} failed: {source}")]
    CallFailed {
        index: usize,
        source: Box<TimelockError>,
    },

    #[error(transparent)]
    Vault(#[from] VaultError),
}
