use lct_types::{HasStatus, StatusClass};

/// Errors from ledger access operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// The backend cannot serve requests right now.
    #[error("ledger unavailable")]
    Unavailable,

    /// A key is empty or otherwise unusable for the requested operation.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// A composite key could not be built or split.
    #[error("composite key error: {0}")]
    CompositeKey(String),

    /// An operation needs an active transaction and none was started.
    #[error("no active transaction")]
    NoActiveTx,

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// An internal lock was poisoned by a panicking writer.
    #[error("ledger lock poisoned")]
    LockPoisoned,
}

impl HasStatus for LedgerError {
    fn status(&self) -> StatusClass {
        match self {
            Self::InvalidKey { .. } | Self::CompositeKey(_) => StatusClass::BadRequest,
            _ => StatusClass::Internal,
        }
    }
}

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;
