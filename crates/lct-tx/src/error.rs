//! Error types for transaction registration and dispatch.

use lct_assets::AssetError;
use lct_ledger::LedgerError;
use lct_types::{HasStatus, StatusClass};
use serde::Serialize;

/// Errors that can occur while building the registry, dispatching a call,
/// or running a routine.
#[derive(Debug, thiserror::Error)]
pub enum TxError {
    /// No transaction is registered under the tag.
    #[error("transaction {tag:?} not found")]
    UnknownTransaction { tag: String },

    /// A required argument is absent or null.
    #[error("missing argument {arg:?}")]
    MissingArgument { arg: String },

    /// An argument value does not match its declared type.
    #[error("invalid argument {arg:?}: expected {expected}: {reason}")]
    InvalidArgumentType {
        arg: String,
        expected: String,
        reason: String,
    },

    /// The argument payload as a whole is malformed.
    #[error("invalid arguments: {reason}")]
    InvalidArguments { reason: String },

    /// An argument declares a data type that does not exist.
    #[error("transaction {tx:?} argument {arg:?} has unknown data type {data_type:?}")]
    UnknownDataType {
        tx: String,
        arg: String,
        data_type: String,
    },

    /// Two transactions share a tag.
    #[error("duplicate transaction tag {tag:?}")]
    DuplicateTransaction { tag: String },

    /// A transaction declares the same argument tag twice.
    #[error("transaction {tx:?} declares argument {arg:?} more than once")]
    DuplicateArgument { tx: String, arg: String },

    /// The process-wide registry was used before initialization.
    #[error("transaction registry is not initialized")]
    RegistryUninitialized,

    /// The process-wide registry was initialized twice.
    #[error("transaction registry is already initialized")]
    AlreadyInitialized,

    /// A requested entity (transaction, asset type, history entry) does not
    /// exist.
    #[error("{what} not found")]
    NotFound { what: String },

    /// An asset operation failed.
    #[error(transparent)]
    Asset(#[from] AssetError),

    /// A direct ledger call failed.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A routine rejected the call.
    #[error("{message}")]
    Routine { message: String, status: StatusClass },

    /// An error with added context.
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<TxError>,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Coarse classification of a [`TxError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// The caller sent an empty identity, an unknown tag, or a bad argument.
    Caller,
    /// An entity does not exist.
    NotFound,
    /// The ledger could not be read or written.
    Ledger,
    /// Reference resolution found a cycle.
    CyclicReference,
    /// The contract was set up incorrectly.
    Configuration,
    /// A routine failed for its own reasons.
    Routine,
}

impl TxError {
    /// A routine-level failure with an explicit status.
    pub fn routine(message: impl Into<String>, status: StatusClass) -> Self {
        Self::Routine {
            message: message.into(),
            status,
        }
    }

    /// A routine-level failure caused by the caller.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::routine(message, StatusClass::BadRequest)
    }

    /// Wrap this error with a message describing what was being done.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownTransaction { .. }
            | Self::MissingArgument { .. }
            | Self::InvalidArgumentType { .. }
            | Self::InvalidArguments { .. } => ErrorKind::Caller,
            Self::UnknownDataType { .. }
            | Self::DuplicateTransaction { .. }
            | Self::DuplicateArgument { .. }
            | Self::RegistryUninitialized
            | Self::AlreadyInitialized => ErrorKind::Configuration,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Asset(inner) => asset_kind(inner),
            Self::Ledger(_) => ErrorKind::Ledger,
            Self::Routine { .. } | Self::Serialization(_) => ErrorKind::Routine,
            Self::Context { source, .. } => source.kind(),
        }
    }
}

fn asset_kind(err: &AssetError) -> ErrorKind {
    match err {
        AssetError::EmptyKey { .. }
        | AssetError::DepthExceeded { .. }
        | AssetError::UnknownAssetType(_)
        | AssetError::InvalidAsset(_)
        | AssetError::InvalidValue { .. } => ErrorKind::Caller,
        AssetError::NotFound { .. } => ErrorKind::NotFound,
        AssetError::Reference { source, .. } => asset_kind(source),
        AssetError::ExistenceCheck { .. } | AssetError::Ledger(_) => ErrorKind::Ledger,
        AssetError::CyclicReference { .. } => ErrorKind::CyclicReference,
        AssetError::UnknownDataType(_) | AssetError::Duplicate { .. } | AssetError::NoKeyProps(_) => {
            ErrorKind::Configuration
        }
        AssetError::Serialization(_) => ErrorKind::Routine,
    }
}

impl HasStatus for TxError {
    fn status(&self) -> StatusClass {
        match self {
            Self::UnknownTransaction { .. }
            | Self::MissingArgument { .. }
            | Self::InvalidArgumentType { .. }
            | Self::InvalidArguments { .. } => StatusClass::BadRequest,
            Self::NotFound { .. } => StatusClass::NotFound,
            Self::Asset(inner) => inner.status(),
            Self::Ledger(inner) => inner.status(),
            Self::Routine { status, .. } => *status,
            Self::Context { source, .. } => source.status(),
            Self::UnknownDataType { .. }
            | Self::DuplicateTransaction { .. }
            | Self::DuplicateArgument { .. }
            | Self::RegistryUninitialized
            | Self::AlreadyInitialized
            | Self::Serialization(_) => StatusClass::Internal,
        }
    }
}

/// Convenience type alias for transaction operations.
pub type TxResult<T> = Result<T, TxError>;
