//! Error types for asset operations.

use lct_ledger::LedgerError;
use lct_types::{HasStatus, StatusClass};

/// Errors that can occur while building schemas, keys and assets, or while
/// reading them from the ledger.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// An existence check or read was attempted with an empty key.
    #[error("{type_tag} key is empty")]
    EmptyKey { type_tag: String },

    /// The ledger could not answer an existence check.
    #[error("unable to check asset existence")]
    ExistenceCheck {
        #[source]
        source: LedgerError,
    },

    /// Any other ledger read or write failure.
    #[error("ledger access failed")]
    Ledger(#[from] LedgerError),

    /// No ledger entry exists for the key.
    #[error("asset {key} not found")]
    NotFound { key: String },

    /// Resolving a nested reference failed.
    #[error("failed to resolve reference {from}")]
    Reference {
        from: String,
        #[source]
        source: Box<AssetError>,
    },

    /// Resolution reached a key that is already being resolved.
    #[error("cyclic reference: {}", .path.join(" -> "))]
    CyclicReference { path: Vec<String> },

    /// Resolution went deeper than the configured maximum.
    #[error("maximum resolution depth {max} exceeded")]
    DepthExceeded { max: usize },

    /// The type tag is not registered in the schema.
    #[error("unknown asset type {0:?}")]
    UnknownAssetType(String),

    /// A property or argument names a data type the schema does not know.
    #[error("unknown data type {0:?}")]
    UnknownDataType(String),

    /// Two schema entries share a tag.
    #[error("duplicate {kind} {tag:?}")]
    Duplicate { kind: &'static str, tag: String },

    /// An asset type declares no key properties.
    #[error("asset type {0:?} has no key properties")]
    NoKeyProps(String),

    /// A raw object does not describe a valid asset or key.
    #[error("invalid asset: {0}")]
    InvalidAsset(String),

    /// A property value failed its data type.
    #[error("invalid value for property {prop:?}: {reason}")]
    InvalidValue { prop: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl AssetError {
    /// Returns `true` if this error (or the reference failure it wraps)
    /// means an entity does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Reference { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl HasStatus for AssetError {
    fn status(&self) -> StatusClass {
        match self {
            Self::EmptyKey { .. }
            | Self::ExistenceCheck { .. }
            | Self::DepthExceeded { .. }
            | Self::UnknownAssetType(_)
            | Self::InvalidAsset(_)
            | Self::InvalidValue { .. } => StatusClass::BadRequest,
            Self::NotFound { .. } => StatusClass::NotFound,
            Self::Reference { source, .. } => source.status(),
            Self::Ledger(inner) => inner.status(),
            Self::CyclicReference { .. }
            | Self::UnknownDataType(_)
            | Self::Duplicate { .. }
            | Self::NoKeyProps(_)
            | Self::Serialization(_) => StatusClass::Internal,
        }
    }
}

/// Convenience type alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
