use std::path::PathBuf;

use lct_assets::AssetError;
use lct_ledger::LedgerError;
use lct_tx::{ErrorKind, TxError};
use lct_types::{HasStatus, StatusClass};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Tx(#[from] TxError),

    #[error("schema error: {0}")]
    Schema(#[from] AssetError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("transaction {tag:?} is not read-only")]
    NotReadOnly { tag: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl SdkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The dispatch error kind, for errors raised by a call.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Tx(inner) => Some(inner.kind()),
            Self::NotReadOnly { .. } => Some(ErrorKind::Caller),
            _ => None,
        }
    }
}

impl HasStatus for SdkError {
    fn status(&self) -> StatusClass {
        match self {
            Self::Tx(inner) => inner.status(),
            Self::Schema(inner) => inner.status(),
            Self::Ledger(inner) => inner.status(),
            Self::NotReadOnly { .. } => StatusClass::BadRequest,
            Self::Config(_) | Self::Io { .. } | Self::Serialization(_) => StatusClass::Internal,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
