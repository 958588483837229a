//! Identity and existence checks.
//!
//! [`Key`](crate::Key) and [`Asset`](crate::Asset) share one existence check
//! through the [`Identity`] trait. How a private entry is proven to exist
//! depends on the backend: a [`PrivateRead`] strategy is picked from
//! [`LedgerStub::mode`] once per check.

use lct_ledger::{LedgerMode, LedgerResult, LedgerStub};
use tracing::trace;

use crate::error::{AssetError, AssetResult};

/// How a private entry is read for an existence check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrivateRead {
    /// Read the stored value itself.
    DirectValue,
    /// Read the stored hash of the value.
    ExistenceProof,
}

impl PrivateRead {
    pub fn for_mode(mode: LedgerMode) -> Self {
        match mode {
            LedgerMode::Direct => Self::DirectValue,
            LedgerMode::Production => Self::ExistenceProof,
        }
    }

    fn read(self, port: &dyn LedgerStub, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>> {
        match self {
            Self::DirectValue => port.get_private_data(collection, key),
            Self::ExistenceProof => port.get_private_data_hash(collection, key),
        }
    }
}

/// Check whether a ledger entry exists for an identity.
///
/// Private entries live in the collection named by `type_tag`. The content
/// of the entry is never inspected; any non-empty read means it exists.
pub fn exists_in_ledger(
    port: &dyn LedgerStub,
    private: bool,
    type_tag: &str,
    key: &str,
) -> AssetResult<bool> {
    if key.is_empty() {
        return Err(AssetError::EmptyKey {
            type_tag: type_tag.to_string(),
        });
    }

    let read = if private {
        let strategy = PrivateRead::for_mode(port.mode());
        trace!(type_tag, key, ?strategy, "private existence check");
        strategy.read(port, type_tag, key)
    } else {
        port.get_state(key)
    };

    let bytes = read.map_err(|source| AssetError::ExistenceCheck { source })?;
    Ok(bytes.is_some_and(|b| !b.is_empty()))
}

/// Anything that names a ledger entry.
pub trait Identity {
    fn type_tag(&self) -> &str;

    fn key(&self) -> &str;

    fn is_private(&self) -> bool;

    /// Check whether the entry currently exists.
    fn exists_in_ledger(&self, port: &dyn LedgerStub) -> AssetResult<bool> {
        exists_in_ledger(port, self.is_private(), self.type_tag(), self.key())
    }
}
