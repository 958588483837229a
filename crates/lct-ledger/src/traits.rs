//! The [`LedgerStub`] trait: everything contract code may ask of the ledger.

use chrono::{DateTime, Utc};

use crate::error::LedgerResult;
use crate::types::{prefix_end, HistoryEntry, KeyValue, LedgerMode};

/// Ledger access port.
///
/// Implementations must be thread-safe (`Send + Sync`). Isolation between
/// concurrent invocations, conflict detection and write ordering are the
/// implementation's responsibility; callers hold a borrowed `&dyn LedgerStub`
/// for the duration of one invocation and never own it.
///
/// Reads return `Ok(None)` when the key does not exist and `Err` only when
/// the ledger could not be read.
pub trait LedgerStub: Send + Sync {
    /// How this backend stores private data.
    fn mode(&self) -> LedgerMode;

    /// Read a key from the public partition.
    fn get_state(&self, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write a key to the public partition. An empty value deletes the key.
    fn put_state(&self, key: &str, value: &[u8]) -> LedgerResult<()>;

    /// Delete a key from the public partition. Deleting a missing key is a
    /// no-op.
    fn del_state(&self, key: &str) -> LedgerResult<()>;

    /// Scan simple keys in `[start, end)`, ordered by key.
    ///
    /// An empty bound is open. Composite keys are never returned.
    fn get_state_by_range(&self, start: &str, end: &str) -> LedgerResult<Vec<KeyValue>>;

    /// Scan composite keys of `object_type` whose leading attributes equal
    /// `attributes`, ordered by key.
    fn get_state_by_partial_composite_key(
        &self,
        object_type: &str,
        attributes: &[String],
    ) -> LedgerResult<Vec<KeyValue>>;

    /// Every recorded modification of `key`, oldest first.
    fn get_history_for_key(&self, key: &str) -> LedgerResult<Vec<HistoryEntry>>;

    /// Read a private value from `collection`.
    fn get_private_data(&self, collection: &str, key: &str) -> LedgerResult<Option<Vec<u8>>>;

    /// Write a private value to `collection`. An empty value deletes the key.
    fn put_private_data(&self, collection: &str, key: &str, value: &[u8]) -> LedgerResult<()>;

    /// Delete a private value (and its existence proof).
    fn del_private_data(&self, collection: &str, key: &str) -> LedgerResult<()>;

    /// Read the existence proof (hash) of a private value.
    fn get_private_data_hash(&self, collection: &str, key: &str)
        -> LedgerResult<Option<Vec<u8>>>;

    /// Scan private keys of `collection` in `[start, end)`.
    fn get_private_data_by_range(
        &self,
        collection: &str,
        start: &str,
        end: &str,
    ) -> LedgerResult<Vec<KeyValue>>;

    /// Identifier of the current transaction.
    fn tx_id(&self) -> LedgerResult<String>;

    /// Timestamp of the current transaction.
    fn tx_timestamp(&self) -> LedgerResult<DateTime<Utc>>;

    /// Scan simple keys starting with `prefix`.
    fn get_state_by_prefix(&self, prefix: &str) -> LedgerResult<Vec<KeyValue>> {
        self.get_state_by_range(prefix, &prefix_end(prefix))
    }

    /// Scan private keys of `collection` starting with `prefix`.
    fn get_private_data_by_prefix(
        &self,
        collection: &str,
        prefix: &str,
    ) -> LedgerResult<Vec<KeyValue>> {
        self.get_private_data_by_range(collection, prefix, &prefix_end(prefix))
    }
}
