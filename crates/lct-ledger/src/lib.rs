//! Ledger access port for the Ledger Contract Toolkit (LCT).
//!
//! The ledger itself is an external collaborator: a transactional key-value
//! store with a public partition and any number of access-restricted private
//! collections. Contract code only ever talks to it through the
//! [`LedgerStub`] trait defined here.
//!
//! # Modules
//!
//! - [`error`]: [`LedgerError`] and the [`LedgerResult`] alias
//! - [`types`]: [`LedgerMode`], [`KeyValue`], [`HistoryEntry`]
//! - [`traits`]: The [`LedgerStub`] port
//! - [`composite`]: Composite key construction and splitting
//! - [`memory`]: [`MemoryLedger`], the in-memory backend for tests and hosts
//!
//! # Design Rules
//!
//! 1. Putting an empty value deletes the key.
//! 2. Simple range scans never return composite keys; composite keys are only
//!    reachable through partial composite key queries.
//! 3. Every call returns a fresh result set, so scans are restartable.
//! 4. Private values are never exposed through public reads; a hash of each
//!    private value is kept as its existence proof.

pub mod composite;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

pub use composite::{create_composite_key, split_composite_key, COMPOSITE_KEY_NAMESPACE};
pub use error::{LedgerError, LedgerResult};
pub use memory::{LedgerSnapshot, MemoryLedger};
pub use traits::LedgerStub;
pub use types::{prefix_end, HistoryEntry, KeyValue, LedgerMode};
