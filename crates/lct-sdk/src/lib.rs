//! High-level SDK for the Ledger Contract Toolkit.
//!
//! [`Contract`] ties a schema, the caller's transactions and a
//! [`ContractConfig`] into one callable unit. This is the main entry point
//! for hosts embedding LCT.

pub mod config;
pub mod contract;
pub mod error;

pub use config::{load_schema, load_state, save_state, ContractConfig, LedgerConfig};
pub use contract::Contract;
pub use error::{SdkError, SdkResult};

// Re-export key types
pub use lct_assets::{Asset, Identity, Key, ResolveOptions, Schema};
pub use lct_ledger::{LedgerMode, LedgerStub, MemoryLedger};
pub use lct_tx::{Argument, Args, Method, Transaction, TxContext, TxError};
