//! Transaction registry and dispatcher for the Ledger Contract Toolkit (LCT).
//!
//! A contract is a set of named transactions. Each one declares typed
//! arguments and a routine; the dispatcher validates a raw call against the
//! declaration and only then runs the routine against the ledger.
//!
//! # Modules
//!
//! - [`transaction`]: [`Transaction`] definitions and their descriptors
//! - [`argument`]: [`Argument`] declarations and [`ArgType`] coercion
//! - [`value`]: Validated [`ArgValue`]s and the [`Args`] map
//! - [`registry`]: The immutable [`TxRegistry`] and the process-wide one
//! - [`dispatch`]: The [`Dispatcher`] and the [`TxContext`] seen by routines
//! - [`config`]: [`DispatchConfig`] and the [`ContractHeader`]
//! - [`error`]: [`TxError`], [`ErrorKind`], [`TxResult`]
//!
//! # Design Rules
//!
//! 1. The registry never changes after it is built.
//! 2. A transaction tag names exactly one transaction; caller transactions
//!    may not shadow built-ins.
//! 3. An unknown tag is reported before any argument is examined.
//! 4. A routine only runs once every declared argument has validated.

pub mod argument;
mod builtins;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod registry;
pub mod transaction;
pub mod value;

pub use argument::{ArgType, Argument};
pub use builtins::BUILTIN_TAGS;
pub use config::{ContractHeader, DispatchConfig};
pub use dispatch::{dispatch, Dispatcher, TxContext};
pub use error::{ErrorKind, TxError, TxResult};
pub use registry::{global, init_global, TxRegistry};
pub use transaction::{Method, Routine, Transaction, TxDescriptor, TxSummary};
pub use value::{ArgValue, Args};
