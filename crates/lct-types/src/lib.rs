//! Foundation types for the Ledger Contract Toolkit (LCT).
//!
//! This crate provides the small vocabulary shared by every other LCT crate:
//! the status classes attached to errors that cross the dispatch boundary,
//! the reserved `@`-prefixed attribute names used in asset JSON, and a helper
//! that flattens an error's cause chain for hosts.
//!
//! # Key Types
//!
//! - [`StatusClass`]: Numeric status class carried by boundary errors
//! - [`HasStatus`]: Implemented by every error that reaches a host
//! - [`error_chain`]: Flatten `source()` links into messages

pub mod attrs;
pub mod error;
pub mod status;

pub use error::{error_chain, ChainError};
pub use status::{HasStatus, StatusClass};
