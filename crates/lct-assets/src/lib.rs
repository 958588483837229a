//! Asset model for the Ledger Contract Toolkit (LCT).
//!
//! Assets are typed ledger records described by a [`Schema`]. Each asset is
//! identified by a [`Key`] derived from its type tag and the values of its
//! key properties; attributes may reference other assets by key.
//!
//! # Modules
//!
//! - [`error`]: [`AssetError`] and the [`AssetResult`] alias
//! - [`datatype`]: The data-type catalogue and property type grammar
//! - [`schema`]: [`AssetType`], [`AssetProp`], [`Schema`]
//! - [`key`]: Key derivation and the [`Key`] reference type
//! - [`asset`]: [`Asset`] validation and persistence
//! - [`identity`]: The shared existence check
//! - [`resolve`]: Recursive reference resolution
//!
//! # Design Rules
//!
//! 1. Keys are derived, never chosen: `type:uuid-v5(type, key values)`.
//! 2. Private assets live in the private collection named by their type tag
//!    and never touch the public partition.
//! 3. An empty key is a caller error, distinct from "not found".
//! 4. Resolution always terminates: cycles fail with
//!    [`AssetError::CyclicReference`].

pub mod asset;
pub mod datatype;
pub mod error;
pub mod identity;
pub mod key;
pub mod resolve;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use asset::{validate_value, Asset};
pub use datatype::{format_datetime, DataType, ParseFn, PropType};
pub use error::{AssetError, AssetResult};
pub use identity::{exists_in_ledger, Identity, PrivateRead};
pub use key::{derive_key, is_reference, Key};
pub use resolve::{resolve_recursive, ResolveOptions};
pub use schema::{AssetProp, AssetType, AssetTypeSummary, Schema, SchemaBuilder};
