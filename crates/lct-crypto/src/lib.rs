//! Hashing primitives for the Ledger Contract Toolkit.
//!
//! Private data never reaches the public partition. What does is a
//! domain-separated BLAKE3 digest of the value, the *existence proof*, which
//! lets non-member peers answer "does this private entry exist" without
//! seeing its content.
//!
//! All crypto operations wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::{ContentHasher, Digest, HasherError};
