//! Composite keys.
//!
//! A composite key is an object type followed by an ordered list of
//! attributes, each terminated by `U+0000` and the whole key prefixed by the
//! same namespace character:
//!
//! ```text
//! \0 object_type \0 attr_1 \0 attr_2 \0
//! ```
//!
//! The leading namespace keeps composite keys out of simple range scans. The
//! terminator after the object type keeps `Vehicle` queries from matching
//! `VehicleListing` keys.

use crate::error::{LedgerError, LedgerResult};

/// First character of every composite key.
pub const COMPOSITE_KEY_NAMESPACE: char = '\u{0}';

const MIN_UNICODE_RUNE: char = '\u{0}';

fn validate_part(part: &str, what: &str) -> LedgerResult<()> {
    if part.contains(MIN_UNICODE_RUNE) {
        return Err(LedgerError::CompositeKey(format!(
            "{what} {part:?} must not contain U+0000"
        )));
    }
    Ok(())
}

/// Build a composite key from an object type and attributes.
///
/// With fewer attributes than a full key this also builds the prefix used by
/// partial composite key queries.
pub fn create_composite_key<S: AsRef<str>>(
    object_type: &str,
    attributes: &[S],
) -> LedgerResult<String> {
    if object_type.is_empty() {
        return Err(LedgerError::CompositeKey(
            "object type must not be empty".into(),
        ));
    }
    validate_part(object_type, "object type")?;

    let mut key = String::with_capacity(object_type.len() + 2);
    key.push(COMPOSITE_KEY_NAMESPACE);
    key.push_str(object_type);
    key.push(MIN_UNICODE_RUNE);
    for attr in attributes {
        let attr = attr.as_ref();
        validate_part(attr, "attribute")?;
        key.push_str(attr);
        key.push(MIN_UNICODE_RUNE);
    }
    Ok(key)
}

/// Split a composite key into its object type and attributes.
pub fn split_composite_key(key: &str) -> LedgerResult<(String, Vec<String>)> {
    let body = key
        .strip_prefix(COMPOSITE_KEY_NAMESPACE)
        .ok_or_else(|| LedgerError::CompositeKey(format!("{key:?} is not a composite key")))?;
    let body = body.strip_suffix(MIN_UNICODE_RUNE).ok_or_else(|| {
        LedgerError::CompositeKey(format!("{key:?} is missing its terminator"))
    })?;

    let mut parts = body.split(MIN_UNICODE_RUNE).map(str::to_string);
    let object_type = parts
        .next()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| LedgerError::CompositeKey(format!("{key:?} has no object type")))?;
    Ok((object_type, parts.collect()))
}

/// Returns `true` if `key` lives in the composite key namespace.
pub fn is_composite_key(key: &str) -> bool {
    key.starts_with(COMPOSITE_KEY_NAMESPACE)
}
