//! Reserved attribute names in asset JSON.
//!
//! Every name starting with `@` belongs to the toolkit. User-defined
//! properties may not use the prefix.

/// Names the asset type an object conforms to.
pub const ASSET_TYPE: &str = "@assetType";

/// The derived ledger key of an asset.
pub const KEY: &str = "@key";

/// Optional privacy marker carried by references.
pub const PRIVATE: &str = "@private";

/// Prefix reserved for toolkit attributes.
pub const RESERVED_PREFIX: char = '@';

/// Returns `true` if `name` is reserved for toolkit use.
pub fn is_reserved(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names() {
        assert!(is_reserved(ASSET_TYPE));
        assert!(is_reserved(KEY));
        assert!(is_reserved(PRIVATE));
        assert!(!is_reserved("name"));
        assert!(!is_reserved(""));
    }
}
