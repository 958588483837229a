//! Asset keys: derivation, parsing, and reference objects.

use std::fmt;

use lct_ledger::LedgerStub;
use lct_types::attrs;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::asset::{validate_value, Asset};
use crate::datatype::kind_of;
use crate::error::{AssetError, AssetResult};
use crate::identity::Identity;
use crate::resolve::{resolve_recursive, ResolveOptions};
use crate::schema::Schema;

/// Derive the ledger key of an asset from its type tag and the values of its
/// key properties, in declaration order.
///
/// The result is `"{type_tag}:{uuid}"`, where the UUID is a v5 UUID in the
/// OID namespace over the JSON array `[type_tag, value_1, ..., value_n]`.
/// Object members are serialized in sorted order, so the input is canonical.
/// Changing this function changes every stored key.
pub fn derive_key(type_tag: &str, key_values: &[Value]) -> AssetResult<String> {
    let mut parts = Vec::with_capacity(key_values.len() + 1);
    parts.push(Value::String(type_tag.to_string()));
    parts.extend(key_values.iter().cloned());
    let canonical = serde_json::to_vec(&Value::Array(parts))
        .map_err(|e| AssetError::Serialization(e.to_string()))?;
    let id = Uuid::new_v5(&Uuid::NAMESPACE_OID, &canonical);
    Ok(format!("{type_tag}:{id}"))
}

/// Returns `true` if `value` is a reference object: an object holding
/// `@assetType` and `@key` and nothing else but an optional `@private`.
pub fn is_reference(value: &Value) -> bool {
    value.as_object().is_some_and(is_reference_object)
}

pub(crate) fn is_reference_object(obj: &Map<String, Value>) -> bool {
    obj.contains_key(attrs::ASSET_TYPE)
        && obj.contains_key(attrs::KEY)
        && obj
            .keys()
            .all(|k| k == attrs::ASSET_TYPE || k == attrs::KEY || k == attrs::PRIVATE)
}

pub(crate) fn type_tag_of(obj: &Map<String, Value>) -> AssetResult<&str> {
    obj.get(attrs::ASSET_TYPE)
        .and_then(Value::as_str)
        .ok_or_else(|| AssetError::InvalidAsset(format!("missing {}", attrs::ASSET_TYPE)))
}

fn check_key_format(type_tag: &str, key: &str) -> AssetResult<()> {
    let id = key
        .strip_prefix(type_tag)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or_else(|| {
            AssetError::InvalidAsset(format!("key {key:?} does not belong to type {type_tag:?}"))
        })?;
    Uuid::parse_str(id)
        .map_err(|e| AssetError::InvalidAsset(format!("key {key:?} is malformed: {e}")))?;
    Ok(())
}

/// Identity-only reference to an asset.
#[derive(Clone, Debug, PartialEq)]
pub struct Key {
    type_tag: String,
    key: String,
    private: bool,
    key_values: Vec<Value>,
}

impl Key {
    /// Build a key from the values of its type's key properties.
    pub fn from_key_values(
        schema: &Schema,
        type_tag: &str,
        key_values: &[Value],
    ) -> AssetResult<Self> {
        let asset_type = schema.require_asset_type(type_tag)?;
        let props: Vec<_> = asset_type.key_props().collect();
        if props.len() != key_values.len() {
            return Err(AssetError::InvalidAsset(format!(
                "{type_tag} has {} key properties, got {} values",
                props.len(),
                key_values.len()
            )));
        }
        let values = props
            .iter()
            .zip(key_values)
            .map(|(prop, raw)| validate_value(schema, &prop.tag, &prop.prop_type()?, raw))
            .collect::<AssetResult<Vec<_>>>()?;
        Ok(Self {
            key: derive_key(type_tag, &values)?,
            type_tag: type_tag.to_string(),
            private: asset_type.is_private(),
            key_values: values,
        })
    }

    /// Parse a key string of the form `type:uuid`.
    pub fn parse(schema: &Schema, key: &str) -> AssetResult<Self> {
        let (type_tag, _) = key
            .split_once(':')
            .ok_or_else(|| AssetError::InvalidAsset(format!("key {key:?} has no type prefix")))?;
        let asset_type = schema.require_asset_type(type_tag)?;
        check_key_format(type_tag, key)?;
        Ok(Self {
            type_tag: type_tag.to_string(),
            key: key.to_string(),
            private: asset_type.is_private(),
            key_values: Vec::new(),
        })
    }

    /// Build a key from a key string, a reference object, or any object
    /// carrying `@assetType` and all key properties.
    pub fn from_value(schema: &Schema, value: &Value) -> AssetResult<Self> {
        match value {
            Value::String(s) => Self::parse(schema, s),
            Value::Object(obj) => Self::from_object(schema, obj),
            other => Err(AssetError::InvalidAsset(format!(
                "expected a key string or object, got {}",
                kind_of(other)
            ))),
        }
    }

    pub(crate) fn from_object(schema: &Schema, obj: &Map<String, Value>) -> AssetResult<Self> {
        let type_tag = type_tag_of(obj)?;
        let asset_type = schema.require_asset_type(type_tag)?;

        if let Some(raw) = obj.get(attrs::KEY) {
            let key = raw.as_str().ok_or_else(|| {
                AssetError::InvalidAsset(format!("{} must be a string", attrs::KEY))
            })?;
            check_key_format(type_tag, key)?;
            return Ok(Self {
                type_tag: type_tag.to_string(),
                key: key.to_string(),
                private: asset_type.is_private(),
                key_values: Vec::new(),
            });
        }

        let mut key_values = Vec::new();
        for prop in asset_type.key_props() {
            let raw = obj
                .get(&prop.tag)
                .filter(|v| !v.is_null())
                .ok_or_else(|| AssetError::InvalidValue {
                    prop: prop.tag.clone(),
                    reason: "key property is missing".into(),
                })?;
            key_values.push(validate_value(schema, &prop.tag, &prop.prop_type()?, raw)?);
        }
        Ok(Self {
            key: derive_key(type_tag, &key_values)?,
            type_tag: type_tag.to_string(),
            private: asset_type.is_private(),
            key_values,
        })
    }

    /// A key that skips schema validation, for hosts that already hold a
    /// derived key string.
    pub fn raw(type_tag: impl Into<String>, key: impl Into<String>, private: bool) -> Self {
        Self {
            type_tag: type_tag.into(),
            key: key.into(),
            private,
            key_values: Vec::new(),
        }
    }

    pub(crate) fn with_values(
        type_tag: String,
        key: String,
        private: bool,
        key_values: Vec<Value>,
    ) -> Self {
        Self {
            type_tag,
            key,
            private,
            key_values,
        }
    }

    /// Values of the key properties. Empty when the key was built from a key
    /// string or a reference object.
    pub fn key_values(&self) -> &[Value] {
        &self.key_values
    }

    /// The `{"@assetType", "@key"}` reference object for this key.
    pub fn to_reference(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(attrs::ASSET_TYPE.into(), Value::String(self.type_tag.clone()));
        obj.insert(attrs::KEY.into(), Value::String(self.key.clone()));
        Value::Object(obj)
    }

    /// Read the stored bytes of the asset, routed by the privacy flag.
    pub fn get_bytes(&self, port: &dyn LedgerStub) -> AssetResult<Vec<u8>> {
        self.check_not_empty()?;
        let bytes = if self.private {
            port.get_private_data(&self.type_tag, &self.key)?
        } else {
            port.get_state(&self.key)?
        };
        bytes
            .filter(|b| !b.is_empty())
            .ok_or_else(|| AssetError::NotFound {
                key: self.key.clone(),
            })
    }

    /// Read and validate the stored asset. References stay unresolved.
    pub fn get(&self, port: &dyn LedgerStub, schema: &Schema) -> AssetResult<Asset> {
        let bytes = self.get_bytes(port)?;
        let value: Value =
            serde_json::from_slice(&bytes).map_err(|e| AssetError::Serialization(e.to_string()))?;
        let asset = Asset::from_value(schema, &value)?;
        if asset.key() != self.key {
            return Err(AssetError::InvalidAsset(format!(
                "entry at {} holds asset {}",
                self.key,
                asset.key()
            )));
        }
        Ok(asset)
    }

    /// Read the asset with every reference replaced by the referenced asset.
    pub fn get_recursive(
        &self,
        port: &dyn LedgerStub,
        schema: &Schema,
        options: &ResolveOptions,
    ) -> AssetResult<Asset> {
        resolve_recursive(port, schema, self, options)
    }

    pub(crate) fn check_not_empty(&self) -> AssetResult<()> {
        if self.key.is_empty() {
            return Err(AssetError::EmptyKey {
                type_tag: self.type_tag.clone(),
            });
        }
        Ok(())
    }
}

impl Identity for Key {
    fn type_tag(&self) -> &str {
        &self.type_tag
    }

    fn key(&self) -> &str {
        &self.key
    }

    fn is_private(&self) -> bool {
        self.private
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl Serialize for Key {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_reference().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{library_schema, person_value};
    use lct_ledger::MemoryLedger;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn derive_key_is_deterministic() {
        let a = derive_key("person", &[json!("123")]).unwrap();
        let b = derive_key("person", &[json!("123")]).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("person:"));
        assert_ne!(a, derive_key("person", &[json!("124")]).unwrap());
        assert_ne!(a, derive_key("people", &[json!("123")]).unwrap());
    }

    #[test]
    fn derive_key_is_stable() {
        // Stored keys depend on this exact value.
        let key = derive_key("person", &[json!("123")]).unwrap();
        let expected = Uuid::new_v5(&Uuid::NAMESPACE_OID, br#"["person","123"]"#);
        assert_eq!(key, format!("person:{expected}"));
    }

    #[test]
    fn key_value_order_matters() {
        let ab = derive_key("book", &[json!("a"), json!("b")]).unwrap();
        let ba = derive_key("book", &[json!("b"), json!("a")]).unwrap();
        assert_ne!(ab, ba);
    }

    proptest! {
        #[test]
        fn derived_keys_parse_back(id in "[a-zA-Z0-9]{1,16}") {
            let schema = library_schema();
            let key = Key::from_key_values(&schema, "person", &[json!(id)]).unwrap();
            let parsed = Key::parse(&schema, key.key()).unwrap();
            prop_assert_eq!(parsed.key(), key.key());
            prop_assert_eq!(parsed.type_tag(), "person");
        }
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    #[test]
    fn from_object_with_key_props() {
        let schema = library_schema();
        let key = Key::from_value(&schema, &json!({"@assetType": "person", "id": "123"})).unwrap();
        assert_eq!(key.key(), derive_key("person", &[json!("123")]).unwrap());
        assert_eq!(key.key_values(), &[json!("123")]);
        assert!(!key.is_private());
    }

    #[test]
    fn from_reference_object() {
        let schema = library_schema();
        let k = derive_key("person", &[json!("1")]).unwrap();
        let key = Key::from_value(&schema, &json!({"@assetType": "person", "@key": k})).unwrap();
        assert_eq!(key.key(), k);
        assert!(key.key_values().is_empty());
    }

    #[test]
    fn from_key_string() {
        let schema = library_schema();
        let k = derive_key("secret", &[json!("s1")]).unwrap();
        let key = Key::from_value(&schema, &json!(k)).unwrap();
        assert_eq!(key.type_tag(), "secret");
        assert!(key.is_private());
    }

    #[test]
    fn rejects_malformed_keys() {
        let schema = library_schema();
        assert!(matches!(
            Key::parse(&schema, "no-prefix"),
            Err(AssetError::InvalidAsset(_))
        ));
        assert!(matches!(
            Key::parse(&schema, "car:123"),
            Err(AssetError::UnknownAssetType(_))
        ));
        assert!(matches!(
            Key::parse(&schema, "person:not-a-uuid"),
            Err(AssetError::InvalidAsset(_))
        ));
        let other = derive_key("book", &[json!("x"), json!("y")]).unwrap();
        assert!(Key::from_value(&schema, &json!({"@assetType": "person", "@key": other})).is_err());
        assert!(Key::from_value(&schema, &json!(42)).is_err());
        assert!(matches!(
            Key::from_value(&schema, &json!({"@assetType": "person"})),
            Err(AssetError::InvalidValue { .. })
        ));
    }

    #[test]
    fn serializes_as_reference() {
        let schema = library_schema();
        let key = Key::from_key_values(&schema, "person", &[json!("7")]).unwrap();
        let json = serde_json::to_value(&key).unwrap();
        assert!(is_reference(&json));
        assert_eq!(json["@assetType"], "person");
        assert_eq!(json["@key"], key.key());
    }

    #[test]
    fn reference_detection() {
        assert!(is_reference(&json!({"@assetType": "a", "@key": "a:1"})));
        assert!(is_reference(
            &json!({"@assetType": "a", "@key": "a:1", "@private": true})
        ));
        assert!(!is_reference(&json!({"@assetType": "a", "@key": "a:1", "name": "x"})));
        assert!(!is_reference(&json!({"@assetType": "a"})));
        assert!(!is_reference(&json!("a:1")));
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    #[test]
    fn get_reads_stored_asset() {
        let schema = library_schema();
        let ledger = MemoryLedger::direct();
        let asset = Asset::from_value(&schema, &person_value("1", "Ada")).unwrap();
        asset.put(&ledger).unwrap();

        let key = asset.to_key();
        assert_eq!(key.get(&ledger, &schema).unwrap(), asset);
        let bytes = key.get_bytes(&ledger).unwrap();
        assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), asset.to_value());
    }

    #[test]
    fn get_missing_is_not_found() {
        let schema = library_schema();
        let ledger = MemoryLedger::direct();
        let key = Key::from_key_values(&schema, "person", &[json!("nobody")]).unwrap();
        let err = key.get_bytes(&ledger).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn get_with_empty_key_fails() {
        let ledger = MemoryLedger::direct();
        let err = Key::raw("person", "", false).get_bytes(&ledger).unwrap_err();
        assert!(matches!(err, AssetError::EmptyKey { .. }));
    }
}
