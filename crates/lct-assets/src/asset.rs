//! Full assets: validation against the schema, serialization, and
//! persistence.

use lct_ledger::LedgerStub;
use lct_types::attrs;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::datatype::{kind_of, PropType};
use crate::error::{AssetError, AssetResult};
use crate::identity::Identity;
use crate::key::{derive_key, type_tag_of, Key};
use crate::schema::Schema;

/// Validate a raw value against a property type and return its normalized
/// form. References are normalized to reference objects.
pub fn validate_value(
    schema: &Schema,
    prop: &str,
    prop_type: &PropType,
    raw: &Value,
) -> AssetResult<Value> {
    match prop_type {
        PropType::Data(tag) => {
            let data_type = schema
                .data_type(tag)
                .ok_or_else(|| AssetError::UnknownDataType(tag.clone()))?;
            data_type
                .parse(raw)
                .map_err(|reason| AssetError::InvalidValue {
                    prop: prop.to_string(),
                    reason,
                })
        }
        PropType::Ref(target) => {
            let key = Key::from_value(schema, raw).map_err(|e| AssetError::InvalidValue {
                prop: prop.to_string(),
                reason: e.to_string(),
            })?;
            if key.type_tag() != target.as_str() {
                return Err(AssetError::InvalidValue {
                    prop: prop.to_string(),
                    reason: format!(
                        "expected a reference to {target}, got {}",
                        key.type_tag()
                    ),
                });
            }
            Ok(key.to_reference())
        }
        PropType::Array(inner) => {
            let items = raw.as_array().ok_or_else(|| AssetError::InvalidValue {
                prop: prop.to_string(),
                reason: format!("expected an array, got {}", kind_of(raw)),
            })?;
            items
                .iter()
                .map(|item| validate_value(schema, prop, inner, item))
                .collect::<AssetResult<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

/// A full asset: identity plus validated attributes.
///
/// Serialized flat: `@assetType`, `@key`, then every attribute. Reference
/// attributes hold reference objects unless the asset was produced by the
/// resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    type_tag: String,
    key: String,
    private: bool,
    key_values: Vec<Value>,
    attrs: Map<String, Value>,
}

impl Asset {
    /// Build and validate an asset from a raw JSON object.
    ///
    /// Every required and key property must be present, every present
    /// property must parse as its data type, and unknown properties are
    /// rejected. A supplied `@key` must match the derived key.
    pub fn from_value(schema: &Schema, value: &Value) -> AssetResult<Self> {
        let obj = value.as_object().ok_or_else(|| {
            AssetError::InvalidAsset(format!("expected an object, got {}", kind_of(value)))
        })?;
        let type_tag = type_tag_of(obj)?;
        let asset_type = schema.require_asset_type(type_tag)?;

        if let Some(unknown) = obj
            .keys()
            .find(|k| !attrs::is_reserved(k) && asset_type.get_prop(k).is_none())
        {
            return Err(AssetError::InvalidAsset(format!(
                "{type_tag} has no property {unknown:?}"
            )));
        }

        let mut values = Map::new();
        let mut key_values = Vec::new();
        for prop in &asset_type.props {
            match obj.get(&prop.tag).filter(|v| !v.is_null()) {
                Some(raw) => {
                    let v = validate_value(schema, &prop.tag, &prop.prop_type()?, raw)?;
                    if prop.is_key {
                        key_values.push(v.clone());
                    }
                    values.insert(prop.tag.clone(), v);
                }
                None if prop.required || prop.is_key => {
                    return Err(AssetError::InvalidValue {
                        prop: prop.tag.clone(),
                        reason: "required property is missing".into(),
                    });
                }
                None => {}
            }
        }

        let key = derive_key(type_tag, &key_values)?;
        if let Some(given) = obj.get(attrs::KEY) {
            if given.as_str() != Some(key.as_str()) {
                return Err(AssetError::InvalidAsset(format!(
                    "{} {given} does not match derived key {key}",
                    attrs::KEY
                )));
            }
        }

        Ok(Self {
            type_tag: type_tag.to_string(),
            key,
            private: asset_type.is_private(),
            key_values,
            attrs: values,
        })
    }

    /// Every stored asset of `type_tag`, ordered by key.
    pub fn scan(port: &dyn LedgerStub, schema: &Schema, type_tag: &str) -> AssetResult<Vec<Self>> {
        let asset_type = schema.require_asset_type(type_tag)?;
        let prefix = format!("{type_tag}:");
        let entries = if asset_type.is_private() {
            port.get_private_data_by_prefix(type_tag, &prefix)?
        } else {
            port.get_state_by_prefix(&prefix)?
        };
        entries
            .iter()
            .map(|kv| {
                let value: Value = serde_json::from_slice(&kv.value)
                    .map_err(|e| AssetError::Serialization(e.to_string()))?;
                Self::from_value(schema, &value)
            })
            .collect()
    }

    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    pub fn get(&self, prop: &str) -> Option<&Value> {
        self.attrs.get(prop)
    }

    /// The key of this asset, keeping its key property values.
    pub fn to_key(&self) -> Key {
        Key::with_values(
            self.type_tag.clone(),
            self.key.clone(),
            self.private,
            self.key_values.clone(),
        )
    }

    /// The flat JSON form of this asset.
    pub fn to_value(&self) -> Value {
        let mut obj = Map::new();
        obj.insert(attrs::ASSET_TYPE.into(), Value::String(self.type_tag.clone()));
        obj.insert(attrs::KEY.into(), Value::String(self.key.clone()));
        for (k, v) in &self.attrs {
            obj.insert(k.clone(), v.clone());
        }
        Value::Object(obj)
    }

    pub(crate) fn with_attrs(mut self, attrs: Map<String, Value>) -> Self {
        self.attrs = attrs;
        self
    }

    /// Write the asset to its partition, replacing any previous value.
    pub fn put(&self, port: &dyn LedgerStub) -> AssetResult<()> {
        let bytes =
            serde_json::to_vec(&self.to_value()).map_err(|e| AssetError::Serialization(e.to_string()))?;
        if self.private {
            port.put_private_data(&self.type_tag, &self.key, &bytes)?;
        } else {
            port.put_state(&self.key, &bytes)?;
        }
        Ok(())
    }

    /// Remove the asset from its partition.
    pub fn delete(&self, port: &dyn LedgerStub) -> AssetResult<()> {
        if self.private {
            port.del_private_data(&self.type_tag, &self.key)?;
        } else {
            port.del_state(&self.key)?;
        }
        Ok(())
    }
}

impl Identity for Asset {
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

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}
