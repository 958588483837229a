//! Asset schema: asset types, their properties, and the data-type catalogue.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::datatype::{DataType, PropType};
use crate::error::{AssetError, AssetResult};

/// One property of an asset type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetProp {
    pub tag: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// Key properties identify the asset; their values derive its key.
    #[serde(default)]
    pub is_key: bool,
    #[serde(default)]
    pub required: bool,
    /// A catalogue data type, `->assetType`, or `[]` followed by either.
    pub data_type: String,
}

impl AssetProp {
    pub fn new(tag: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: String::new(),
            description: String::new(),
            is_key: false,
            required: false,
            data_type: data_type.into(),
        }
    }

    /// Mark as a key property. Key properties are always required.
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self.required = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// The parsed data type. Valid for every prop of a built [`Schema`].
    pub fn prop_type(&self) -> AssetResult<PropType> {
        PropType::parse(&self.data_type).map_err(|reason| AssetError::InvalidValue {
            prop: self.tag.clone(),
            reason,
        })
    }
}

/// An asset type definition.
///
/// A type with a non-empty `readers` list is private: its assets live in the
/// private collection named by the type tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetType {
    pub tag: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    pub props: Vec<AssetProp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub readers: Vec<String>,
}

impl AssetType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: String::new(),
            description: String::new(),
            props: Vec::new(),
            readers: Vec::new(),
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn prop(mut self, prop: AssetProp) -> Self {
        self.props.push(prop);
        self
    }

    pub fn reader(mut self, reader: impl Into<String>) -> Self {
        self.readers.push(reader.into());
        self
    }

    pub fn is_private(&self) -> bool {
        !self.readers.is_empty()
    }

    /// Key properties, in declaration order.
    pub fn key_props(&self) -> impl Iterator<Item = &AssetProp> {
        self.props.iter().filter(|p| p.is_key)
    }

    pub fn get_prop(&self, tag: &str) -> Option<&AssetProp> {
        self.props.iter().find(|p| p.tag == tag)
    }
}

/// Short listing entry for an asset type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssetTypeSummary {
    pub tag: String,
    pub label: String,
    pub description: String,
}

/// A validated, read-only asset schema.
///
/// Built once at startup through [`SchemaBuilder`] and shared behind an
/// `Arc` afterwards.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    asset_types: Vec<AssetType>,
    data_types: Vec<DataType>,
    #[serde(skip)]
    type_index: HashMap<String, usize>,
    #[serde(skip)]
    data_index: HashMap<String, usize>,
}

impl Schema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Build from a JSON document of the form `{"assetTypes": [...]}`,
    /// with built-in data types only.
    pub fn from_json_str(json: &str) -> AssetResult<Self> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SchemaFile {
            asset_types: Vec<AssetType>,
        }

        let file: SchemaFile =
            serde_json::from_str(json).map_err(|e| AssetError::Serialization(e.to_string()))?;
        file.asset_types
            .into_iter()
            .fold(Self::builder(), SchemaBuilder::asset_type)
            .build()
    }

    pub fn asset_type(&self, tag: &str) -> Option<&AssetType> {
        self.type_index.get(tag).map(|&i| &self.asset_types[i])
    }

    /// Like [`asset_type`](Self::asset_type), failing on unknown tags.
    pub fn require_asset_type(&self, tag: &str) -> AssetResult<&AssetType> {
        self.asset_type(tag)
            .ok_or_else(|| AssetError::UnknownAssetType(tag.to_string()))
    }

    pub fn asset_types(&self) -> &[AssetType] {
        &self.asset_types
    }

    pub fn summaries(&self) -> Vec<AssetTypeSummary> {
        self.asset_types
            .iter()
            .map(|t| AssetTypeSummary {
                tag: t.tag.clone(),
                label: t.label.clone(),
                description: t.description.clone(),
            })
            .collect()
    }

    pub fn data_type(&self, tag: &str) -> Option<&DataType> {
        self.data_index.get(tag).map(|&i| &self.data_types[i])
    }

    pub fn data_types(&self) -> &[DataType] {
        &self.data_types
    }

    /// Check that a property type only names known data and asset types.
    pub fn check_prop_type(&self, prop_type: &PropType) -> AssetResult<()> {
        match prop_type {
            PropType::Data(tag) if self.data_type(tag).is_none() => {
                Err(AssetError::UnknownDataType(tag.clone()))
            }
            PropType::Ref(target) if self.asset_type(target).is_none() => {
                Err(AssetError::UnknownAssetType(target.clone()))
            }
            PropType::Array(inner) => self.check_prop_type(inner),
            _ => Ok(()),
        }
    }
}

/// Builder for [`Schema`].
#[derive(Default)]
pub struct SchemaBuilder {
    asset_types: Vec<AssetType>,
    data_types: Vec<DataType>,
}

impl SchemaBuilder {
    pub fn asset_type(mut self, asset_type: AssetType) -> Self {
        self.asset_types.push(asset_type);
        self
    }

    /// Register a custom data type next to the built-ins.
    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_types.push(data_type);
        self
    }

    /// Validate and freeze the schema.
    ///
    /// Fails on duplicate asset type, data type or property tags, on asset
    /// types without key properties, and on properties naming unknown data
    /// or asset types.
    pub fn build(self) -> AssetResult<Schema> {
        let mut data_types = DataType::builtins();
        data_types.extend(self.data_types);

        let mut data_index = HashMap::new();
        for (i, dt) in data_types.iter().enumerate() {
            if data_index.insert(dt.tag().to_string(), i).is_some() {
                return Err(AssetError::Duplicate {
                    kind: "data type",
                    tag: dt.tag().to_string(),
                });
            }
        }

        let mut type_index = HashMap::new();
        for (i, t) in self.asset_types.iter().enumerate() {
            if t.tag.is_empty() || t.tag.contains(':') {
                return Err(AssetError::InvalidAsset(format!(
                    "asset type tag {:?} must be non-empty and must not contain ':'",
                    t.tag
                )));
            }
            if type_index.insert(t.tag.clone(), i).is_some() {
                return Err(AssetError::Duplicate {
                    kind: "asset type",
                    tag: t.tag.clone(),
                });
            }
        }

        let schema = Schema {
            asset_types: self.asset_types,
            data_types,
            type_index,
            data_index,
        };

        for t in &schema.asset_types {
            if t.key_props().next().is_none() {
                return Err(AssetError::NoKeyProps(t.tag.clone()));
            }
            let mut seen = std::collections::HashSet::new();
            for prop in &t.props {
                if !seen.insert(prop.tag.as_str()) || lct_types::attrs::is_reserved(&prop.tag) {
                    return Err(AssetError::Duplicate {
                        kind: "property",
                        tag: format!("{}.{}", t.tag, prop.tag),
                    });
                }
                schema.check_prop_type(&prop.prop_type()?)?;
            }
        }

        debug!(
            asset_types = schema.asset_types.len(),
            data_types = schema.data_types.len(),
            "schema built"
        );
        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> AssetType {
        AssetType::new("person")
            .label("Person")
            .prop(AssetProp::new("id", "string").key())
            .prop(AssetProp::new("name", "string").required())
            .prop(AssetProp::new("height", "number"))
    }

    fn book() -> AssetType {
        AssetType::new("book")
            .prop(AssetProp::new("title", "string").key())
            .prop(AssetProp::new("author", "string").key())
            .prop(AssetProp::new("currentTenant", "->person"))
            .prop(AssetProp::new("genres", "[]string"))
    }

    #[test]
    fn build_and_lookup() {
        let schema = Schema::builder()
            .asset_type(person())
            .asset_type(book())
            .build()
            .unwrap();
        assert_eq!(schema.asset_types().len(), 2);
        assert!(schema.asset_type("book").is_some());
        assert!(schema.asset_type("car").is_none());
        assert!(matches!(
            schema.require_asset_type("car"),
            Err(AssetError::UnknownAssetType(_))
        ));
        assert!(schema.data_type("datetime").is_some());

        let keys: Vec<_> = schema
            .asset_type("book")
            .unwrap()
            .key_props()
            .map(|p| p.tag.as_str())
            .collect();
        assert_eq!(keys, vec!["title", "author"]);
    }

    #[test]
    fn private_iff_readers() {
        let secret = AssetType::new("secret")
            .prop(AssetProp::new("id", "string").key())
            .reader("org1MSP");
        assert!(secret.is_private());
        assert!(!person().is_private());
    }

    #[test]
    fn rejects_duplicate_asset_type() {
        let err = Schema::builder()
            .asset_type(person())
            .asset_type(person())
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::Duplicate { kind: "asset type", .. }));
    }

    #[test]
    fn rejects_duplicate_data_type() {
        let err = Schema::builder()
            .data_type(DataType::new("string", "string", |v| Ok(v.clone())))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::Duplicate { kind: "data type", .. }));
    }

    #[test]
    fn rejects_type_without_key() {
        let err = Schema::builder()
            .asset_type(AssetType::new("loose").prop(AssetProp::new("x", "string")))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::NoKeyProps(t) if t == "loose"));
    }

    #[test]
    fn rejects_unknown_data_type() {
        let err = Schema::builder()
            .asset_type(AssetType::new("t").prop(AssetProp::new("id", "uuid").key()))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::UnknownDataType(t) if t == "uuid"));
    }

    #[test]
    fn rejects_reference_to_unknown_type() {
        let err = Schema::builder().asset_type(book()).build().unwrap_err();
        assert!(matches!(err, AssetError::UnknownAssetType(t) if t == "person"));
    }

    #[test]
    fn rejects_reserved_prop_name() {
        let err = Schema::builder()
            .asset_type(AssetType::new("t").prop(AssetProp::new("@key", "string").key()))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::Duplicate { kind: "property", .. }));
    }

    #[test]
    fn rejects_colon_in_type_tag() {
        let err = Schema::builder()
            .asset_type(AssetType::new("a:b").prop(AssetProp::new("id", "string").key()))
            .build()
            .unwrap_err();
        assert!(matches!(err, AssetError::InvalidAsset(_)));
    }

    #[test]
    fn custom_data_type_usable_by_props() {
        let schema = Schema::builder()
            .data_type(DataType::new("cpf", "string", |v| Ok(v.clone())))
            .asset_type(AssetType::new("citizen").prop(AssetProp::new("cpf", "cpf").key()))
            .build()
            .unwrap();
        assert!(schema.data_type("cpf").is_some());
    }

    #[test]
    fn from_json_document() {
        let schema = Schema::from_json_str(
            r#"{"assetTypes": [
                {"tag": "person", "label": "Person", "props": [
                    {"tag": "id", "isKey": true, "required": true, "dataType": "string"},
                    {"tag": "name", "dataType": "string"}
                ]},
                {"tag": "secret", "props": [
                    {"tag": "id", "isKey": true, "dataType": "string"}
                ], "readers": ["org1MSP"]}
            ]}"#,
        )
        .unwrap();
        assert_eq!(schema.summaries()[0].label, "Person");
        assert!(schema.asset_type("secret").unwrap().is_private());
        assert!(Schema::from_json_str("not json").is_err());
    }

    #[test]
    fn serializes_camel_case() {
        let schema = Schema::builder().asset_type(person()).build().unwrap();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["assetTypes"][0]["props"][0]["isKey"], true);
        assert_eq!(json["dataTypes"][0]["tag"], "string");
        assert!(json["assetTypes"][0].get("readers").is_none());
    }
}
