//! Argument declarations and their typed validation.

use std::fmt;

use chrono::{DateTime, Utc};
use lct_assets::{Asset, Identity, Key, Schema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{TxError, TxResult};
use crate::value::ArgValue;

/// A declared transaction argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub tag: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: String,
    /// See [`ArgType`] for the accepted forms.
    pub data_type: String,
    #[serde(default)]
    pub required: bool,
}

impl Argument {
    pub fn new(tag: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            label: String::new(),
            description: String::new(),
            data_type: data_type.into(),
            required: false,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Parsed argument data type.
///
/// ```text
/// string, integer, ...   a catalogue data type (built-in or custom)
/// @key                   a key of any asset type
/// ->person               a key of a `person` asset
/// @asset                 a full asset, validated against the schema
/// @object                any JSON object
/// []T                    an array of T
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArgType {
    Data(String),
    Key,
    Ref(String),
    Asset,
    Object,
    Array(Box<ArgType>),
}

impl ArgType {
    /// Parse a data type string, checking every named type against the
    /// schema. Returns the unknown name on failure.
    pub fn parse(s: &str, schema: &Schema) -> Result<Self, String> {
        if let Some(inner) = s.strip_prefix("[]") {
            return Ok(Self::Array(Box::new(Self::parse(inner, schema)?)));
        }
        match s {
            "@key" => return Ok(Self::Key),
            "@asset" => return Ok(Self::Asset),
            "@object" => return Ok(Self::Object),
            _ => {}
        }
        if let Some(target) = s.strip_prefix("->") {
            return schema
                .asset_type(target)
                .map(|_| Self::Ref(target.to_string()))
                .ok_or_else(|| s.to_string());
        }
        schema
            .data_type(s)
            .map(|_| Self::Data(s.to_string()))
            .ok_or_else(|| s.to_string())
    }

    /// Validate and convert a raw value.
    pub fn coerce(&self, schema: &Schema, arg: &str, raw: &Value) -> TxResult<ArgValue> {
        let invalid = |reason: String| TxError::InvalidArgumentType {
            arg: arg.to_string(),
            expected: self.to_string(),
            reason,
        };

        match self {
            Self::Data(tag) => {
                let data_type = schema
                    .data_type(tag)
                    .ok_or_else(|| invalid(format!("unknown data type {tag:?}")))?;
                let value = data_type.parse(raw).map_err(invalid)?;
                data_value(tag, value).map_err(invalid)
            }
            Self::Key => Key::from_value(schema, raw)
                .map(ArgValue::Key)
                .map_err(|e| invalid(e.to_string())),
            Self::Ref(target) => {
                let key = Key::from_value(schema, raw).map_err(|e| invalid(e.to_string()))?;
                if key.type_tag() != target.as_str() {
                    return Err(invalid(format!("got a key of type {}", key.type_tag())));
                }
                Ok(ArgValue::Key(key))
            }
            Self::Asset => Asset::from_value(schema, raw)
                .map(ArgValue::Asset)
                .map_err(|e| invalid(e.to_string())),
            Self::Object => raw
                .as_object()
                .cloned()
                .map(ArgValue::Object)
                .ok_or_else(|| invalid("expected an object".into())),
            Self::Array(inner) => {
                let items = raw
                    .as_array()
                    .ok_or_else(|| invalid("expected an array".into()))?;
                items
                    .iter()
                    .map(|item| inner.coerce(schema, arg, item))
                    .collect::<TxResult<Vec<_>>>()
                    .map(ArgValue::Array)
            }
        }
    }
}

fn data_value(tag: &str, value: Value) -> Result<ArgValue, String> {
    let mismatch = || format!("{tag} produced an unexpected value");
    match tag {
        "string" => value.as_str().map(|s| ArgValue::String(s.to_string())).ok_or_else(mismatch),
        "number" => value.as_f64().map(ArgValue::Number).ok_or_else(mismatch),
        "integer" => value.as_i64().map(ArgValue::Integer).ok_or_else(mismatch),
        "boolean" => value.as_bool().map(ArgValue::Bool).ok_or_else(mismatch),
        "datetime" => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| ArgValue::DateTime(dt.with_timezone(&Utc)))
            .ok_or_else(mismatch),
        _ => Ok(ArgValue::Custom(value)),
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(tag) => f.write_str(tag),
            Self::Key => f.write_str("@key"),
            Self::Ref(target) => write!(f, "->{target}"),
            Self::Asset => f.write_str("@asset"),
            Self::Object => f.write_str("@object"),
            Self::Array(inner) => write!(f, "[]{inner}"),
        }
    }
}
