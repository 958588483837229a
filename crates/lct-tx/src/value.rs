//! Validated argument values.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use lct_assets::{format_datetime, Asset, Key};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

/// One validated argument value. The variant follows the declared type.
#[derive(Clone, Debug, PartialEq)]
pub enum ArgValue {
    String(String),
    Number(f64),
    Integer(i64),
    Bool(bool),
    DateTime(DateTime<Utc>),
    Key(Key),
    Asset(Asset),
    Object(Map<String, Value>),
    Array(Vec<ArgValue>),
    /// Normalized output of a custom data type.
    Custom(Value),
}

impl ArgValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Self::Key(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_asset(&self) -> Option<&Asset> {
        match self {
            Self::Asset(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[ArgValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// JSON form. Keys become reference objects, timestamps RFC 3339
    /// strings.
    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Integer(n) => Value::from(*n),
            Self::Bool(b) => Value::Bool(*b),
            Self::DateTime(dt) => Value::String(format_datetime(dt)),
            Self::Key(k) => k.to_reference(),
            Self::Asset(a) => a.to_value(),
            Self::Object(o) => Value::Object(o.clone()),
            Self::Array(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            Self::Custom(v) => v.clone(),
        }
    }
}

impl Serialize for ArgValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// The validated arguments of one call, by tag.
///
/// Only declared arguments that were present in the request appear here.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Args {
    values: BTreeMap<String, ArgValue>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: impl Into<String>, value: ArgValue) {
        self.values.insert(tag.into(), value);
    }

    pub fn get(&self, tag: &str) -> Option<&ArgValue> {
        self.values.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.values.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ArgValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_str(&self, tag: &str) -> Option<&str> {
        self.get(tag).and_then(ArgValue::as_str)
    }

    pub fn get_f64(&self, tag: &str) -> Option<f64> {
        self.get(tag).and_then(ArgValue::as_f64)
    }

    pub fn get_i64(&self, tag: &str) -> Option<i64> {
        self.get(tag).and_then(ArgValue::as_i64)
    }

    /// A boolean argument; absent counts as `false`.
    pub fn flag(&self, tag: &str) -> bool {
        self.get(tag).and_then(ArgValue::as_bool).unwrap_or(false)
    }

    pub fn get_datetime(&self, tag: &str) -> Option<DateTime<Utc>> {
        self.get(tag).and_then(ArgValue::as_datetime)
    }

    pub fn get_key(&self, tag: &str) -> Option<&Key> {
        self.get(tag).and_then(ArgValue::as_key)
    }

    pub fn get_asset(&self, tag: &str) -> Option<&Asset> {
        self.get(tag).and_then(ArgValue::as_asset)
    }

    pub fn get_object(&self, tag: &str) -> Option<&Map<String, Value>> {
        self.get(tag).and_then(ArgValue::as_object)
    }

    pub fn get_array(&self, tag: &str) -> Option<&[ArgValue]> {
        self.get(tag).and_then(ArgValue::as_array)
    }
}
