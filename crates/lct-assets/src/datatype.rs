//! Data-type catalogue and the property type grammar.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Number, Value};

/// Parse function of a data type: validates a raw value and returns its
/// normalized form, or a reason for rejecting it.
pub type ParseFn = Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>;

/// A named value type usable by asset properties and transaction arguments.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataType {
    tag: String,
    description: String,
    /// JSON type the normalized value has (`string`, `number`, `boolean`,
    /// `object`, `array`).
    json_type: String,
    #[serde(skip)]
    parse: ParseFn,
}

impl DataType {
    /// Create a custom data type.
    pub fn new<F>(tag: impl Into<String>, json_type: impl Into<String>, parse: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            tag: tag.into(),
            description: String::new(),
            json_type: json_type.into(),
            parse: Arc::new(parse),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn json_type(&self) -> &str {
        &self.json_type
    }

    /// Validate `value` and return its normalized form.
    pub fn parse(&self, value: &Value) -> Result<Value, String> {
        (self.parse)(value)
    }

    /// The built-in catalogue: `string`, `number`, `integer`, `boolean`,
    /// `datetime`.
    pub fn builtins() -> Vec<DataType> {
        vec![
            DataType::new("string", "string", parse_string)
                .with_description("Any UTF-8 string"),
            DataType::new("number", "number", parse_number)
                .with_description("A floating point number"),
            DataType::new("integer", "number", parse_integer)
                .with_description("A whole number"),
            DataType::new("boolean", "boolean", parse_boolean)
                .with_description("true or false"),
            DataType::new("datetime", "string", parse_datetime)
                .with_description("An RFC 3339 timestamp, normalized to UTC"),
        ]
    }
}

impl fmt::Debug for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataType")
            .field("tag", &self.tag)
            .field("json_type", &self.json_type)
            .finish()
    }
}

fn parse_string(value: &Value) -> Result<Value, String> {
    match value {
        Value::String(_) => Ok(value.clone()),
        other => Err(format!("expected a string, got {}", kind_of(other))),
    }
}

fn parse_number(value: &Value) -> Result<Value, String> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| format!("expected a number, got {}", kind_of(value)))
}

fn parse_integer(value: &Value) -> Result<Value, String> {
    let n = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(f64_to_i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    n.map(Value::from)
        .ok_or_else(|| format!("expected an integer, got {}", kind_of(value)))
}

/// Exact conversion only: fractional, non-finite and out-of-range values fail.
fn f64_to_i64(f: f64) -> Option<i64> {
    // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn parse_boolean(value: &Value) -> Result<Value, String> {
    match value {
        Value::Bool(_) => Ok(value.clone()),
        Value::String(s) if s == "true" => Ok(Value::Bool(true)),
        Value::String(s) if s == "false" => Ok(Value::Bool(false)),
        other => Err(format!("expected a boolean, got {}", kind_of(other))),
    }
}

fn parse_datetime(value: &Value) -> Result<Value, String> {
    let s = value
        .as_str()
        .ok_or_else(|| format!("expected an RFC 3339 string, got {}", kind_of(value)))?;
    let parsed = DateTime::parse_from_rfc3339(s).map_err(|e| format!("{s:?}: {e}"))?;
    Ok(Value::String(format_datetime(&parsed.with_timezone(&Utc))))
}

/// Canonical string form of a timestamp, as produced by the `datetime` type.
pub fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parsed form of a property's `data_type` string.
///
/// ```text
/// string        a catalogue data type
/// ->person      a reference to an asset of type `person`
/// []->person    an array of references
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PropType {
    Data(String),
    Ref(String),
    Array(Box<PropType>),
}

impl PropType {
    /// Parse a data type string. Fails on an empty name.
    pub fn parse(s: &str) -> Result<Self, String> {
        if let Some(inner) = s.strip_prefix("[]") {
            return Ok(Self::Array(Box::new(Self::parse(inner)?)));
        }
        if let Some(target) = s.strip_prefix("->") {
            if target.is_empty() {
                return Err("reference without an asset type".into());
            }
            return Ok(Self::Ref(target.to_string()));
        }
        if s.is_empty() {
            return Err("empty data type".into());
        }
        Ok(Self::Data(s.to_string()))
    }
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(tag) => f.write_str(tag),
            Self::Ref(target) => write!(f, "->{target}"),
            Self::Array(inner) => write!(f, "[]{inner}"),
        }
    }
}
