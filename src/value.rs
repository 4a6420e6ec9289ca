//! Dynamic property values

use std::collections::BTreeMap;
use std::fmt;

use crate::class::Reflectable;
use crate::error::TransformError;

/// A property value as seen through dynamic access
pub enum Value {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
    Object(Box<dyn Reflectable>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Reflectable> {
        match self {
            Value::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    /// Short name of the value's shape, for diagnostics
    pub fn kind_name(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(_) => "bool".to_string(),
            Value::Number(_) => "number".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Array(_) => "array".to_string(),
            Value::Dictionary(_) => "dictionary".to_string(),
            Value::Object(object) => format!("object {}", object.class_info().name()),
        }
    }

    /// Convert into JSON; objects have to be transformed first
    pub fn into_json(self) -> Result<serde_json::Value, TransformError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(items) => serde_json::Value::Array(
                items
                    .into_iter()
                    .map(Value::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Dictionary(entries) => {
                let mut map = serde_json::Map::new();
                for (key, value) in entries {
                    map.insert(key, value.into_json()?);
                }
                serde_json::Value::Object(map)
            }
            Value::Object(object) => {
                return Err(TransformError::NotRepresentable(
                    object.class_info().name().to_string(),
                ))
            }
        })
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Dictionary(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::Array(items) => f.debug_tuple("Array").field(items).finish(),
            Value::Dictionary(entries) => f.debug_tuple("Dictionary").field(entries).finish(),
            Value::Object(object) => write!(f, "Object({})", object.class_info().name()),
        }
    }
}
