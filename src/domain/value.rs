//! Configuration values
//!
//! A [`Value`] is one node of a configuration tree: a scalar, an ordered list of
//! values or a nested [`Partial`]. Decoded documents from every supported
//! format are converted into this representation right after parsing.

use super::errors::StrataError;
use super::partial::Partial;
use super::result::Result;
use serde::Serialize;
use std::fmt;

/// One node of a configuration tree
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Explicit `null` in the source document
    #[default]
    Null,
    /// Boolean scalar
    Bool(bool),
    /// Integer scalar
    Int(i64),
    /// Floating point scalar
    Float(f64),
    /// String scalar
    String(String),
    /// Ordered sequence, replaced wholesale on merge
    List(Vec<Value>),
    /// Nested tree, merged recursively
    Tree(Partial),
}

impl Value {
    /// Human readable name of the stored variant
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Tree(_) => "partial",
        }
    }

    /// Whether this value is a nested tree
    pub fn is_tree(&self) -> bool {
        matches!(self, Value::Tree(_))
    }

    /// Borrow the nested tree, if any
    pub fn as_tree(&self) -> Option<&Partial> {
        match self {
            Value::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    /// Coerce to a boolean (`true`/`false` strings are accepted)
    pub fn to_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Coerce to an integer (integral floats and numeric strings are accepted)
    pub fn to_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                if *f >= i64::MIN as f64 && *f < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Coerce to a float (integers and numeric strings are accepted)
    pub fn to_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Coerce to a string (scalars are rendered)
    pub fn to_string_value(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            _ => None,
        }
    }

    /// Clone out the list, if this is one
    pub fn to_list(&self) -> Option<Vec<Value>> {
        match self {
            Value::List(items) => Some(items.clone()),
            _ => None,
        }
    }

    /// Clone out the nested tree, if this is one
    pub fn to_partial(&self) -> Option<Partial> {
        self.as_tree().cloned()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(_) | Value::Tree(_) => {
                let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                write!(f, "{rendered}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Partial> for Value {
    fn from(tree: Partial) -> Self {
        Value::Tree(tree)
    }
}

impl From<serde_json::Value> for Value {
    fn from(raw: serde_json::Value) -> Self {
        match raw {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Tree(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<toml::Value> for Value {
    fn from(raw: toml::Value) -> Self {
        match raw {
            toml::Value::String(s) => Value::String(s),
            toml::Value::Integer(i) => Value::Int(i),
            toml::Value::Float(x) => Value::Float(x),
            toml::Value::Boolean(b) => Value::Bool(b),
            toml::Value::Datetime(dt) => Value::String(dt.to_string()),
            toml::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            toml::Value::Table(table) => Value::Tree(
                table
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<serde_yaml::Value> for Value {
    type Error = StrataError;

    fn try_from(raw: serde_yaml::Value) -> Result<Self> {
        Ok(match raw {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            serde_yaml::Value::Mapping(map) => {
                let mut tree = Partial::new();
                for (key, value) in map {
                    tree.insert(yaml_key(key)?, Value::try_from(value)?);
                }
                Value::Tree(tree)
            }
            serde_yaml::Value::Tagged(tagged) => Value::try_from(tagged.value)?,
        })
    }
}

// Scalar mapping keys are stringified, composite keys cannot address a path.
fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(StrataError::Decode(format!(
            "YAML: unsupported mapping key {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Value::Bool(true), Some(true); "bool")]
    #[test_case(Value::from("FALSE"), Some(false); "string literal")]
    #[test_case(Value::from("yes"), None; "other string")]
    #[test_case(Value::Int(1), None; "int is not bool")]
    fn test_to_bool(value: Value, expected: Option<bool>) {
        assert_eq!(value.to_bool(), expected);
    }

    #[test_case(Value::Int(8080), Some(8080); "int")]
    #[test_case(Value::Float(3.0), Some(3); "integral float")]
    #[test_case(Value::Float(3.5), None; "fractional float")]
    #[test_case(Value::from(" 42 "), Some(42); "numeric string")]
    #[test_case(Value::from("abc"), None; "text")]
    #[test_case(Value::Null, None; "null")]
    #[test_case(Value::Float(9_223_372_036_854_775_808.0), None; "float above i64 range")]
    #[test_case(Value::Float(-9_223_372_036_854_775_808.0), Some(i64::MIN); "float at i64 min")]
    fn test_to_int(value: Value, expected: Option<i64>) {
        assert_eq!(value.to_int(), expected);
    }

    #[test_case(Value::Float(0.5), Some(0.5); "float")]
    #[test_case(Value::Int(2), Some(2.0); "int")]
    #[test_case(Value::from("1.25"), Some(1.25); "string")]
    #[test_case(Value::List(vec![]), None; "list")]
    fn test_to_float(value: Value, expected: Option<f64>) {
        assert_eq!(value.to_float(), expected);
    }

    #[test]
    fn test_to_string_value_renders_scalars() {
        assert_eq!(Value::Int(7).to_string_value().as_deref(), Some("7"));
        assert_eq!(Value::Bool(true).to_string_value().as_deref(), Some("true"));
        assert_eq!(Value::List(vec![]).to_string_value(), None);
    }

    #[test]
    fn test_from_json() {
        let raw = serde_json::json!({"a": {"b": [1, 2.5, "x", null, true]}});
        let value = Value::from(raw);
        let tree = value.as_tree().unwrap();
        let inner = tree.entry("a").and_then(Value::as_tree).unwrap();
        assert_eq!(
            inner.entry("b"),
            Some(&Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::from("x"),
                Value::Null,
                Value::Bool(true),
            ]))
        );
    }

    #[test]
    fn test_from_json_large_unsigned_becomes_float() {
        let value = Value::from(serde_json::json!(u64::MAX));
        assert!(matches!(value, Value::Float(_)));
    }

    #[test]
    fn test_from_yaml_stringifies_scalar_keys() {
        let raw: serde_yaml::Value = serde_yaml::from_str("1: one\ntrue: yes\n").unwrap();
        let value = Value::try_from(raw).unwrap();
        let tree = value.as_tree().unwrap();
        assert_eq!(tree.entry("1"), Some(&Value::from("one")));
        assert_eq!(tree.entry("true"), Some(&Value::from("yes")));
    }

    #[test]
    fn test_from_yaml_rejects_composite_keys() {
        let raw: serde_yaml::Value = serde_yaml::from_str("? [a, b]\n: value\n").unwrap();
        assert!(matches!(
            Value::try_from(raw),
            Err(StrataError::Decode(_))
        ));
    }

    #[test]
    fn test_from_toml_datetime_is_string() {
        let raw: toml::Value = toml::from_str("at = 1979-05-27T07:32:00Z").unwrap();
        let value = Value::from(raw);
        assert_eq!(
            value.as_tree().and_then(|t| t.entry("at")),
            Some(&Value::from("1979-05-27T07:32:00Z"))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(
            Value::List(vec![Value::Int(1), Value::Int(2)]).to_string(),
            "[1,2]"
        );
    }
}
