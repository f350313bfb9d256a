//! Typed path accessors
//!
//! [`Lookup`] is implemented by everything that can resolve a path to a value:
//! a bare [`Partial`](super::Partial), every source and the manager. Each
//! implementor decides how the path is split; all of them share the typed
//! accessors and their default/conversion rules below.
//!
//! The `*_or` accessors return the supplied default when the path is absent.
//! The plain accessors fail with [`StrataError::PathNotFound`] instead. Both
//! fail with [`StrataError::Conversion`] when a value is present but cannot be
//! coerced to the requested type.

use super::errors::StrataError;
use super::partial::Partial;
use super::result::Result;
use super::value::Value;

/// Path-based read access to a configuration tree
pub trait Lookup {
    /// Resolve `path` to an owned copy of the stored value
    fn lookup(&self, path: &str) -> Option<Value>;

    /// Whether `path` resolves
    fn has(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    /// Raw value at `path`
    fn get(&self, path: &str) -> Result<Value> {
        self.lookup(path)
            .ok_or_else(|| StrataError::PathNotFound(path.to_string()))
    }

    /// Raw value at `path`, or `default` when absent
    fn get_or(&self, path: &str, default: Value) -> Value {
        self.lookup(path).unwrap_or(default)
    }

    /// Boolean at `path`
    fn bool(&self, path: &str) -> Result<bool> {
        convert(path, self.get(path)?, "bool", Value::to_bool)
    }

    /// Boolean at `path`, or `default` when absent
    fn bool_or(&self, path: &str, default: bool) -> Result<bool> {
        convert_or(path, self.lookup(path), default, "bool", Value::to_bool)
    }

    /// Integer at `path`
    fn int(&self, path: &str) -> Result<i64> {
        convert(path, self.get(path)?, "int", Value::to_int)
    }

    /// Integer at `path`, or `default` when absent
    fn int_or(&self, path: &str, default: i64) -> Result<i64> {
        convert_or(path, self.lookup(path), default, "int", Value::to_int)
    }

    /// Float at `path`
    fn float(&self, path: &str) -> Result<f64> {
        convert(path, self.get(path)?, "float", Value::to_float)
    }

    /// Float at `path`, or `default` when absent
    fn float_or(&self, path: &str, default: f64) -> Result<f64> {
        convert_or(path, self.lookup(path), default, "float", Value::to_float)
    }

    /// String at `path`
    fn string(&self, path: &str) -> Result<String> {
        convert(path, self.get(path)?, "string", Value::to_string_value)
    }

    /// String at `path`, or `default` when absent
    fn string_or(&self, path: &str, default: &str) -> Result<String> {
        convert_or(
            path,
            self.lookup(path),
            default.to_string(),
            "string",
            Value::to_string_value,
        )
    }

    /// List at `path`
    fn list(&self, path: &str) -> Result<Vec<Value>> {
        convert(path, self.get(path)?, "list", Value::to_list)
    }

    /// List at `path`, or `default` when absent
    fn list_or(&self, path: &str, default: Vec<Value>) -> Result<Vec<Value>> {
        convert_or(path, self.lookup(path), default, "list", Value::to_list)
    }

    /// Sub-tree at `path`
    fn partial(&self, path: &str) -> Result<Partial> {
        convert(path, self.get(path)?, "partial", Value::to_partial)
    }

    /// Sub-tree at `path`, or `default` when absent
    fn partial_or(&self, path: &str, default: Partial) -> Result<Partial> {
        convert_or(path, self.lookup(path), default, "partial", Value::to_partial)
    }
}

fn convert<T>(
    path: &str,
    value: Value,
    expected: &'static str,
    coerce: impl Fn(&Value) -> Option<T>,
) -> Result<T> {
    coerce(&value).ok_or_else(|| StrataError::Conversion {
        path: path.to_string(),
        expected,
    })
}

fn convert_or<T>(
    path: &str,
    value: Option<Value>,
    default: T,
    expected: &'static str,
    coerce: impl Fn(&Value) -> Option<T>,
) -> Result<T> {
    match value {
        Some(value) => convert(path, value, expected, coerce),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Partial {
        Partial::from_document(Value::from(serde_json::json!({
            "server": {"port": "8080", "debug": true, "ratio": 0.75, "hosts": ["a", "b"]},
            "name": "strata"
        })))
        .unwrap()
    }

    #[test]
    fn test_typed_accessors() {
        let p = sample();
        assert_eq!(p.int("server.port").unwrap(), 8080);
        assert!(p.bool("server.debug").unwrap());
        assert_eq!(p.float("server.ratio").unwrap(), 0.75);
        assert_eq!(p.string("name").unwrap(), "strata");
        assert_eq!(p.list("server.hosts").unwrap().len(), 2);
        assert_eq!(p.partial("server").unwrap().len(), 4);
    }

    #[test]
    fn test_missing_path_without_default_fails() {
        let p = sample();
        assert!(matches!(
            p.int("server.timeout"),
            Err(StrataError::PathNotFound(ref path)) if path == "server.timeout"
        ));
        assert!(matches!(p.get("nope"), Err(StrataError::PathNotFound(_))));
    }

    #[test]
    fn test_missing_path_with_default() {
        let p = sample();
        assert_eq!(p.int_or("server.timeout", 30).unwrap(), 30);
        assert_eq!(p.string_or("missing", "fallback").unwrap(), "fallback");
        assert!(p.partial_or("missing", Partial::new()).unwrap().is_empty());
        assert_eq!(p.get_or("missing", Value::Int(1)), Value::Int(1));
    }

    #[test]
    fn test_default_does_not_mask_conversion_errors() {
        let p = sample();
        assert!(matches!(
            p.int_or("name", 1),
            Err(StrataError::Conversion { expected: "int", .. })
        ));
        assert!(matches!(
            p.partial("name"),
            Err(StrataError::Conversion { expected: "partial", .. })
        ));
        assert!(matches!(
            p.list("server"),
            Err(StrataError::Conversion { expected: "list", .. })
        ));
    }

    #[test]
    fn test_has() {
        let p = sample();
        assert!(p.has("server.hosts"));
        assert!(!p.has("server.hosts.0"));
    }
}
