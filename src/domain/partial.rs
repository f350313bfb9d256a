//! Configuration tree
//!
//! A [`Partial`] is one chunk of configuration: an insertion-ordered map from
//! key to [`Value`]. Sources each own one, and the manager merges them into a
//! single tree on every rebuild.
//!
//! # Paths
//!
//! Paths are split on a separator (`.` unless configured otherwise). Empty
//! segments collapse, so `"node..inner"` addresses the same value as
//! `"node.inner"`, and a path without any segment addresses the whole tree.
//! There is no escaping; keys that contain the separator need a different
//! separator.

use super::errors::StrataError;
use super::lookup::Lookup;
use super::result::Result;
use super::value::Value;
use indexmap::IndexMap;
use serde::Serialize;

/// Separator used when none is configured
pub const DEFAULT_SEPARATOR: &str = ".";

/// Split a path into its non-empty segments.
pub fn segments<'a>(path: &'a str, separator: &str) -> Vec<&'a str> {
    if separator.is_empty() {
        return if path.is_empty() { Vec::new() } else { vec![path] };
    }
    path.split(separator).filter(|s| !s.is_empty()).collect()
}

/// Insertion-ordered configuration tree
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Partial {
    entries: IndexMap<String, Value>,
}

impl Partial {
    /// Create an empty tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a decoded document.
    ///
    /// The document root must be a mapping; `null` (an empty YAML file, for
    /// instance) yields an empty tree.
    pub fn from_document(document: Value) -> Result<Self> {
        match document {
            Value::Tree(tree) => Ok(tree),
            Value::Null => Ok(Partial::new()),
            other => Err(StrataError::Decode(format!(
                "document root must be a mapping, found {}",
                other.type_name()
            ))),
        }
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a top-level key, returning the previous value.
    ///
    /// Re-inserting a key overwrites the value but keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Remove a top-level key
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Top-level value for `key`
    pub fn entry(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Whether `key` exists at the top level
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Top-level keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Top-level entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Deep-merge `other` into `self`.
    ///
    /// Trees present on both sides are merged recursively; anything else from
    /// `other` (scalars, lists, or a tree replacing a scalar) overwrites.
    pub fn merge(&mut self, other: &Partial) {
        for (key, incoming) in &other.entries {
            match (self.entries.get_mut(key), incoming) {
                (Some(Value::Tree(current)), Value::Tree(nested)) => current.merge(nested),
                _ => {
                    self.entries.insert(key.clone(), incoming.clone());
                }
            }
        }
    }

    /// Borrow the value at a non-empty list of segments
    fn walk(&self, segments: &[&str]) -> Option<&Value> {
        let (last, parents) = segments.split_last()?;
        let mut node = self;
        for segment in parents {
            node = node.entries.get(*segment)?.as_tree()?;
        }
        node.entries.get(*last)
    }

    /// Resolve `path` using `separator`, returning an owned copy.
    ///
    /// A path with no segments resolves to a copy of the whole tree.
    pub fn value_at(&self, path: &str, separator: &str) -> Option<Value> {
        let segments = segments(path, separator);
        if segments.is_empty() {
            return Some(Value::Tree(self.clone()));
        }
        self.walk(&segments).cloned()
    }

    /// Whether `path` resolves using `separator`
    pub fn has_path(&self, path: &str, separator: &str) -> bool {
        let segments = segments(path, separator);
        segments.is_empty() || self.walk(&segments).is_some()
    }

    /// Write `value` at `path`, creating intermediate trees as needed.
    ///
    /// Intermediate nodes that are not trees are replaced by empty trees.
    /// Writing to the root requires a tree value, which replaces the content.
    pub fn set_with(&mut self, path: &str, separator: &str, value: Value) -> Result<()> {
        let segments = segments(path, separator);
        let Some((last, parents)) = segments.split_last() else {
            return match value {
                Value::Tree(tree) => {
                    *self = tree;
                    Ok(())
                }
                _ => Err(StrataError::Conversion {
                    path: path.to_string(),
                    expected: "partial",
                }),
            };
        };

        let mut node = self;
        for segment in parents {
            let slot = node
                .entries
                .entry((*segment).to_string())
                .or_insert_with(|| Value::Tree(Partial::new()));
            if !slot.is_tree() {
                *slot = Value::Tree(Partial::new());
            }
            node = match slot {
                Value::Tree(tree) => tree,
                _ => unreachable!("slot was just made a tree"),
            };
        }
        node.entries.insert((*last).to_string(), value);
        Ok(())
    }
}

impl Lookup for Partial {
    fn lookup(&self, path: &str) -> Option<Value> {
        self.value_at(path, DEFAULT_SEPARATOR)
    }

    fn has(&self, path: &str) -> bool {
        self.has_path(path, DEFAULT_SEPARATOR)
    }
}

impl FromIterator<(String, Value)> for Partial {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Partial {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
