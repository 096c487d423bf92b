//! Flat keyword records handed to target operations.

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{CombuError, ErrorInfo};
use crate::hash::stable_hash_string;

/// Final mapping from argument names to values for one combination.
///
/// Names keep the order in which their keys were traversed. Equality ignores
/// that order, matching keyword-argument semantics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name`, keeping the position of an existing entry.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    /// Returns the value bound to `name`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the value bound to `name`, or an argument error when absent.
    pub fn require(&self, name: &str) -> Result<&Value, CombuError> {
        self.get(name).ok_or_else(|| {
            CombuError::argument(
                "missing-argument",
                name,
                format!("missing required argument `{name}`"),
            )
        })
    }

    /// Fails with an argument error when the record carries a name outside `allowed`.
    pub fn expect_only(&self, allowed: &[&str]) -> Result<(), CombuError> {
        match self.keys().find(|name| !allowed.contains(&name.as_str())) {
            Some(name) => Err(CombuError::argument(
                "unexpected-argument",
                name.clone(),
                format!("got an unexpected argument `{name}`"),
            )),
            None => Ok(()),
        }
    }

    /// Deserializes the record into a typed argument struct.
    ///
    /// Targets declared with `#[serde(deny_unknown_fields)]` reject records
    /// carrying extra names; missing fields without defaults are rejected too.
    pub fn bind<T: DeserializeOwned>(&self) -> Result<T, CombuError> {
        serde_json::from_value(self.to_value()).map_err(|err| {
            CombuError::Argument(
                ErrorInfo::new("record-bind", err.to_string())
                    .with_context("type", std::any::type_name::<T>()),
            )
        })
    }

    /// Returns true when `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over argument names in traversal order.
    pub fn keys(&self) -> impl Iterator<Item = &String> + '_ {
        self.0.keys()
    }

    /// Iterates over `(name, value)` pairs in traversal order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> + '_ {
        self.0.iter()
    }

    /// Number of arguments carried.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true when no argument is carried.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Copies the record into a JSON object.
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect::<Map<_, _>>())
    }

    /// Converts the record into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect::<Map<_, _>>())
    }

    /// Stable digest of the record contents, independent of name order.
    pub fn digest(&self) -> Result<String, CombuError> {
        stable_hash_string(self)
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (S, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
