//! Parameter keys, candidates and specifications.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::errors::{CombuError, ErrorInfo};
use crate::record::Record;

const UNSET_TAG: &str = "$unset";

/// Groups several argument names whose joint candidates are nested
/// [`ParamSpec`]s.
///
/// Every combination of every nested specification becomes one candidate of
/// the pack, with the nested key order fixed to the pack's name order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pack {
    #[serde(rename = "pack")]
    names: Vec<String>,
}

impl Pack {
    /// Creates a pack over the given argument names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the declared argument names in order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the declared names as plain keys, suitable as a nested order.
    pub fn keys(&self) -> Vec<Key> {
        self.names.iter().cloned().map(Key::Name).collect()
    }
}

/// Identifies one dimension of a [`ParamSpec`].
///
/// Serialized as a string (plain name), a list of strings (tuple) or a
/// `{pack: [...]}` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// A single argument name.
    Name(String),
    /// Several names whose candidates are tuples unpacked positionally.
    Tuple(Vec<String>),
    /// Several names whose candidates are nested specifications.
    Pack(Pack),
}

impl Key {
    /// Creates a tuple key over the given names.
    pub fn tuple<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Key::Tuple(names.into_iter().map(Into::into).collect())
    }

    /// Returns the argument names this key contributes to a record.
    pub fn names(&self) -> &[String] {
        match self {
            Key::Name(name) => std::slice::from_ref(name),
            Key::Tuple(names) => names,
            Key::Pack(pack) => pack.names(),
        }
    }

    /// Short label naming the key variant, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Key::Name(_) => "name",
            Key::Tuple(_) => "tuple",
            Key::Pack(_) => "pack",
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Name(name) => write!(f, "{name}"),
            Key::Tuple(names) => write!(f, "({})", names.join(", ")),
            Key::Pack(pack) => write!(f, "Pack({})", pack.names().join(", ")),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl From<Pack> for Key {
    fn from(pack: Pack) -> Self {
        Key::Pack(pack)
    }
}

/// A single argument value, or the omission marker.
///
/// When the value selected for a name is [`Arg::Unset`] the name is left out
/// of the record entirely, as if the argument had not been passed.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    /// A concrete value passed under its name.
    Value(Value),
    /// Omits the name from the record.
    Unset,
}

impl Arg {
    /// Returns true for the omission marker.
    pub fn is_unset(&self) -> bool {
        matches!(self, Arg::Unset)
    }

    /// Returns the carried value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Unset => None,
        }
    }

    fn from_wire(value: Value) -> Self {
        match &value {
            Value::Object(map)
                if map.len() == 1 && map.get(UNSET_TAG) == Some(&Value::Bool(true)) =>
            {
                Arg::Unset
            }
            _ => Arg::Value(value),
        }
    }

    fn to_wire(&self) -> Value {
        match self {
            Arg::Value(value) => value.clone(),
            Arg::Unset => {
                let mut marker = Map::new();
                marker.insert(UNSET_TAG.to_string(), Value::Bool(true));
                Value::Object(marker)
            }
        }
    }
}

impl Serialize for Arg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_wire().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Arg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Arg::from_wire)
    }
}

/// One entry of a key's candidate list.
#[derive(Debug, Clone, PartialEq)]
pub enum Candidate {
    /// Candidate for a plain key.
    Arg(Arg),
    /// Candidate for a tuple key, lined up with the key's names.
    Tuple(Vec<Arg>),
    /// Candidate for a pack key.
    Nested(ParamSpec),
}

impl Candidate {
    /// Builds a tuple candidate from positional values.
    pub fn tuple<I, A>(values: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Candidate::Tuple(values.into_iter().map(Into::into).collect())
    }

    /// Short label naming the candidate shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Candidate::Arg(_) => "value",
            Candidate::Tuple(_) => "tuple",
            Candidate::Nested(_) => "nested",
        }
    }
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Candidate::Arg(arg) => arg.serialize(serializer),
            Candidate::Tuple(args) => args.serialize(serializer),
            Candidate::Nested(spec) => spec.serialize(serializer),
        }
    }
}

impl From<Arg> for Candidate {
    fn from(arg: Arg) -> Self {
        Candidate::Arg(arg)
    }
}

impl From<ParamSpec> for Candidate {
    fn from(spec: ParamSpec) -> Self {
        Candidate::Nested(spec)
    }
}

impl From<Record> for Arg {
    fn from(record: Record) -> Self {
        Arg::Value(record.into_value())
    }
}

impl From<Record> for Candidate {
    fn from(record: Record) -> Self {
        Candidate::Arg(record.into())
    }
}

macro_rules! impl_value_conversions {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Arg {
                fn from(value: $ty) -> Self {
                    Arg::Value(Value::from(value))
                }
            }

            impl From<$ty> for Candidate {
                fn from(value: $ty) -> Self {
                    Candidate::Arg(Arg::from(value))
                }
            }
        )*
    };
}

impl_value_conversions!(Value, String, &str, bool, i32, i64, u32, u64, usize, f64);

/// Ordered mapping from [`Key`] to its candidate list.
///
/// Declaration order is preserved and defines the default traversal order.
/// Re-declaring a key replaces its candidates but keeps its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSpec {
    entries: IndexMap<Key, Vec<Candidate>>,
}

impl ParamSpec {
    /// Creates an empty specification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a key with its candidates, returning the replaced candidates.
    pub fn insert(&mut self, key: impl Into<Key>, candidates: Vec<Candidate>) -> Option<Vec<Candidate>> {
        self.entries.insert(key.into(), candidates)
    }

    /// Declares a key with explicit candidates.
    pub fn with_candidates(mut self, key: impl Into<Key>, candidates: Vec<Candidate>) -> Self {
        self.insert(key, candidates);
        self
    }

    /// Declares a plain key.
    pub fn with<I, A>(self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let candidates = values
            .into_iter()
            .map(|value| Candidate::Arg(value.into()))
            .collect();
        self.with_candidates(Key::Name(name.into()), candidates)
    }

    /// Declares a tuple key whose rows are unpacked positionally.
    pub fn with_tuple<N, S, I, R, A>(self, names: N, rows: I) -> Self
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        let candidates = rows.into_iter().map(Candidate::tuple).collect();
        self.with_candidates(Key::tuple(names), candidates)
    }

    /// Declares a pack key whose candidates are nested specifications.
    pub fn with_pack<I>(self, pack: Pack, specs: I) -> Self
    where
        I: IntoIterator<Item = ParamSpec>,
    {
        let candidates = specs.into_iter().map(Candidate::Nested).collect();
        self.with_candidates(Key::Pack(pack), candidates)
    }

    /// Returns the candidates declared for `key`.
    pub fn get(&self, key: &Key) -> Option<&[Candidate]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Returns the candidates declared for `key` or a key error.
    pub fn require(&self, key: &Key) -> Result<&[Candidate], CombuError> {
        self.get(key).ok_or_else(|| {
            CombuError::Key(
                ErrorInfo::new("unknown-key", format!("key `{key}` is not declared"))
                    .with_context("key", key.to_string())
                    .with_context("declared", self.entries.len().to_string()),
            )
        })
    }

    /// Returns a mutable handle on the candidates declared for `key`.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut Vec<Candidate>> {
        self.entries.get_mut(key)
    }

    /// Returns true when `key` is declared.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Key> + '_ {
        self.entries.keys()
    }

    /// Iterates over `(key, candidates)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &[Candidate])> + '_ {
        self.entries.iter().map(|(key, values)| (key, values.as_slice()))
    }

    /// Iterates over every candidate list mutably, in declaration order.
    pub fn candidates_mut(&mut self) -> impl Iterator<Item = &mut Vec<Candidate>> + '_ {
        self.entries.values_mut()
    }

    /// Number of declared keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no key is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn from_wire(entries: Vec<EntryWire>) -> Result<Self, CombuError> {
        let mut spec = ParamSpec::new();
        for entry in entries {
            let candidates = entry
                .values
                .into_iter()
                .map(|value| candidate_from_wire(&entry.key, value))
                .collect::<Result<Vec<_>, _>>()?;
            spec.insert(entry.key, candidates);
        }
        Ok(spec)
    }
}

impl FromIterator<(Key, Vec<Candidate>)> for ParamSpec {
    fn from_iter<T: IntoIterator<Item = (Key, Vec<Candidate>)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[derive(Serialize)]
struct EntryRef<'a> {
    key: &'a Key,
    values: &'a [Candidate],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EntryWire {
    key: Key,
    #[serde(default)]
    values: Vec<Value>,
}

fn candidate_from_wire(key: &Key, value: Value) -> Result<Candidate, CombuError> {
    match key {
        Key::Name(_) => Ok(Candidate::Arg(Arg::from_wire(value))),
        Key::Tuple(_) => match value {
            Value::Array(items) => Ok(Candidate::Tuple(
                items.into_iter().map(Arg::from_wire).collect(),
            )),
            other => Err(CombuError::Type(
                ErrorInfo::new("tuple-candidate-shape", "tuple key candidates must be lists")
                    .with_context("key", key.to_string())
                    .with_context("found", other.to_string()),
            )),
        },
        Key::Pack(_) => serde_json::from_value::<ParamSpec>(value)
            .map(Candidate::Nested)
            .map_err(|err| {
                CombuError::Type(
                    ErrorInfo::new("pack-candidate-shape", err.to_string())
                        .with_context("key", key.to_string())
                        .with_hint("pack candidates are nested lists of {key, values} entries"),
                )
            }),
    }
}

impl Serialize for ParamSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.entries
                .iter()
                .map(|(key, values)| EntryRef { key, values }),
        )
    }
}

impl<'de> Deserialize<'de> for ParamSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<EntryWire>::deserialize(deserializer)?;
        ParamSpec::from_wire(entries).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unset_marker_survives_wire_format() {
        let wire = serde_json::to_value(Arg::Unset).unwrap();
        assert_eq!(wire, json!({"$unset": true}));
        assert_eq!(Arg::from_wire(wire), Arg::Unset);
        assert_eq!(
            Arg::from_wire(json!({"$unset": true, "other": 1})),
            Arg::Value(json!({"$unset": true, "other": 1}))
        );
    }

    #[test]
    fn redeclaring_a_key_keeps_its_position() {
        let spec = ParamSpec::new()
            .with("v1", [1, 2])
            .with("v2", ["a"])
            .with("v1", [3]);
        let keys: Vec<_> = spec.keys().cloned().collect();
        assert_eq!(keys, vec![Key::from("v1"), Key::from("v2")]);
        assert_eq!(spec.get(&Key::from("v1")).unwrap(), &[Candidate::from(3)]);
    }

    #[test]
    fn key_display_names_variant() {
        assert_eq!(Key::from("v").to_string(), "v");
        assert_eq!(Key::tuple(["a", "b"]).to_string(), "(a, b)");
        assert_eq!(Key::from(Pack::new(["a", "b"])).to_string(), "Pack(a, b)");
    }
}
