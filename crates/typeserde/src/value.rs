// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native value types.

use crate::descriptor::EnumValue;
use chrono::NaiveDateTime;
use indexmap::map::Entry;
use indexmap::IndexMap;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Wire value: the JSON-compatible form crossing the serialization boundary.
pub type Wire = serde_json::Value;

/// A native value produced by decoders and consumed by encoders.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    // Atoms
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),

    // Leaves with a textual wire form
    Bytes(Vec<u8>),
    Uuid(Uuid),
    DateTime(NaiveDateTime),

    // Composites
    List(Vec<Value>),
    Tuple(Vec<Value>),
    Dict(Dict),
    Enum { member: String, value: EnumValue },
    Record(Record),
    Call(CallArgs),
}

impl Value {
    /// Check if value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Bytes(_) => "bytes",
            Self::Uuid(_) => "UUID",
            Self::DateTime(_) => "datetime",
            Self::List(_) => "list",
            Self::Tuple(_) => "tuple",
            Self::Dict(_) => "dict",
            Self::Enum { .. } => "enum",
            Self::Record(_) => "record",
            Self::Call(_) => "call arguments",
        }
    }

    /// Build a dict from key/value pairs; a repeated key overwrites.
    pub fn dict<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<Value>,
        V: Into<Value>,
    {
        Self::Dict(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Try to get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as byte blob.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as list or tuple items.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::List(v) | Self::Tuple(v) => Some(v),
            _ => None,
        }
    }

    /// Look up a dict entry by key.
    pub fn dict_get(&self, key: &Value) -> Option<&Value> {
        match self {
            Self::Dict(dict) => dict.get(key),
            _ => None,
        }
    }

    /// Try to get record field.
    pub fn get_field(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Record(r) => r.get(name),
            _ => None,
        }
    }

    /// Get enum member name.
    pub fn enum_member(&self) -> Option<&str> {
        match self {
            Self::Enum { member, .. } => Some(member),
            _ => None,
        }
    }
}

/// Native mapping.
///
/// Entries keep insertion order, which is the order they are encoded in.
/// Equality ignores order. Lookups hash a projection of the key, so a float
/// key matches by bit pattern (with `-0.0` folded into `0.0`).
#[derive(Debug, Clone, Default)]
pub struct Dict {
    entries: IndexMap<KeyRepr, (Value, Value)>,
}

impl Dict {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    /// Insert an entry. A key already present keeps its position and gets
    /// the new value; the old value is returned.
    pub fn insert(&mut self, key: Value, value: Value) -> Option<Value> {
        match self.entries.entry(KeyRepr::of(&key)) {
            Entry::Occupied(mut slot) => Some(std::mem::replace(&mut slot.get_mut().1, value)),
            Entry::Vacant(slot) => {
                slot.insert((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(&KeyRepr::of(key)).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.values().map(|(k, v)| (k, v))
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(repr, (_, v))| other.entries.get(repr).is_some_and(|(_, w)| v == w))
    }
}

impl FromIterator<(Value, Value)> for Dict {
    fn from_iter<I: IntoIterator<Item = (Value, Value)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

/// Hashable projection of a [`Value`] used as a dict key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum KeyRepr {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Str(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    DateTime(NaiveDateTime),
    List(Vec<KeyRepr>),
    Tuple(Vec<KeyRepr>),
    Dict(Vec<(KeyRepr, KeyRepr)>),
    Enum(String, Box<KeyRepr>),
    Record(String, Vec<(String, KeyRepr)>),
    Call(Vec<KeyRepr>, Vec<(String, KeyRepr)>),
}

impl KeyRepr {
    fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Int(i) => Self::Int(*i),
            Value::Float(f) if *f == 0.0 => Self::Float(0.0f64.to_bits()),
            Value::Float(f) => Self::Float(f.to_bits()),
            Value::Str(s) => Self::Str(s.clone()),
            Value::Bytes(b) => Self::Bytes(b.clone()),
            Value::Uuid(u) => Self::Uuid(*u),
            Value::DateTime(t) => Self::DateTime(*t),
            Value::List(items) => Self::List(items.iter().map(Self::of).collect()),
            Value::Tuple(items) => Self::Tuple(items.iter().map(Self::of).collect()),
            Value::Dict(dict) => {
                let mut entries: Vec<_> = dict
                    .entries
                    .iter()
                    .map(|(repr, (_, v))| (repr.clone(), Self::of(v)))
                    .collect();
                entries.sort();
                Self::Dict(entries)
            }
            Value::Enum { member, value } => Self::Enum(
                member.clone(),
                Box::new(match value {
                    EnumValue::Int(i) => Self::Int(*i),
                    EnumValue::Str(s) => Self::Str(s.clone()),
                }),
            ),
            Value::Record(r) => Self::Record(
                r.name.clone(),
                r.fields.iter().map(|(n, v)| (n.clone(), Self::of(v))).collect(),
            ),
            Value::Call(c) => Self::Call(
                c.args.iter().map(Self::of).collect(),
                c.kwargs.iter().map(|(n, v)| (n.clone(), Self::of(v))).collect(),
            ),
        }
    }
}

/// Native record: kind name plus fields in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record of the given kind.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Get field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

/// Native call arguments: positional values plus keyword values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallArgs {
    pub args: Vec<Value>,
    pub kwargs: BTreeMap<String, Value>,
}

impl CallArgs {
    pub fn new(args: Vec<Value>) -> Self {
        Self {
            args,
            kwargs: BTreeMap::new(),
        }
    }

    /// Add a keyword argument.
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<Uuid> for Value {
    fn from(v: Uuid) -> Self {
        Self::Uuid(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::DateTime(v)
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Self::Record(v)
    }
}

impl From<CallArgs> for Value {
    fn from(v: CallArgs) -> Self {
        Self::Call(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dict_overwrites_repeated_key() {
        let d = Value::dict([("a", 1), ("b", 2), ("a", 3)]);
        let Value::Dict(dict) = &d else {
            panic!("expected dict");
        };
        assert_eq!(dict.len(), 2);
        assert_eq!(d.dict_get(&Value::from("a")), Some(&Value::Int(3)));
        let keys: Vec<_> = dict.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, [Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_dict_equality_ignores_order() {
        let xy = Value::dict([("x", 1), ("y", 2)]);
        let yx = Value::dict([("y", 2), ("x", 1)]);
        assert_eq!(xy, yx);
        assert_ne!(xy, Value::dict([("x", 1), ("y", 3)]));
        assert_ne!(xy, Value::dict([("x", 1)]));
    }

    #[test]
    fn test_dict_key_projection() {
        let mut dict = Dict::new();
        dict.insert(Value::Float(-0.0), Value::from("zero"));
        assert_eq!(dict.get(&Value::Float(0.0)), Some(&Value::from("zero")));
        assert_eq!(dict.get(&Value::Int(0)), None);

        let nested = Value::dict([("b", 2), ("a", 1)]);
        dict.insert(nested, Value::Bool(true));
        assert_eq!(
            dict.get(&Value::dict([("a", 1), ("b", 2)])),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_large_dict_builds_by_hash() {
        let dict: Dict = (0..50_000)
            .map(|i| (Value::Str(format!("k{}", i)), Value::Int(i)))
            .collect();
        assert_eq!(dict.len(), 50_000);
        assert_eq!(dict.get(&Value::from("k49999")), Some(&Value::Int(49_999)));
    }

    #[test]
    fn test_record_access() {
        let r = Value::from(Record::new("Point").with("x", 1).with("y", None::<i64>));
        assert_eq!(r.get_field("x").and_then(Value::as_int), Some(1));
        assert_eq!(r.get_field("y"), Some(&Value::Null));
        assert_eq!(r.get_field("z"), None);
        assert_eq!(r.type_name(), "record");
    }
}
