//! Purpose: Keyed view over a decoded JSON object with absent/empty distinction.
//! Exports: `Object`.
//! Role: Typed getters over keys; consuming mutation that promotes absent to present.
//! Invariants: `Object::null()` (absent) and `Object::new()` (present, empty) differ
//!             in `is_null`, `string` ("null" vs "{}") and serialization.
//! Invariants: Keys enumerate in sorted order; `BTreeMap` keeps them sorted.
//! Invariants: Missing keys read as an absent `Value`, never an error.
#![allow(clippy::result_large_err)]

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Array, Value};
use crate::core::error::{Error, ErrorKind};
use crate::core::node::Node;
use crate::json::codec;

/// Key whose string value replaces the JSON rendering in `Object::string`.
const STRING_OVERRIDE_KEY: &str = "_string";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object {
    map: Option<BTreeMap<String, Value>>,
}

impl Object {
    pub fn new() -> Self {
        Self {
            map: Some(BTreeMap::new()),
        }
    }

    pub fn null() -> Self {
        Self { map: None }
    }

    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Self { map: Some(map) }
    }

    /// Null builds the absent object; any shape other than an object is a
    /// `Construct` error.
    pub fn from_node(node: impl Into<Node>) -> Result<Self, Error> {
        match node.into() {
            Node::Null => Ok(Self::null()),
            Node::Object(map) => Ok(Self::from_map(map)),
            other => Err(Error::new(ErrorKind::Construct).with_message(format!(
                "cannot build an object from {}",
                other.kind_name()
            ))),
        }
    }

    /// Builds from any serializable value; non-string map keys are stringified.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        let json = serde_json::to_value(value).map_err(Error::encode)?;
        Self::from_node(Node::from(json))
    }

    /// Empty input and `null` both yield the absent object. Well-formed JSON
    /// of any other shape is a `Construct` error, like `from_node`.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        Self::from_node(codec::decode(data)?)
    }

    pub fn read_from(mut reader: impl Read) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read json object")
                .with_source(err)
        })?;
        Self::parse(&data)
    }

    pub fn from_url_values<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map: BTreeMap<String, Value> = BTreeMap::new();
        for (key, value) in pairs {
            let value: String = value.into();
            map.entry(key.into()).or_insert_with(|| Value::new(value));
        }
        Self::from_map(map)
    }

    pub fn len(&self) -> usize {
        self.map.as_ref().map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self) -> bool {
        self.map.is_none()
    }

    pub fn has(&self, key: &str) -> bool {
        self.map.as_ref().is_some_and(|map| map.contains_key(key))
    }

    pub fn keys(&self) -> Vec<String> {
        self.map
            .as_ref()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.map.iter().flatten()
    }

    pub fn get(&self, key: &str) -> Value {
        self.lookup(key).cloned().unwrap_or_default()
    }

    pub(crate) fn lookup(&self, key: &str) -> Option<&Value> {
        self.map.as_ref().and_then(|map| map.get(key))
    }

    pub fn get_bool(&self, key: &str) -> bool {
        self.lookup(key).is_some_and(Value::bool)
    }

    pub fn get_str(&self, key: &str) -> String {
        self.lookup(key).map(Value::string).unwrap_or_default()
    }

    pub fn get_num(&self, key: &str) -> f64 {
        self.lookup(key).map_or(0.0, Value::float64)
    }

    pub fn get_int(&self, key: &str) -> isize {
        self.lookup(key).map_or(0, Value::int)
    }

    pub fn get_int64(&self, key: &str) -> i64 {
        self.lookup(key).map_or(0, Value::int64)
    }

    pub fn get_uint64(&self, key: &str) -> u64 {
        self.lookup(key).map_or(0, Value::uint64)
    }

    pub fn get_time(&self, key: &str) -> OffsetDateTime {
        self.get(key).time()
    }

    pub fn get_obj(&self, key: &str) -> Object {
        self.lookup(key).map(Value::object).unwrap_or_default()
    }

    pub fn get_arr(&self, key: &str) -> Array {
        self.lookup(key).map(Value::array).unwrap_or_default()
    }

    /// First of `keys` holding a non-null value.
    pub fn get_no_nil(&self, keys: &[&str]) -> Value {
        keys.iter()
            .filter_map(|key| self.lookup(key))
            .find(|value| !value.is_null())
            .cloned()
            .unwrap_or_default()
    }

    pub fn set(self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        let mut map = self.map.unwrap_or_default();
        map.insert(key.into(), Value::new(value));
        Self::from_map(map)
    }

    pub fn delete(self, key: &str) -> Self {
        let mut map = self.map.unwrap_or_default();
        map.remove(key);
        Self::from_map(map)
    }

    /// Copies every entry of `others` into `self`; later objects win and absent
    /// ones are skipped.
    pub fn extend<I>(self, others: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<Object>,
    {
        let mut map = self.map.unwrap_or_default();
        for other in others {
            let other: &Object = other.borrow();
            for (key, value) in other.iter() {
                map.insert(key.clone(), value.clone());
            }
        }
        Self::from_map(map)
    }

    pub fn into_map(self) -> Option<BTreeMap<String, Value>> {
        self.map
    }

    /// JSON text, `"null"` when absent, or the `_string` field when present.
    pub fn string(&self) -> String {
        if self.has(STRING_OVERRIDE_KEY) {
            return self.get_str(STRING_OVERRIDE_KEY);
        }
        codec::encode(self).unwrap_or_default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        codec::marshal(self).unwrap_or_default()
    }

    pub fn indent_string(&self) -> String {
        codec::indent_encode(self).unwrap_or_default()
    }

    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        codec::convert(&Node::from(self.clone()))
    }

    /// Form-style pairs in key order; null values are left out.
    pub fn url_values(&self) -> Vec<(String, String)> {
        self.iter()
            .filter(|(_, value)| !value.is_null())
            .map(|(key, value)| (key.clone(), value.string()))
            .collect()
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

impl From<Object> for Node {
    fn from(object: Object) -> Self {
        object.map.map_or(Node::Null, Node::Object)
    }
}

impl TryFrom<Node> for Object {
    type Error = Error;

    fn try_from(node: Node) -> Result<Self, Self::Error> {
        Object::from_node(node)
    }
}
