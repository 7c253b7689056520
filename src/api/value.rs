//! Purpose: Owned handle over one untyped node with lazily coerced typed getters.
//! Exports: `Value` plus free helpers (`to_str`, `to_num`, `to_int`, `or`, `and`, ...).
//! Role: Unit every accessor returns; `Object`/`Array` elements are `Value`s.
//! Invariants: Getters never fail; they coerce on every call and cache nothing.
//! Invariants: An absent value is `Node::Null`: empty string, zero numbers, false.
#![allow(clippy::result_large_err)]

use std::cmp::Ordering;
use std::fmt;
use std::io::Read;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{Array, Object};
use crate::core::error::{Error, ErrorKind};
use crate::core::node::Node;
use crate::core::{coerce, compare as ordering, empty};
use crate::json::codec;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Value {
    node: Node,
}

impl Value {
    /// Wraps anything convertible to a node; wrapping a `Value` is a no-op.
    pub fn new(value: impl Into<Node>) -> Self {
        Self { node: value.into() }
    }

    pub fn null() -> Self {
        Self::default()
    }

    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        codec::decode(data).map(Self::new)
    }

    pub fn read_from(mut reader: impl Read) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read json input")
                .with_source(err)
        })?;
        Self::parse(&data)
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn into_node(self) -> Node {
        self.node
    }

    pub fn bytes(&self) -> Vec<u8> {
        codec::marshal(&self.node).unwrap_or_default()
    }

    pub fn json(&self) -> String {
        codec::encode(&self.node).unwrap_or_default()
    }

    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        codec::convert(&self.node)
    }

    pub fn empty(&self) -> bool {
        empty::is_empty(&self.node)
    }

    pub fn equal(&self, other: impl Into<Node>) -> bool {
        ordering::equal(&self.node, &other.into())
    }

    pub fn compare(&self, other: impl Into<Node>) -> Ordering {
        ordering::compare(&self.node, &other.into())
    }

    pub fn is_null(&self) -> bool {
        self.node.is_null()
    }

    pub fn is_num(&self) -> bool {
        self.node.is_num()
    }

    pub fn is_array(&self) -> bool {
        matches!(self.node, Node::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self.node, Node::Object(_))
    }

    /// The array view, or an absent array for any other shape.
    pub fn array(&self) -> Array {
        match &self.node {
            Node::Array(items) => Array::from_values(items.clone()),
            _ => Array::null(),
        }
    }

    /// The object view, or an absent object for any other shape.
    pub fn object(&self) -> Object {
        match &self.node {
            Node::Object(map) => Object::from_map(map.clone()),
            _ => Object::null(),
        }
    }

    /// Like `array`, but moves the items out instead of copying them.
    pub fn into_array(self) -> Array {
        match self.node {
            Node::Array(items) => Array::from_values(items),
            _ => Array::null(),
        }
    }

    /// Like `object`, but moves the map out instead of copying it.
    pub fn into_object(self) -> Object {
        match self.node {
            Node::Object(map) => Object::from_map(map),
            _ => Object::null(),
        }
    }

    pub fn objects(&self) -> Vec<Object> {
        self.array().objects()
    }

    pub fn bool(&self) -> bool {
        coerce::boolean(&self.node)
    }

    pub fn string(&self) -> String {
        coerce::text(&self.node).into_owned()
    }

    pub fn int(&self) -> isize {
        self.int64() as isize
    }

    pub fn int64(&self) -> i64 {
        coerce::int64(&self.node)
    }

    pub fn uint64(&self) -> u64 {
        coerce::uint64(&self.node)
    }

    pub fn float64(&self) -> f64 {
        coerce::float64(&self.node)
    }

    pub fn num(&self) -> f64 {
        self.float64()
    }

    pub fn time(&self) -> OffsetDateTime {
        coerce::timestamp(&self.node)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&coerce::text(&self.node))
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self { node }
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        value.node
    }
}

impl From<&Value> for Node {
    fn from(value: &Value) -> Self {
        value.node.clone()
    }
}

pub fn to_str(value: impl Into<Node>) -> String {
    coerce::text(&value.into()).into_owned()
}

pub fn to_num(value: impl Into<Node>) -> f64 {
    coerce::float64(&value.into())
}

pub fn to_int(value: impl Into<Node>) -> isize {
    coerce::int64(&value.into()) as isize
}

pub fn to_uint64(value: impl Into<Node>) -> u64 {
    coerce::uint64(&value.into())
}

pub fn is_empty(value: impl Into<Node>) -> bool {
    empty::is_empty(&value.into())
}

pub fn is_num(value: impl Into<Node>) -> bool {
    value.into().is_num()
}

pub fn is_int(value: impl Into<Node>) -> bool {
    value.into().is_int()
}

/// First non-empty input, or an absent value.
pub fn or<I>(values: I) -> Value
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    Value::new(empty::or(values.into_iter().map(Into::into)))
}

pub fn and<I>(values: I) -> bool
where
    I: IntoIterator,
    I::Item: Into<Node>,
{
    empty::and(values.into_iter().map(Into::into))
}

pub fn compare(a: impl Into<Node>, b: impl Into<Node>) -> Ordering {
    ordering::compare(&a.into(), &b.into())
}

#[cfg(test)]
mod tests {
    use super::{Value, and, compare, is_empty, or, to_int, to_str};
    use crate::core::error::ErrorKind;
    use crate::core::node::Node;
    use crate::core::timeparse::ZERO_TIME;
    use std::cmp::Ordering;

    #[test]
    fn owned_views_match_borrowed_views() {
        let doc = Value::parse(br#"{"a":{"b":[1,2]},"n":3}"#).expect("parse");
        assert_eq!(doc.clone().into_object(), doc.object());
        let inner = doc.into_object().get("a").into_object().get("b");
        assert_eq!(inner.clone().into_array().len(), 2);
        assert_eq!(inner.clone().into_array(), inner.array());
        assert!(inner.into_object().is_null());
        assert!(Value::new(3).into_array().is_null());
    }

    #[test]
    fn absent_value_reads_as_zero() {
        let v = Value::null();
        assert!(v.is_null());
        assert_eq!(v.string(), "");
        assert_eq!(v.to_string(), "");
        assert_eq!(v.int64(), 0);
        assert_eq!(v.uint64(), 0);
        assert_eq!(v.float64(), 0.0);
        assert!(!v.bool());
        assert_eq!(v.time(), ZERO_TIME);
        assert!(v.array().is_null());
        assert!(v.object().is_null());
        assert_eq!(v.json(), "null");
    }

    #[test]
    fn wrapping_a_value_does_not_nest() {
        let inner = Value::new("x");
        let outer = Value::new(inner.clone());
        assert_eq!(outer, inner);
    }

    #[test]
    fn parse_and_navigate() {
        let v = Value::parse(br#"{"a":[1,"2",3.5],"b":{"c":true}}"#).expect("parse");
        assert!(v.is_object());
        assert!(!v.is_array());
        assert_eq!(v.object().get_arr("a").ints(), vec![1, 2, 3]);
        assert!(v.object().get_obj("b").get_bool("c"));
    }

    #[test]
    fn parse_empty_is_absent() {
        assert!(Value::parse(b"").expect("empty").is_null());
        let err = Value::parse(b"{").expect_err("bad");
        assert_eq!(err.kind(), ErrorKind::Decode);
    }

    #[test]
    fn read_from_drains_reader() {
        let v = Value::read_from(std::io::Cursor::new(b"[1,2]".to_vec())).expect("read");
        assert_eq!(v.array().len(), 2);
    }

    #[test]
    fn equal_uses_ordering_rules() {
        assert!(Value::new(3).equal(3.0));
        assert!(Value::new(1).equal("1"));
        assert_eq!(Value::new("10").compare(9), Ordering::Less);
        assert_eq!(compare(10, 9), Ordering::Greater);
    }

    #[test]
    fn empty_checks_shape() {
        assert!(Value::new(0).empty());
        assert!(!Value::new("0").empty());
        assert!(is_empty(Node::Null));
        assert!(!is_empty(" "));
    }

    #[test]
    fn or_and_accept_mixed_inputs() {
        let none = or([Node::from(0), Node::from(false), Node::Null, Node::from("")]);
        assert!(none.is_null());
        let picked = or([
            Node::from(0),
            Node::from(false),
            Node::from(""),
            Node::from(666),
            Node::from("abc"),
        ]);
        assert_eq!(picked, Value::new(666));
        assert!(and(["a", "b"]));
        assert!(!and([1, 0]));
    }

    #[test]
    fn free_helpers_coerce() {
        assert_eq!(to_str(Node::Null), "");
        assert_eq!(to_str(2.5), "2.5");
        assert_eq!(to_int("0x10"), 16);
    }

    #[test]
    fn deserialize_into_concrete_type() {
        let v = Value::parse(br#"[1,2,3]"#).expect("parse");
        let nums: Vec<u8> = v.deserialize_into().expect("vec");
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[test]
    fn display_matches_string_coercion() {
        assert_eq!(Value::new(1.25).to_string(), "1.25");
        assert_eq!(Value::parse(b"[1]").expect("parse").to_string(), "[1]");
    }
}
