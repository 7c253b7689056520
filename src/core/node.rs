//! Purpose: Define the closed set of shapes an untyped value can take.
//! Exports: `Node`.
//! Role: Leaf data model under `Value`/`Object`/`Array`; every coercion matches on it.
//! Invariants: A node is exactly one variant; containers nest `Value`s arbitrarily.
//! Invariants: Unsigned integers that fit in `i64` are stored as `Int`, so decoded
//!             and natively constructed numbers share one representation.

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::api::Value;

#[derive(Clone, Default)]
pub enum Node {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    /// Only for values above `i64::MAX`.
    Uint(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    /// A caller type that renders itself as text.
    Text(Arc<dyn fmt::Display + Send + Sync>),
    Error(Arc<dyn StdError + Send + Sync>),
}

impl Node {
    pub fn text(value: impl fmt::Display + Send + Sync + 'static) -> Self {
        Node::Text(Arc::new(value))
    }

    pub fn error(err: impl StdError + Send + Sync + 'static) -> Self {
        Node::Error(Arc::new(err))
    }

    /// Drains `reader` into a `Bytes` node.
    pub fn from_reader(mut reader: impl Read) -> std::io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Node::Bytes(data))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Null)
    }

    pub fn is_num(&self) -> bool {
        matches!(self, Node::Int(_) | Node::Uint(_) | Node::Float(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Node::Int(_) | Node::Uint(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Null => "null",
            Node::Bool(_) => "bool",
            Node::Int(_) | Node::Uint(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Bytes(_) => "bytes",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Text(_) => "text",
            Node::Error(_) => "error",
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Null => f.write_str("Null"),
            Node::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Node::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Node::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Node::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Node::String(v) => f.debug_tuple("String").field(v).finish(),
            Node::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Node::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Node::Object(v) => f.debug_tuple("Object").field(v).finish(),
            Node::Text(v) => f.debug_tuple("Text").field(&v.to_string()).finish(),
            Node::Error(v) => f.debug_tuple("Error").field(&v.to_string()).finish(),
        }
    }
}

/// Structural equality of the stored representation: `Int(1)` and `Float(1.0)`
/// differ here even though `compare` treats them as equal.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Null, Node::Null) => true,
            (Node::Bool(a), Node::Bool(b)) => a == b,
            (Node::Int(a), Node::Int(b)) => a == b,
            (Node::Uint(a), Node::Uint(b)) => a == b,
            (Node::Float(a), Node::Float(b)) => a == b,
            (Node::String(a), Node::String(b)) => a == b,
            (Node::Bytes(a), Node::Bytes(b)) => a == b,
            (Node::Array(a), Node::Array(b)) => a == b,
            (Node::Object(a), Node::Object(b)) => a == b,
            (Node::Text(a), Node::Text(b)) => a.to_string() == b.to_string(),
            (Node::Error(a), Node::Error(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Node::Null => serializer.serialize_unit(),
            Node::Bool(v) => serializer.serialize_bool(*v),
            Node::Int(v) => serializer.serialize_i64(*v),
            Node::Uint(v) => serializer.serialize_u64(*v),
            Node::Float(v) => serializer.serialize_f64(*v),
            Node::String(v) => serializer.serialize_str(v),
            Node::Bytes(v) => serializer.serialize_str(&String::from_utf8_lossy(v)),
            Node::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Node::Object(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Node::Text(v) => serializer.collect_str(v),
            Node::Error(v) => serializer.collect_str(v),
        }
    }
}

struct NodeVisitor;

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any json value")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        Node::deserialize(deserializer)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::String(v))
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Node, E> {
        Ok(Node::Bytes(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Node, E> {
        Ok(Node::Bytes(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Node, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Node::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Node, A::Error> {
        let mut map = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, Value>()? {
            map.insert(key, value);
        }
        Ok(Node::Object(map))
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NodeVisitor)
    }
}

macro_rules! from_signed {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                Node::Int(value as i64)
            }
        }
    )*};
}

macro_rules! from_unsigned {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                let value = value as u64;
                match i64::try_from(value) {
                    Ok(value) => Node::Int(value),
                    Err(_) => Node::Uint(value),
                }
            }
        }
    )*};
}

from_signed!(i8, i16, i32, i64, isize);
from_unsigned!(u8, u16, u32, u64, usize);

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Node::Null
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Bool(value)
    }
}

impl From<f32> for Node {
    fn from(value: f32) -> Self {
        Node::Float(f64::from(value))
    }
}

impl From<f64> for Node {
    fn from(value: f64) -> Self {
        Node::Float(value)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::String(value.to_string())
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::String(value)
    }
}

impl From<&String> for Node {
    fn from(value: &String) -> Self {
        Node::String(value.clone())
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        value.map_or(Node::Null, Into::into)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(items: Vec<T>) -> Self {
        Node::Array(items.into_iter().map(|item| Value::new(item)).collect())
    }
}

impl<T: Into<Node>> From<BTreeMap<String, T>> for Node {
    fn from(map: BTreeMap<String, T>) -> Self {
        Node::Object(
            map.into_iter()
                .map(|(key, value)| (key, Value::new(value)))
                .collect(),
        )
    }
}

impl From<serde_json::Value> for Node {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Node::Null,
            serde_json::Value::Bool(v) => Node::Bool(v),
            serde_json::Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Node::Int(v)
                } else if let Some(v) = n.as_u64() {
                    Node::Uint(v)
                } else {
                    Node::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(v) => Node::String(v),
            serde_json::Value::Array(items) => Node::from(items),
            serde_json::Value::Object(map) => Node::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Value::new(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Node;
    use crate::api::Value;
    use std::collections::BTreeMap;

    #[test]
    fn unsigned_values_fold_into_int_when_they_fit() {
        assert_eq!(Node::from(7u32), Node::Int(7));
        assert_eq!(Node::from(u64::MAX), Node::Uint(u64::MAX));
    }

    #[test]
    fn decoded_numbers_match_native_construction() {
        let node: Node = serde_json::from_str("[1, -2, 2.5, 18446744073709551615]").expect("json");
        let Node::Array(items) = node else {
            panic!("expected array");
        };
        assert_eq!(items[0].node(), &Node::from(1));
        assert_eq!(items[1].node(), &Node::from(-2));
        assert_eq!(items[2].node(), &Node::from(2.5));
        assert_eq!(items[3].node(), &Node::Uint(u64::MAX));
    }

    #[test]
    fn structural_equality_distinguishes_numeric_kinds() {
        assert_ne!(Node::from(1), Node::from(1.0));
        assert_eq!(Node::text("abc"), Node::text(String::from("abc")));
    }

    #[test]
    fn serializes_native_variants_as_text() {
        let err = std::io::Error::other("disk gone");
        let mut map = BTreeMap::new();
        map.insert("bytes".to_string(), Node::Bytes(b"raw".to_vec()));
        map.insert("err".to_string(), Node::error(err));
        map.insert("nan".to_string(), Node::Float(f64::NAN));
        let json = serde_json::to_string(&Node::from(map)).expect("encode");
        assert_eq!(json, r#"{"bytes":"raw","err":"disk gone","nan":null}"#);
    }

    #[test]
    fn from_reader_drains_stream() {
        let node = Node::from_reader(std::io::Cursor::new(b"streamed".to_vec())).expect("read");
        assert_eq!(node, Node::Bytes(b"streamed".to_vec()));
    }

    #[test]
    fn from_serde_json_value_keeps_shape() {
        let node = Node::from(serde_json::json!({"a": [1, "x", null]}));
        let Node::Object(map) = node else {
            panic!("expected object");
        };
        let expected = Value::new(vec![Node::from(1), Node::from("x"), Node::Null]);
        assert_eq!(map.get("a"), Some(&expected));
    }
}
