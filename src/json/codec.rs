//! Purpose: Turn bytes into a `Node` tree and any serializable value back into JSON text.
//! Exports: `decode`, `marshal`, `encode`, `indent_encode`, `convert`.
//! Role: Collaborator boundary used by `Value`, `Object`, file and http helpers.
//! Invariants: Empty input decodes to `Node::Null` without error.
//! Invariants: Indented output uses two spaces; object keys come out sorted.
//! Notes: Error mapping to domain context (paths, urls) is done by callsites.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::error::Error;
use crate::core::node::Node;

pub fn decode(data: &[u8]) -> Result<Node, Error> {
    if data.is_empty() {
        return Ok(Node::Null);
    }
    serde_json::from_slice(data.trim_ascii()).map_err(Error::decode)
}

pub fn marshal<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(value).map_err(Error::encode)
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value).map_err(Error::encode)
}

pub fn indent_encode<T: Serialize + ?Sized>(value: &T) -> Result<String, Error> {
    serde_json::to_string_pretty(value).map_err(Error::encode)
}

/// Re-decodes `node` as a concrete type.
pub fn convert<T: DeserializeOwned>(node: &Node) -> Result<T, Error> {
    let value = serde_json::to_value(node).map_err(Error::encode)?;
    serde_json::from_value(value).map_err(Error::decode)
}
