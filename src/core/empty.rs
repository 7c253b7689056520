//! Purpose: Generalized falsy predicate over every node shape.
//! Exports: `is_empty`, `or`, `and`.
//! Role: Backs `Value::empty` and the `or`/`and` combinators.
//! Invariants: Only the node's own shape matters; `"0"` is a non-empty string.

use super::node::Node;

pub fn is_empty(node: &Node) -> bool {
    match node {
        Node::Null => true,
        Node::Bool(v) => !v,
        Node::String(s) => s.is_empty(),
        Node::Int(v) => *v == 0,
        Node::Uint(v) => *v == 0,
        Node::Float(v) => *v == 0.0,
        Node::Bytes(b) => b.is_empty(),
        Node::Array(items) => items.is_empty(),
        Node::Object(map) => map.is_empty(),
        Node::Text(_) | Node::Error(_) => false,
    }
}

/// First non-empty node, or `Null` when every input is empty.
pub fn or<I>(nodes: I) -> Node
where
    I: IntoIterator<Item = Node>,
{
    nodes
        .into_iter()
        .find(|node| !is_empty(node))
        .unwrap_or_default()
}

pub fn and<I>(nodes: I) -> bool
where
    I: IntoIterator<Item = Node>,
{
    nodes.into_iter().all(|node| !is_empty(&node))
}

#[cfg(test)]
mod tests {
    use super::{and, is_empty, or};
    use crate::core::node::Node;
    use std::collections::BTreeMap;

    #[test]
    fn zero_number_is_empty_but_zero_string_is_not() {
        assert!(is_empty(&Node::from(0)));
        assert!(is_empty(&Node::from(0.0)));
        assert!(!is_empty(&Node::from("0")));
        assert!(!is_empty(&Node::from(-0.123)));
    }

    #[test]
    fn containers_are_empty_by_length() {
        assert!(is_empty(&Node::from(Vec::<Node>::new())));
        assert!(is_empty(&Node::from(BTreeMap::<String, Node>::new())));
        assert!(!is_empty(&Node::from(vec![Node::Null])));
        assert!(is_empty(&Node::Bytes(Vec::new())));
    }

    #[test]
    fn custom_nodes_are_never_empty() {
        assert!(!is_empty(&Node::text("")));
    }

    #[test]
    fn or_returns_first_non_empty() {
        let all_empty = or([Node::from(0), Node::from(false), Node::Null, Node::from("")]);
        assert_eq!(all_empty, Node::Null);

        let picked = or([
            Node::from(0),
            Node::from(false),
            Node::from(""),
            Node::from(666),
            Node::from("abc"),
        ]);
        assert_eq!(picked, Node::from(666));
    }

    #[test]
    fn and_requires_every_value_non_empty() {
        assert!(!and([
            Node::from(0),
            Node::from(false),
            Node::from(""),
            Node::from(666),
            Node::from("abc"),
        ]));
        assert!(and([
            Node::from(666),
            Node::from(-0.123),
            Node::from(true),
            Node::from("abc"),
        ]));
        assert!(and(Vec::<Node>::new()));
    }
}
