//! Purpose: Ordered view over a decoded JSON array with absent/empty distinction.
//! Exports: `Array`.
//! Role: Index access, search, projection and in-place sorting over `Value`s.
//! Invariants: `Array::null()` (absent) and `Array::new()` (present, empty) differ.
//! Invariants: Out-of-range access yields an absent `Value`; negative indices
//!             count from the end.
//! Notes: Sorting uses a merge sort so comparators that are not total orders
//!        (the mixed numeric/text ordering is not transitive) still terminate.
#![allow(clippy::result_large_err)]

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Object, Value};
use crate::core::compare::{compare, equal};
use crate::core::error::Error;
use crate::core::node::Node;
use crate::json::codec;

static ABSENT: Node = Node::Null;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array {
    items: Option<Vec<Value>>,
}

impl Array {
    pub fn new() -> Self {
        Self {
            items: Some(Vec::new()),
        }
    }

    pub fn null() -> Self {
        Self { items: None }
    }

    pub fn from_values(items: Vec<Value>) -> Self {
        Self { items: Some(items) }
    }

    pub fn from_nodes<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Node>,
    {
        items.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_null(&self) -> bool {
        self.items.is_none()
    }

    pub fn values(&self) -> &[Value] {
        self.items.as_deref().unwrap_or_default()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.values().iter()
    }

    pub fn into_values(self) -> Option<Vec<Value>> {
        self.items
    }

    pub fn push(self, value: impl Into<Node>) -> Self {
        let mut items = self.items.unwrap_or_default();
        items.push(Value::new(value));
        Self::from_values(items)
    }

    pub fn unshift(self, value: impl Into<Node>) -> Self {
        let mut items = self.items.unwrap_or_default();
        items.insert(0, Value::new(value));
        Self::from_values(items)
    }

    /// Element at `index`; negative indices count from the end.
    #[allow(clippy::should_implement_trait)]
    pub fn eq(&self, index: isize) -> Value {
        let items = self.values();
        let resolved = if index < 0 {
            items.len().checked_sub(index.unsigned_abs())
        } else {
            Some(index.unsigned_abs())
        };
        resolved
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or_default()
    }

    pub fn first(&self) -> Value {
        self.values().first().cloned().unwrap_or_default()
    }

    pub fn last(&self) -> Value {
        self.values().last().cloned().unwrap_or_default()
    }

    pub fn for_each(&self, mut f: impl FnMut(&Value, usize)) {
        for (index, value) in self.iter().enumerate() {
            f(value, index);
        }
    }

    /// Non-object elements are passed as absent objects.
    pub fn for_each_object(&self, mut f: impl FnMut(Object, usize)) {
        for (index, value) in self.iter().enumerate() {
            f(value.object(), index);
        }
    }

    /// Position of the first element equal to `target` under `compare`.
    pub fn index_of(&self, target: impl Into<Node>) -> Option<usize> {
        let target = target.into();
        self.iter().position(|value| equal(value.node(), &target))
    }

    pub fn index_of_fn(&self, f: impl FnMut(&Value) -> bool) -> Option<usize> {
        self.iter().position(f)
    }

    /// First object element accepted by `f`, or the absent object.
    pub fn find_object(&self, mut f: impl FnMut(&Object) -> bool) -> Object {
        self.iter()
            .filter(|value| value.is_object())
            .map(Value::object)
            .find(|object| f(object))
            .unwrap_or_default()
    }

    /// First object whose `field` is structurally equal to `target`; numeric
    /// kinds are not unified here, so `1` does not match `1.0`.
    pub fn find_object_by(&self, field: &str, target: impl Into<Node>) -> Object {
        let target = target.into();
        self.iter()
            .find(|value| value.is_object() && field_of(value, field) == &target)
            .map(Value::object)
            .unwrap_or_default()
    }

    /// Always present, even when `self` is absent.
    pub fn filter(&self, mut f: impl FnMut(&Value) -> bool) -> Array {
        Self::from_values(self.iter().filter(|value| f(value)).cloned().collect())
    }

    pub fn map<N: Into<Node>>(&self, mut f: impl FnMut(&Value, usize) -> N) -> Array {
        self.iter()
            .enumerate()
            .map(|(index, value)| f(value, index))
            .collect()
    }

    pub fn join(&self, sep: &str) -> String {
        self.strings().join(sep)
    }

    pub fn objects(&self) -> Vec<Object> {
        self.iter().map(Value::object).collect()
    }

    pub fn strings(&self) -> Vec<String> {
        self.iter().map(Value::string).collect()
    }

    pub fn ints(&self) -> Vec<isize> {
        self.iter().map(Value::int).collect()
    }

    pub fn nums(&self) -> Vec<f64> {
        self.iter().map(Value::float64).collect()
    }

    /// Orders object elements by `field` under `compare`; missing fields and
    /// non-objects sort as absent.
    pub fn sort_by(&mut self, field: &str) {
        self.sort(|a, b| compare(field_of(a, field), field_of(b, field)).is_lt());
    }

    pub fn sort(&mut self, mut less: impl FnMut(&Value, &Value) -> bool) {
        if let Some(items) = self.items.as_mut() {
            let unsorted = std::mem::take(items);
            *items = merge_sort(unsorted, &mut less);
        }
    }

    pub fn sort_default(&mut self) {
        self.sort(|a, b| compare(a.node(), b.node()).is_lt());
    }

    pub fn reverse(&mut self) {
        if let Some(items) = self.items.as_mut() {
            items.reverse();
        }
    }

    /// JSON text; `"null"` when absent.
    pub fn string(&self) -> String {
        codec::encode(self).unwrap_or_default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        codec::marshal(self).unwrap_or_default()
    }

    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T, Error> {
        codec::convert(&Node::from(self.clone()))
    }
}

fn field_of<'a>(value: &'a Value, field: &str) -> &'a Node {
    match value.node() {
        Node::Object(map) => map.get(field).map_or(&ABSENT, Value::node),
        _ => &ABSENT,
    }
}

fn merge_sort<F>(mut items: Vec<Value>, less: &mut F) -> Vec<Value>
where
    F: FnMut(&Value, &Value) -> bool,
{
    if items.len() < 2 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, less);
    let right = merge_sort(right, less);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(a), Some(b)) => less(b, a),
            _ => break,
        };
        merged.extend(if take_right { right.next() } else { left.next() });
    }
    merged.extend(left);
    merged.extend(right);
    merged
}

impl<T: Into<Node>> FromIterator<T> for Array {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_values(iter.into_iter().map(Value::new).collect())
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

impl From<Array> for Node {
    fn from(array: Array) -> Self {
        array.items.map_or(Node::Null, Node::Array)
    }
}

#[cfg(test)]
mod tests {
    use super::Array;
    use crate::api::{Object, Value};
    use crate::core::node::Node;

    fn records() -> Array {
        Value::parse(br#"[{"id":3,"name":"c"},{"id":1,"name":"a"},{"id":2.0,"name":"b"},7]"#)
            .expect("parse")
            .array()
    }

    #[test]
    fn absent_and_empty_are_distinct() {
        assert!(Array::null().is_null());
        assert!(!Array::new().is_null());
        assert_eq!(Array::null().string(), "null");
        assert_eq!(Array::new().string(), "[]");
        assert_eq!(Array::null().len(), 0);
    }

    #[test]
    fn push_and_unshift_promote_absent_array() {
        let arr = Array::null().push(2).push("x").unshift(1);
        assert!(!arr.is_null());
        assert_eq!(arr.string(), r#"[1,2,"x"]"#);
    }

    #[test]
    fn index_access_supports_negative_indices() {
        let arr = Array::from_nodes([10, 20, 30]);
        assert_eq!(arr.eq(0).int(), 10);
        assert_eq!(arr.eq(-1).int(), 30);
        assert_eq!(arr.eq(-3).int(), 10);
        assert!(arr.eq(-4).is_null());
        assert!(arr.eq(3).is_null());
        assert!(Array::null().eq(0).is_null());
        assert_eq!(arr.first().int(), 10);
        assert_eq!(arr.last().int(), 30);
        assert!(Array::new().last().is_null());
    }

    #[test]
    fn index_of_uses_ordering_equality() {
        let arr = Array::from_nodes([Node::from("a"), Node::from(2), Node::from("3")]);
        assert_eq!(arr.index_of(2.0), Some(1));
        assert_eq!(arr.index_of(3), Some(2));
        assert_eq!(arr.index_of("zzz"), None);
        assert_eq!(arr.index_of_fn(|v| v.string() == "a"), Some(0));
    }

    #[test]
    fn find_object_by_uses_structural_equality() {
        let arr = records();
        assert_eq!(arr.find_object_by("id", 1).get_str("name"), "a");
        // stored as 2.0, so integer 2 does not match
        assert!(arr.find_object_by("id", 2).is_null());
        assert_eq!(arr.find_object_by("id", 2.0).get_str("name"), "b");
        assert_eq!(
            arr.find_object(|obj| obj.get_int("id") == 3).get_str("name"),
            "c"
        );
        assert!(arr.find_object(|_| false).is_null());
    }

    #[test]
    fn filter_and_map_produce_present_arrays() {
        let arr = Array::from_nodes([1, 2, 3, 4]);
        let even = arr.filter(|v| v.int() % 2 == 0);
        assert_eq!(even.ints(), vec![2, 4]);
        let doubled = arr.map(|v, i| v.int64() * 2 + i as i64);
        assert_eq!(doubled.ints(), vec![2, 5, 8, 11]);
        assert!(!Array::null().filter(|_| true).is_null());
        assert!(!Array::null().map(|v, _| v.clone()).is_null());
    }

    #[test]
    fn projections() {
        let arr = Array::from_nodes([Node::from("1.5"), Node::from(2), Node::Null]);
        assert_eq!(arr.strings(), vec!["1.5", "2", ""]);
        assert_eq!(arr.ints(), vec![1, 2, 0]);
        assert_eq!(arr.nums(), vec![1.5, 2.0, 0.0]);
        assert_eq!(arr.join("|"), "1.5|2|");
        let objects = records().objects();
        assert_eq!(objects.len(), 4);
        assert!(objects[3].is_null());
    }

    #[test]
    fn for_each_visits_in_order() {
        let arr = records();
        let mut seen = Vec::new();
        arr.for_each(|v, i| seen.push((i, v.is_object())));
        assert_eq!(seen, vec![(0, true), (1, true), (2, true), (3, false)]);

        let mut names = Vec::new();
        arr.for_each_object(|obj, _| names.push(obj.get_str("name")));
        assert_eq!(names, vec!["c", "a", "b", ""]);
    }

    #[test]
    fn sort_by_field() {
        let mut arr = records();
        arr.sort_by("id");
        let names: Vec<String> = arr.objects().iter().map(|o| o.get_str("name")).collect();
        assert_eq!(names, vec!["", "a", "b", "c"]);
    }

    #[test]
    fn sort_with_custom_and_default_order() {
        let mut arr = Array::from_nodes([3, 10, 1, 2]);
        arr.sort_default();
        assert_eq!(arr.ints(), vec![1, 2, 3, 10]);
        arr.sort(|a, b| a.int() > b.int());
        assert_eq!(arr.ints(), vec![10, 3, 2, 1]);
        arr.reverse();
        assert_eq!(arr.ints(), vec![1, 2, 3, 10]);
    }

    #[test]
    fn sort_survives_intransitive_order() {
        let mut arr = Array::from_nodes([
            Node::from("10"),
            Node::from(9),
            Node::from("9a"),
            Node::from(100),
            Node::Null,
        ]);
        arr.sort_default();
        assert_eq!(arr.len(), 5);
        let mut absent = Array::null();
        absent.sort_default();
        assert!(absent.is_null());
    }

    #[test]
    fn nested_containers_serialize() {
        let arr = Array::new()
            .push(Object::new().set("a", 1))
            .push(Array::from_nodes(["x"]))
            .push(Object::null());
        assert_eq!(arr.to_string(), r#"[{"a":1},["x"],null]"#);
        let back: Vec<serde_json::Value> = arr.deserialize_into().expect("values");
        assert_eq!(back.len(), 3);
        assert_eq!(arr.bytes(), arr.string().into_bytes());
    }
}
