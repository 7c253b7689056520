//! Purpose: Order and equate two untyped nodes.
//! Exports: `compare`, `equal`.
//! Role: Shared comparator for `Value::equal`, `Array::index_of` and the array sorts.
//! Invariants: The numeric path runs only when BOTH operands are numeric kinds;
//!             a numeric string against a number compares as text.
//! Invariants: Incomparable floats (NaN) compare as equal, never panic.

use std::cmp::Ordering;

use super::coerce::{float64, text};
use super::node::Node;

pub fn compare(a: &Node, b: &Node) -> Ordering {
    if a.is_num() && b.is_num() {
        return order(&float64(a), &float64(b));
    }
    order(&text(a), &text(b))
}

pub fn equal(a: &Node, b: &Node) -> bool {
    compare(a, b) == Ordering::Equal
}

fn order<T: PartialOrd + ?Sized>(a: &T, b: &T) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}
