//! Purpose: Define the public accessor surface over untyped JSON.
//! Exports: `Value`, `Object`, `Array`, file and http helpers, free coercion helpers.
//! Role: Public, additive-only surface; the core engine stays behind it.
//! Invariants: Typed getters never return errors; boundary operations do.
//! Invariants: Instances are single-owner; there is no internal locking.

mod array;
mod file;
mod http;
mod object;
mod value;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::node::Node;
pub use crate::core::timeparse::{ZERO_TIME, parse_time};
pub use crate::json::codec::{encode, indent_encode, marshal};
pub use array::Array;
pub use file::{parse_file, read_file_into, write_file, write_file_indent, write_to};
pub use http::{Body, HttpClient, HttpConfig};
pub use object::Object;
pub use value::{
    Value, and, compare, is_empty, is_int, is_num, or, to_int, to_num, to_str, to_uint64,
};
