//! Purpose: Loosely-typed navigation, coercion and re-serialization of arbitrary JSON.
//! Exports: `api` surface (re-exported at the root), `core` engine, `json` codec.
//! Role: Library backing the `jsvalue` CLI and any caller that reads schemaless JSON.
//! Invariants: Reads coerce lazily per access; nothing is cached on a value.
//! Invariants: Absent (null) containers stay distinct from present empty ones.
pub mod api;
pub mod core;
pub mod json;

pub use api::*;
