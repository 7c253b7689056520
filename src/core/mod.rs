// Coercion engine, ordering, emptiness, timestamp parsing and the node model.
pub mod coerce;
pub mod compare;
pub mod empty;
pub mod error;
pub mod node;
pub mod timeparse;
