//! Purpose: JSON text boundary shared by every parse/encode entrypoint.
//! Exports: `codec` decode/encode helpers.
//! Role: Single seam for the serde_json dependency so callsites avoid ad hoc decode logic.
//! Invariants: Decode failures always surface as `ErrorKind::Decode`.
//! Invariants: Helper APIs stay small and deterministic (no hidden global state).

pub mod codec;
