// ABOUTME: Type-safe identifiers shared across the shim.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod id;

pub use id::{ExecId, ExecMarker, Id, IdKind, TaskId, TaskMarker};
