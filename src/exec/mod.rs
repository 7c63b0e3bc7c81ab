// ABOUTME: Exec contract, lifecycle state and the host-backed implementation.
// ABOUTME: An exec is one process in a task: Created -> Running -> Exited.

mod error;
mod hosted;
mod state;
mod traits;

pub use error::ExecError;
pub use hosted::{EXIT_STATUS_KILLED_BEFORE_START, EXIT_STATUS_UNKNOWN, HostedExec};
pub use state::{ExecState, ExecStatus, ExitInfo};
pub use traits::ShimExec;
