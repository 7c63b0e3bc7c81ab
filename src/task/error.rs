// ABOUTME: Error types for task-level exec operations.
// ABOUTME: NotFound and FailedPrecondition are checked before any mutation.

use crate::error::ErrorKind;
use crate::exec::ExecError;
use crate::types::{ExecId, TaskId};

/// Errors from task operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Exec ID is neither the init exec nor registered.
    #[error("exec '{exec}' not found in task '{task}'")]
    NotFound { task: TaskId, exec: ExecId },

    /// Operation is structurally invalid for the current lifecycle state.
    #[error("{0}")]
    FailedPrecondition(String),

    /// An exec with this ID is already registered.
    #[error("exec '{exec}' already exists in task '{task}'")]
    AlreadyExists { task: TaskId, exec: ExecId },

    /// Secondary execs need a non-empty ID.
    #[error("secondary exec IDs must be non-empty")]
    InvalidExecId,

    /// Failure from the targeted exec.
    #[error(transparent)]
    Exec(#[from] ExecError),
}

impl TaskError {
    pub(crate) fn not_found(task: &TaskId, exec: &ExecId) -> Self {
        TaskError::NotFound {
            task: task.clone(),
            exec: exec.clone(),
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TaskError::NotFound { .. } => ErrorKind::NotFound,
            TaskError::FailedPrecondition(_) => ErrorKind::FailedPrecondition,
            TaskError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            TaskError::InvalidExecId => ErrorKind::InvalidArgument,
            TaskError::Exec(source) => source.kind(),
        }
    }
}
