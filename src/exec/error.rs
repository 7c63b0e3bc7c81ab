// ABOUTME: Error types for exec operations.
// ABOUTME: Covers invalid lifecycle states, missing I/O, bad signals and host failures.

use super::state::ExecState;
use crate::error::ErrorKind;
use crate::guest::GuestOs;
use crate::host::HostError;
use crate::types::ExecId;

/// Errors from exec operations.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// Exec is in the wrong state for the operation.
    #[error("exec '{id}' is in state '{state}', expected '{expected}'")]
    InvalidState {
        id: ExecId,
        state: ExecState,
        expected: ExecState,
    },

    /// Exec was not created with a terminal.
    #[error("exec '{id}' is not a tty")]
    NoTerminal { id: ExecId },

    /// Stdin was already closed.
    #[error("stdin of exec '{id}' is already closed")]
    StdinClosed { id: ExecId },

    /// Signal has no meaning for the guest.
    #[error("signal {signal} is not supported by {os} guests")]
    InvalidSignal { signal: u32, os: GuestOs },

    /// Wait gave up before the exec exited.
    #[error("wait on exec '{id}' was cancelled before it exited")]
    WaitCancelled { id: ExecId },

    /// Process host failure, passed through unchanged.
    #[error("process host error: {0}")]
    Host(#[from] HostError),
}

impl ExecError {
    pub(crate) fn invalid_state(id: &ExecId, state: ExecState, expected: ExecState) -> Self {
        ExecError::InvalidState {
            id: id.clone(),
            state,
            expected,
        }
    }

    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExecError::InvalidState { .. }
            | ExecError::NoTerminal { .. }
            | ExecError::StdinClosed { .. } => ErrorKind::FailedPrecondition,
            ExecError::InvalidSignal { .. } => ErrorKind::InvalidArgument,
            ExecError::WaitCancelled { .. } => ErrorKind::Cancelled,
            ExecError::Host(_) => ErrorKind::Internal,
        }
    }
}
