// ABOUTME: Protocol status codes returned by the task service.
// ABOUTME: Maps error kinds to codes without inspecting error messages.

use serde::Serialize;

use crate::error::ErrorKind;
use crate::task::TaskError;

/// Status code of a failed request, modeled on RPC status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Code {
    NotFound,
    FailedPrecondition,
    AlreadyExists,
    InvalidArgument,
    Cancelled,
    Internal,
}

impl From<ErrorKind> for Code {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Code::NotFound,
            ErrorKind::FailedPrecondition => Code::FailedPrecondition,
            ErrorKind::AlreadyExists => Code::AlreadyExists,
            ErrorKind::InvalidArgument => Code::InvalidArgument,
            ErrorKind::Cancelled => Code::Cancelled,
            ErrorKind::Internal => Code::Internal,
        }
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Code::NotFound => "not found",
            Code::FailedPrecondition => "failed precondition",
            Code::AlreadyExists => "already exists",
            Code::InvalidArgument => "invalid argument",
            Code::Cancelled => "cancelled",
            Code::Internal => "internal",
        };
        write!(f, "{name}")
    }
}

/// A failed request: code plus human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct Status {
    pub code: Code,
    pub message: String,
}

impl From<TaskError> for Status {
    fn from(err: TaskError) -> Self {
        Status {
            code: err.kind().into(),
            message: err.to_string(),
        }
    }
}
