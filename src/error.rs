// ABOUTME: Application-wide error types for taskshim.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::service::Status;
use crate::task::TaskError;

/// Error kind for programmatic handling.
///
/// Every error produced by the task and exec layers maps onto exactly one kind,
/// so dispatchers can translate failures into protocol status codes without
/// looking at messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The referenced exec does not exist in the task.
    NotFound,
    /// The operation is invalid for the current lifecycle state.
    FailedPrecondition,
    /// An exec with the same ID is already registered.
    AlreadyExists,
    /// The request itself is malformed (bad exec ID, unsupported signal).
    InvalidArgument,
    /// A wait gave up before the exec exited.
    Cancelled,
    /// The process host failed.
    Internal,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    #[error("no command given (pass one after `--` or set `command` in the config)")]
    NoCommand,

    #[error(transparent)]
    Task(#[from] TaskError),

    #[error("{0}")]
    Service(#[from] Status),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
