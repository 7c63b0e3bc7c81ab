// ABOUTME: Request and response records of the task service.
// ABOUTME: One request type per task-control operation.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

use crate::exec::{ExecState, ExecStatus, ExitInfo};
use crate::host::ExecSpec;
use crate::task::ProcessDetails;
use crate::types::{ExecId, TaskId};

/// Launch the process of a created exec.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub exec_id: ExecId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartResponse {
    pub pid: u32,
}

/// Add a secondary exec to the task.
#[derive(Debug, Clone)]
pub struct ExecProcessRequest {
    pub exec_id: ExecId,
    pub spec: ExecSpec,
}

#[derive(Debug, Clone)]
pub struct KillRequest {
    pub exec_id: ExecId,
    pub signal: u32,
    pub all: bool,
}

#[derive(Debug, Clone)]
pub struct DeleteRequest {
    pub exec_id: ExecId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub id: TaskId,
    pub exec_id: ExecId,
    pub pid: u32,
    pub exit_status: u32,
    pub exited_at: Option<DateTime<Utc>>,
}

impl DeleteResponse {
    pub(crate) fn new(id: TaskId, exec_id: ExecId, info: ExitInfo) -> Self {
        Self {
            id,
            exec_id,
            pid: info.pid,
            exit_status: info.exit_status,
            exited_at: info.exited_at,
        }
    }
}

/// Wait for an exec to exit, optionally giving up after `timeout`.
#[derive(Debug, Clone)]
pub struct WaitRequest {
    pub exec_id: ExecId,
    pub timeout: Option<Duration>,
}

impl WaitRequest {
    pub fn new(exec_id: ExecId) -> Self {
        Self {
            exec_id,
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitResponse {
    pub exit_status: u32,
    pub exited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StateRequest {
    pub exec_id: ExecId,
}

/// State record of one exec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateResponse {
    pub id: TaskId,
    pub exec_id: ExecId,
    pub pid: u32,
    pub status: ExecState,
    pub exit_status: u32,
    pub exited_at: Option<DateTime<Utc>>,
}

impl StateResponse {
    pub(crate) fn new(id: TaskId, status: ExecStatus) -> Self {
        Self {
            id,
            exec_id: status.id,
            pid: status.pid,
            status: status.state,
            exit_status: status.exit_status,
            exited_at: status.exited_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResizePtyRequest {
    pub exec_id: ExecId,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct CloseIoRequest {
    pub exec_id: ExecId,
    pub stdin: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PidsResponse {
    pub processes: Vec<ProcessDetails>,
}
