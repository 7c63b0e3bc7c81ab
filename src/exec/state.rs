// ABOUTME: Exec lifecycle state and status snapshots.
// ABOUTME: ExecState is monotonic: Created -> Running -> Exited, or Created -> Exited.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ExecId;

/// Lifecycle state of an exec.
///
/// ```text
///   Created ──start──▶ Running
///      │                  │
///      └──kill──▶ Exited ◀┴──kill / exit
/// ```
///
/// `Exited` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecState {
    Created,
    Running,
    Exited,
}

impl ExecState {
    pub fn is_exited(self) -> bool {
        self == ExecState::Exited
    }
}

impl std::fmt::Display for ExecState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecState::Created => write!(f, "created"),
            ExecState::Running => write!(f, "running"),
            ExecState::Exited => write!(f, "exited"),
        }
    }
}

/// Point-in-time view of an exec.
///
/// `exit_status` is 0 and `exited_at` is `None` until the exec has exited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecStatus {
    pub id: ExecId,
    pub pid: u32,
    pub state: ExecState,
    pub exit_status: u32,
    pub exited_at: Option<DateTime<Utc>>,
}

impl ExecStatus {
    pub fn exit_info(&self) -> ExitInfo {
        ExitInfo {
            pid: self.pid,
            exit_status: self.exit_status,
            exited_at: self.exited_at,
        }
    }
}

/// The values handed back when an exec record is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExitInfo {
    pub pid: u32,
    pub exit_status: u32,
    pub exited_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_exited_is_exited() {
        assert!(!ExecState::Created.is_exited());
        assert!(!ExecState::Running.is_exited());
        assert!(ExecState::Exited.is_exited());
    }

    #[test]
    fn status_serializes_missing_exit_time_as_null() {
        let status = ExecStatus {
            id: ExecId::new("s1"),
            pid: 42,
            state: ExecState::Running,
            exit_status: 0,
            exited_at: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["id"], "s1");
        assert_eq!(json["state"], "running");
        assert!(json["exited_at"].is_null());
    }
}
