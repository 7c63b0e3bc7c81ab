// ABOUTME: Task: one init exec plus a registry of secondary execs.
// ABOUTME: Enforces the cross-exec preconditions for kill and delete.

mod error;
mod registry;

pub use error::TaskError;
pub use registry::ExecRegistry;

use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::exec::{ExecError, ExitInfo, HostedExec, ShimExec};
use crate::guest::GuestFlavor;
use crate::host::{ExecSpec, ProcessHost};
use crate::types::{ExecId, TaskId};

/// A process running inside a task, as reported by [`Task::pids`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessDetails {
    pub exec_id: ExecId,
    pub pid: u32,
}

/// One container workload: the init exec and its secondary execs.
///
/// The init exec is addressed by the empty ID and lives until a successful
/// `delete_exec` on it, after which the task is deleted and nothing in it is
/// addressable.
pub struct Task {
    id: TaskId,
    flavor: Arc<dyn GuestFlavor>,
    host: Arc<dyn ProcessHost>,
    init: Arc<dyn ShimExec>,
    execs: ExecRegistry,
    deleted: AtomicBool,
}

impl Task {
    /// Create a task whose init exec will run `init_spec` on `host`.
    pub fn new(
        id: TaskId,
        flavor: Arc<dyn GuestFlavor>,
        host: Arc<dyn ProcessHost>,
        init_spec: ExecSpec,
    ) -> Self {
        let init = Arc::new(HostedExec::new(
            id.clone(),
            ExecId::init(),
            init_spec,
            Arc::clone(&host),
            Arc::clone(&flavor),
        ));
        Self::assemble(id, flavor, host, init)
    }

    /// Create a task around an init exec built elsewhere.
    ///
    /// # Errors
    ///
    /// Returns `TaskError::InvalidExecId` if `init` does not carry the init
    /// exec ID.
    pub fn with_init(
        id: TaskId,
        flavor: Arc<dyn GuestFlavor>,
        host: Arc<dyn ProcessHost>,
        init: Arc<dyn ShimExec>,
    ) -> Result<Self, TaskError> {
        if !init.id().is_init() {
            return Err(TaskError::InvalidExecId);
        }
        Ok(Self::assemble(id, flavor, host, init))
    }

    fn assemble(
        id: TaskId,
        flavor: Arc<dyn GuestFlavor>,
        host: Arc<dyn ProcessHost>,
        init: Arc<dyn ShimExec>,
    ) -> Self {
        Self {
            id,
            flavor,
            host,
            init,
            execs: ExecRegistry::new(),
            deleted: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Whether the init exec has been deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted.load(Ordering::SeqCst)
    }

    /// Resolve an exec: the empty ID is the init exec, anything else a
    /// registry lookup.
    pub fn get_exec(&self, exec_id: &ExecId) -> Result<Arc<dyn ShimExec>, TaskError> {
        if exec_id.is_init() {
            if self.is_deleted() {
                return Err(TaskError::not_found(&self.id, exec_id));
            }
            return Ok(Arc::clone(&self.init));
        }
        self.execs
            .get(exec_id)
            .ok_or_else(|| TaskError::not_found(&self.id, exec_id))
    }

    /// Add a secondary exec.
    ///
    /// Refused once the init exec has exited, so that deleting the init exec
    /// never races with a late registration.
    pub fn register_exec(&self, exec: Arc<dyn ShimExec>) -> Result<(), TaskError> {
        if exec.id().is_init() {
            return Err(TaskError::InvalidExecId);
        }
        let exec_id = exec.id().clone();

        self.execs.insert_checked(&self.id, exec, || {
            if self.is_deleted() {
                return Err(TaskError::FailedPrecondition(format!(
                    "task '{}' has been deleted",
                    self.id
                )));
            }
            if self.init.state().is_exited() {
                return Err(TaskError::FailedPrecondition(format!(
                    "cannot add exec '{}' to task '{}' after its init exec has exited",
                    exec_id, self.id
                )));
            }
            Ok(())
        })?;

        tracing::debug!(task = %self.id, exec = %exec_id, "registered exec");
        Ok(())
    }

    /// Create a secondary exec on this task's host and register it.
    pub fn create_exec(
        &self,
        exec_id: ExecId,
        spec: ExecSpec,
    ) -> Result<Arc<dyn ShimExec>, TaskError> {
        let exec: Arc<dyn ShimExec> = Arc::new(HostedExec::new(
            self.id.clone(),
            exec_id,
            spec,
            Arc::clone(&self.host),
            Arc::clone(&self.flavor),
        ));
        self.register_exec(Arc::clone(&exec))?;
        Ok(exec)
    }

    /// Signal one exec, or with `all` on the init exec, every exec.
    pub async fn kill_exec(
        &self,
        exec_id: &ExecId,
        signal: u32,
        all: bool,
    ) -> Result<(), TaskError> {
        let target = self.get_exec(exec_id)?;

        if !exec_id.is_init() {
            if all {
                return Err(TaskError::FailedPrecondition(format!(
                    "cannot signal all execs with non-empty exec ID '{exec_id}'"
                )));
            }
        } else if !all {
            if let Some(active) = self.execs.first_active() {
                return Err(TaskError::FailedPrecondition(format!(
                    "cannot kill the init exec while additional execs remain active (exec '{}' is {})",
                    active.id(),
                    active.state()
                )));
            }
        }

        // Structural checks come first; the signal is validated before any
        // exec is touched.
        self.flavor.map_signal(signal)?;

        if exec_id.is_init() && all {
            return self.kill_all(target, signal).await;
        }

        tracing::debug!(task = %self.id, exec = %exec_id, signal, "killing exec");
        target.kill(signal).await?;
        Ok(())
    }

    /// Signal every registered exec and the init exec. Every kill is attempted;
    /// the first failure is reported once all have finished.
    async fn kill_all(&self, init: Arc<dyn ShimExec>, signal: u32) -> Result<(), TaskError> {
        let others = self.execs.snapshot();
        tracing::debug!(task = %self.id, signal, execs = others.len(), "killing all execs");

        let results = join_all(others.iter().map(|exec| exec.kill(signal))).await;
        let mut first_error: Option<ExecError> = None;
        for (exec, result) in others.iter().zip(results) {
            if let Err(e) = result {
                tracing::warn!(task = %self.id, exec = %exec.id(), error = %e, "failed to kill exec");
                first_error.get_or_insert(e);
            }
        }

        if let Err(e) = init.kill(signal).await {
            tracing::warn!(task = %self.id, error = %e, "failed to kill init exec");
            first_error.get_or_insert(e);
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Remove an exited exec's record and return its exit values.
    ///
    /// Deleting the init exec additionally requires every registered exec to
    /// have exited, and deletes the task.
    pub async fn delete_exec(&self, exec_id: &ExecId) -> Result<ExitInfo, TaskError> {
        let target = self.get_exec(exec_id)?;

        let state = target.state();
        if !state.is_exited() {
            return Err(TaskError::FailedPrecondition(format!(
                "exec '{}' in task '{}' must be exited before it can be deleted (state: {})",
                exec_id, self.id, state
            )));
        }

        if exec_id.is_init() {
            return self.delete_init(target);
        }

        let status = target.status();
        if self.execs.remove(exec_id).is_none() {
            // Lost a race with a concurrent delete of the same exec.
            return Err(TaskError::not_found(&self.id, exec_id));
        }
        tracing::info!(task = %self.id, exec = %exec_id, pid = status.pid, exit_status = status.exit_status, "deleted exec");
        Ok(status.exit_info())
    }

    fn delete_init(&self, init: Arc<dyn ShimExec>) -> Result<ExitInfo, TaskError> {
        if let Some(active) = self.execs.first_active() {
            return Err(TaskError::FailedPrecondition(format!(
                "cannot delete the init exec of task '{}' while exec '{}' is {}",
                self.id,
                active.id(),
                active.state()
            )));
        }

        let status = init.status();
        if self.deleted.swap(true, Ordering::SeqCst) {
            return Err(TaskError::not_found(&self.id, init.id()));
        }
        let dropped = self.execs.clear();

        tracing::info!(
            task = %self.id,
            pid = status.pid,
            exit_status = status.exit_status,
            dropped_execs = dropped,
            "deleted task"
        );
        Ok(status.exit_info())
    }

    /// Pids of the init exec and every registered exec that has one.
    pub fn pids(&self) -> Vec<ProcessDetails> {
        let init = (!self.is_deleted()).then(|| Arc::clone(&self.init));
        init.into_iter()
            .chain(self.execs.snapshot())
            .filter_map(|exec| {
                let pid = exec.pid();
                (pid != 0).then(|| ProcessDetails {
                    exec_id: exec.id().clone(),
                    pid,
                })
            })
            .collect()
    }

    /// Number of registered secondary execs.
    pub fn exec_count(&self) -> usize {
        self.execs.len()
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("guest", &self.flavor.os())
            .field("init", &self.init.state())
            .field("execs", &self.execs)
            .field("deleted", &self.is_deleted())
            .finish()
    }
}
