// ABOUTME: Exec backed by a process host.
// ABOUTME: Serializes transitions per exec and commits exits from a watcher task.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::watch;

use super::error::ExecError;
use super::state::{ExecState, ExecStatus};
use super::traits::ShimExec;
use crate::guest::GuestFlavor;
use crate::host::{ExecSpec, HostedProcess, ProcessHost};
use crate::types::{ExecId, TaskId};

/// Exit status recorded when an exec is killed before it was ever started.
pub const EXIT_STATUS_KILLED_BEFORE_START: u32 = 1;

/// Exit status recorded when the host could not report one.
pub const EXIT_STATUS_UNKNOWN: u32 = 255;

/// An exec whose process is launched through a [`ProcessHost`].
///
/// Start, kill, resize and close-stdin take the transition lock, so two of
/// them never interleave on the same exec. The observable record sits behind a
/// separate short-lived lock; queries never wait on a host call.
pub struct HostedExec {
    id: ExecId,
    task_id: TaskId,
    spec: ExecSpec,
    host: Arc<dyn ProcessHost>,
    flavor: Arc<dyn GuestFlavor>,
    transition: tokio::sync::Mutex<()>,
    shared: Arc<Shared>,
}

struct Shared {
    record: parking_lot::Mutex<Record>,
    exited: watch::Sender<bool>,
}

struct Record {
    state: ExecState,
    pid: u32,
    exit_status: u32,
    exited_at: Option<DateTime<Utc>>,
    process: Option<Arc<dyn HostedProcess>>,
    stdin_closed: bool,
}

impl Shared {
    /// Move the exec to `Exited`. Returns `false` if it already was.
    fn commit_exit(&self, exit_status: u32) -> bool {
        {
            let mut record = self.record.lock();
            if record.state.is_exited() {
                return false;
            }
            record.state = ExecState::Exited;
            record.exit_status = exit_status;
            record.exited_at = Some(Utc::now());
            record.process = None;
        }
        self.exited.send_replace(true);
        true
    }
}

impl HostedExec {
    /// Create an exec in the `Created` state. Nothing is launched yet.
    pub fn new(
        task_id: TaskId,
        id: ExecId,
        spec: ExecSpec,
        host: Arc<dyn ProcessHost>,
        flavor: Arc<dyn GuestFlavor>,
    ) -> Self {
        let spec = flavor.prepare(spec);
        let (exited, _) = watch::channel(false);
        Self {
            id,
            task_id,
            spec,
            host,
            flavor,
            transition: tokio::sync::Mutex::new(()),
            shared: Arc::new(Shared {
                record: parking_lot::Mutex::new(Record {
                    state: ExecState::Created,
                    pid: 0,
                    exit_status: 0,
                    exited_at: None,
                    process: None,
                    stdin_closed: false,
                }),
                exited,
            }),
        }
    }

    fn running_process(&self) -> Result<Arc<dyn HostedProcess>, ExecError> {
        let record = self.shared.record.lock();
        match (&record.process, record.state) {
            (Some(process), ExecState::Running) => Ok(Arc::clone(process)),
            (_, state) => Err(ExecError::invalid_state(
                &self.id,
                state,
                ExecState::Running,
            )),
        }
    }

    fn watch_exit(&self, process: Arc<dyn HostedProcess>) {
        let shared = Arc::clone(&self.shared);
        let task_id = self.task_id.clone();
        let id = self.id.clone();

        tokio::spawn(async move {
            let exit_status = match process.wait().await {
                Ok(code) => code,
                Err(e) => {
                    tracing::warn!(task = %task_id, exec = %id, error = %e, "failed to wait for process");
                    EXIT_STATUS_UNKNOWN
                }
            };
            if shared.commit_exit(exit_status) {
                tracing::info!(task = %task_id, exec = %id, pid = process.pid(), exit_status, "exec exited");
            }
        });
    }
}

impl std::fmt::Debug for HostedExec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostedExec")
            .field("task", &self.task_id)
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

#[async_trait]
impl ShimExec for HostedExec {
    fn id(&self) -> &ExecId {
        &self.id
    }

    fn pid(&self) -> u32 {
        self.shared.record.lock().pid
    }

    fn state(&self) -> ExecState {
        self.shared.record.lock().state
    }

    fn status(&self) -> ExecStatus {
        let record = self.shared.record.lock();
        ExecStatus {
            id: self.id.clone(),
            pid: record.pid,
            state: record.state,
            exit_status: record.exit_status,
            exited_at: record.exited_at,
        }
    }

    async fn start(&self) -> Result<(), ExecError> {
        let _transition = self.transition.lock().await;

        let state = self.state();
        if state != ExecState::Created {
            return Err(ExecError::invalid_state(
                &self.id,
                state,
                ExecState::Created,
            ));
        }

        // A failed launch leaves the exec in Created.
        let process = self.host.spawn(&self.spec).await?;
        let pid = process.pid();
        {
            let mut record = self.shared.record.lock();
            record.state = ExecState::Running;
            record.pid = pid;
            record.process = Some(Arc::clone(&process));
        }
        self.watch_exit(process);

        tracing::info!(task = %self.task_id, exec = %self.id, pid, "exec started");
        Ok(())
    }

    async fn kill(&self, signal: u32) -> Result<(), ExecError> {
        let mapped = self.flavor.map_signal(signal)?;
        let _transition = self.transition.lock().await;

        let (state, process) = {
            let record = self.shared.record.lock();
            (record.state, record.process.clone())
        };

        match (state, process) {
            (ExecState::Exited, _) => {
                tracing::debug!(task = %self.task_id, exec = %self.id, signal, "kill on exited exec ignored");
            }
            (ExecState::Created, _) => {
                self.shared.commit_exit(EXIT_STATUS_KILLED_BEFORE_START);
                tracing::info!(task = %self.task_id, exec = %self.id, signal, "exec killed before start");
            }
            (ExecState::Running, Some(process)) => {
                let delivered = process.signal(mapped).await?;
                tracing::info!(
                    task = %self.task_id,
                    exec = %self.id,
                    pid = process.pid(),
                    signal,
                    delivered,
                    "signaled exec"
                );
            }
            // The watcher committed the exit between our read and now.
            (ExecState::Running, None) => {}
        }
        Ok(())
    }

    async fn resize_pty(&self, width: u32, height: u32) -> Result<(), ExecError> {
        if !self.spec.terminal {
            return Err(ExecError::NoTerminal {
                id: self.id.clone(),
            });
        }
        let _transition = self.transition.lock().await;

        let process = self.running_process()?;
        process.resize_console(width, height).await?;
        Ok(())
    }

    async fn close_io(&self, stdin: bool) -> Result<(), ExecError> {
        if !stdin {
            return Ok(());
        }
        let _transition = self.transition.lock().await;

        let process = self.running_process()?;
        if self.shared.record.lock().stdin_closed {
            return Err(ExecError::StdinClosed {
                id: self.id.clone(),
            });
        }
        process.close_stdin().await?;
        self.shared.record.lock().stdin_closed = true;

        tracing::debug!(task = %self.task_id, exec = %self.id, "closed stdin");
        Ok(())
    }

    async fn wait(&self) -> ExecStatus {
        let mut exited = self.shared.exited.subscribe();
        // The sender lives in `self.shared`, so the channel stays open while
        // we are borrowed and `wait_for` only returns once the flag is set.
        exited.wait_for(|exited| *exited).await.ok();
        self.status()
    }
}
