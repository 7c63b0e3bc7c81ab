// ABOUTME: The exec contract shared by init and secondary execs.
// ABOUTME: Query, start, signal, resize, close stdin and wait on one process.

use async_trait::async_trait;
use std::time::Duration;

use super::error::ExecError;
use super::state::{ExecState, ExecStatus};
use crate::types::ExecId;

/// One process inside a task and its lifecycle.
///
/// All methods take `&self` and are safe to call concurrently; implementations
/// serialize state transitions internally.
#[async_trait]
pub trait ShimExec: Send + Sync {
    /// Exec identifier. Empty for the init exec.
    fn id(&self) -> &ExecId;

    /// Process identifier, 0 until started.
    fn pid(&self) -> u32;

    /// Latest committed lifecycle state.
    fn state(&self) -> ExecState;

    /// Snapshot of the exec.
    fn status(&self) -> ExecStatus;

    /// Launch the process. Only valid from `Created`.
    async fn start(&self) -> Result<(), ExecError>;

    /// Deliver a signal.
    ///
    /// Killing a `Created` exec moves it straight to `Exited`. Killing an
    /// `Exited` exec is a no-op. Never waits for the process to exit.
    async fn kill(&self, signal: u32) -> Result<(), ExecError>;

    /// Resize the exec's terminal.
    async fn resize_pty(&self, width: u32, height: u32) -> Result<(), ExecError>;

    /// Close the exec's stdin when `stdin` is set.
    async fn close_io(&self, stdin: bool) -> Result<(), ExecError>;

    /// Wait until the exec has exited and return its final status.
    ///
    /// Dropping the future abandons the wait without side effects.
    async fn wait(&self) -> ExecStatus;

    /// Wait at most `timeout` for the exec to exit.
    async fn wait_timeout(&self, timeout: Duration) -> Result<ExecStatus, ExecError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| ExecError::WaitCancelled {
                id: self.id().clone(),
            })
    }
}
