// ABOUTME: Capability traits for the process host behind an exec.
// ABOUTME: ProcessHost launches processes, HostedProcess controls one of them.

use async_trait::async_trait;
use std::sync::Arc;

use super::error::HostError;
use super::types::{ExecSpec, ProcessSignal};

/// Launches processes for execs.
///
/// Implementations own whatever bring-up the environment needs (a local
/// fork/exec, a utility VM, a compute system). The exec state machine only
/// ever talks to this trait.
#[async_trait]
pub trait ProcessHost: Send + Sync {
    /// Launch the process described by `spec`.
    async fn spawn(&self, spec: &ExecSpec) -> Result<Arc<dyn HostedProcess>, HostError>;
}

/// A launched process.
///
/// `wait` is driven by a single watcher task for the whole lifetime of the
/// process, concurrently with `signal`, `resize_console` and `close_stdin`.
#[async_trait]
pub trait HostedProcess: Send + Sync {
    /// Process identifier, non-zero.
    fn pid(&self) -> u32;

    /// Deliver a signal. Returns `false` when the process was already gone.
    ///
    /// Must not wait for the process to exit.
    async fn signal(&self, signal: ProcessSignal) -> Result<bool, HostError>;

    /// Resize the process console.
    async fn resize_console(&self, width: u32, height: u32) -> Result<(), HostError>;

    /// Close the process's standard input.
    async fn close_stdin(&self) -> Result<(), HostError>;

    /// Wait for the process to exit and return its exit code.
    async fn wait(&self) -> Result<u32, HostError>;
}
