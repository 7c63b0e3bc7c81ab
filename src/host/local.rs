// ABOUTME: Process host that launches execs as local child processes.
// ABOUTME: Uses tokio::process for spawning and nix for signal delivery.

use async_trait::async_trait;
use snafu::{OptionExt, ResultExt};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::Mutex;

use super::error::{
    HostError, MissingPidSnafu, SpawnSnafu, StdinUnavailableSnafu, TerminalUnsupportedSnafu,
    WaitSnafu,
};
use super::traits::{HostedProcess, ProcessHost};
use super::types::{ExecSpec, ProcessSignal};

/// Exit code reported for a process killed by a signal: 128 + signal number.
const SIGNAL_EXIT_BASE: u32 = 128;

/// Launches execs as children of the current process.
///
/// Stdin is piped (so it can be closed on request), stdout and stderr are
/// inherited. Terminals are not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHost;

impl LocalHost {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessHost for LocalHost {
    async fn spawn(&self, spec: &ExecSpec) -> Result<Arc<dyn HostedProcess>, HostError> {
        if spec.terminal {
            return TerminalUnsupportedSnafu.fail();
        }

        let mut command = Command::new(spec.program());
        command
            .args(spec.args.tail())
            .envs(&spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let mut child = command.spawn().context(SpawnSnafu {
            command: spec.command_line(),
        })?;
        let pid = child.id().context(MissingPidSnafu {
            command: spec.command_line(),
        })?;
        let stdin = child.stdin.take();

        tracing::debug!(pid, command = %spec.command_line(), "spawned local process");

        Ok(Arc::new(LocalProcess {
            pid,
            stdin: Mutex::new(stdin),
            child: Mutex::new(child),
            reaped: AtomicBool::new(false),
        }))
    }
}

struct LocalProcess {
    pid: u32,
    stdin: Mutex<Option<ChildStdin>>,
    child: Mutex<Child>,
    /// Set once `wait` has returned. The pid may belong to another process
    /// after that, so no signal is sent to it.
    reaped: AtomicBool,
}

#[async_trait]
impl HostedProcess for LocalProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn signal(&self, signal: ProcessSignal) -> Result<bool, HostError> {
        if self.reaped.load(Ordering::SeqCst) {
            return Ok(false);
        }
        deliver(self.pid, signal)
    }

    async fn resize_console(&self, _width: u32, _height: u32) -> Result<(), HostError> {
        TerminalUnsupportedSnafu.fail()
    }

    async fn close_stdin(&self) -> Result<(), HostError> {
        let stdin = self.stdin.lock().await.take();
        stdin.map(drop).context(StdinUnavailableSnafu { pid: self.pid })
    }

    async fn wait(&self) -> Result<u32, HostError> {
        let status = self.child.lock().await.wait().await;
        self.reaped.store(true, Ordering::SeqCst);
        Ok(exit_code(status.context(WaitSnafu { pid: self.pid })?))
    }
}

#[cfg(unix)]
fn deliver(pid: u32, signal: ProcessSignal) -> Result<bool, HostError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let nix_signal = match signal {
        ProcessSignal::Posix(n) => {
            Signal::try_from(n).map_err(|_| HostError::UnsupportedSignal { signal })?
        }
        ProcessSignal::CtrlC => Signal::SIGINT,
        ProcessSignal::CtrlShutdown => Signal::SIGTERM,
        ProcessSignal::Terminate => Signal::SIGKILL,
    };

    match kill(Pid::from_raw(pid as i32), nix_signal) {
        Ok(()) => Ok(true),
        Err(Errno::ESRCH) => Ok(false),
        Err(errno) => Err(HostError::Signal {
            pid,
            signal,
            message: errno.desc().to_string(),
        }),
    }
}

#[cfg(not(unix))]
fn deliver(_pid: u32, signal: ProcessSignal) -> Result<bool, HostError> {
    Err(HostError::UnsupportedSignal { signal })
}

#[cfg(unix)]
fn exit_code(status: ExitStatus) -> u32 {
    use std::os::unix::process::ExitStatusExt;

    match (status.code(), status.signal()) {
        (Some(code), _) => code as u32,
        (None, Some(signal)) => SIGNAL_EXIT_BASE + signal as u32,
        (None, None) => u32::from(u8::MAX),
    }
}

#[cfg(not(unix))]
fn exit_code(status: ExitStatus) -> u32 {
    status
        .code()
        .map(|code| code as u32)
        .unwrap_or(SIGNAL_EXIT_BASE)
}
