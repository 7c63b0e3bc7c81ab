// ABOUTME: Test support utilities.
// ABOUTME: Provides exec and process host doubles plus tracing setup for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Once};
use taskshim::exec::{ExecError, ExecState, ExecStatus, ShimExec};
use taskshim::guest::{GuestOs, flavor_for};
use taskshim::host::{ExecSpec, HostError, HostedProcess, ProcessHost, ProcessSignal};
use taskshim::task::Task;
use taskshim::types::{ExecId, TaskId};
use tokio::sync::watch;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for tests. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::from_default_env().add_directive("taskshim=debug".parse().unwrap());
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

// =============================================================================
// TestExec: a scripted exec with no process behind it
// =============================================================================

struct TestRecord {
    pid: u32,
    state: ExecState,
    exit_status: u32,
    exited_at: Option<DateTime<Utc>>,
    signals: Vec<u32>,
    fail_kill: bool,
}

/// Exec double. Start moves it to Running with status 255; any kill moves it
/// straight to Exited with status 0, whatever state it was in.
pub struct TestExec {
    id: ExecId,
    record: Mutex<TestRecord>,
    exited: watch::Sender<bool>,
}

impl TestExec {
    pub fn new(id: impl Into<String>, pid: u32) -> Arc<Self> {
        let (exited, _) = watch::channel(false);
        Arc::new(Self {
            id: ExecId::new(id),
            record: Mutex::new(TestRecord {
                pid,
                state: ExecState::Created,
                exit_status: 0,
                exited_at: None,
                signals: Vec::new(),
                fail_kill: false,
            }),
            exited,
        })
    }

    pub fn init(pid: u32) -> Arc<Self> {
        Self::new("", pid)
    }

    pub fn running(id: impl Into<String>, pid: u32) -> Arc<Self> {
        let exec = Self::new(id, pid);
        exec.set_running();
        exec
    }

    pub fn set_running(&self) {
        let mut record = self.record.lock();
        record.state = ExecState::Running;
        record.exit_status = 255;
    }

    /// Simulate the process exiting on its own.
    pub fn exit(&self, exit_status: u32) {
        {
            let mut record = self.record.lock();
            record.state = ExecState::Exited;
            record.exit_status = exit_status;
            record.exited_at = Some(Utc::now());
        }
        self.exited.send_replace(true);
    }

    /// Make every later kill fail with a host error.
    pub fn fail_kills(&self) {
        self.record.lock().fail_kill = true;
    }

    /// Signals received so far, in order.
    pub fn signals(&self) -> Vec<u32> {
        self.record.lock().signals.clone()
    }
}

#[async_trait]
impl ShimExec for TestExec {
    fn id(&self) -> &ExecId {
        &self.id
    }

    fn pid(&self) -> u32 {
        self.record.lock().pid
    }

    fn state(&self) -> ExecState {
        self.record.lock().state
    }

    fn status(&self) -> ExecStatus {
        let record = self.record.lock();
        ExecStatus {
            id: self.id.clone(),
            pid: record.pid,
            state: record.state,
            exit_status: record.exit_status,
            exited_at: record.exited_at,
        }
    }

    async fn start(&self) -> Result<(), ExecError> {
        self.set_running();
        Ok(())
    }

    async fn kill(&self, signal: u32) -> Result<(), ExecError> {
        {
            let mut record = self.record.lock();
            record.signals.push(signal);
            if record.fail_kill {
                return Err(HostError::Other {
                    message: format!("kill {signal} refused"),
                }
                .into());
            }
        }
        self.exit(0);
        Ok(())
    }

    async fn resize_pty(&self, _width: u32, _height: u32) -> Result<(), ExecError> {
        Ok(())
    }

    async fn close_io(&self, _stdin: bool) -> Result<(), ExecError> {
        Ok(())
    }

    async fn wait(&self) -> ExecStatus {
        let mut exited = self.exited.subscribe();
        let _ = exited.wait_for(|exited| *exited).await;
        self.status()
    }
}

/// A Linux task named `name` with a created init exec and one created
/// secondary exec, both scripted.
pub fn setup_task(name: &str) -> (Task, Arc<TestExec>, Arc<TestExec>) {
    let (task, init) = setup_task_without_execs(name);
    let second = TestExec::new("second", 4242);
    task.register_exec(second.clone()).unwrap();
    (task, init, second)
}

/// A Linux task named `name` with only a created init exec.
pub fn setup_task_without_execs(name: &str) -> (Task, Arc<TestExec>) {
    let init = TestExec::init(1000);
    let task = Task::with_init(
        TaskId::new(name),
        flavor_for(GuestOs::Linux),
        Arc::new(FakeHost::new()),
        init.clone(),
    )
    .unwrap();
    (task, init)
}

// =============================================================================
// FakeHost: an in-memory process host
// =============================================================================

/// Process host whose processes exit when signaled or when told to.
#[derive(Default)]
pub struct FakeHost {
    next_pid: AtomicU32,
    spawned: Mutex<Vec<(ExecSpec, Arc<FakeProcess>)>>,
    fail_spawn: Mutex<bool>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self {
            next_pid: AtomicU32::new(100),
            ..Default::default()
        }
    }

    /// Make the next spawns fail.
    pub fn fail_spawns(&self, fail: bool) {
        *self.fail_spawn.lock() = fail;
    }

    /// Process launched `index`-th on this host.
    pub fn process(&self, index: usize) -> Arc<FakeProcess> {
        Arc::clone(&self.spawned.lock()[index].1)
    }

    /// Spec of the process launched `index`-th on this host.
    pub fn spec(&self, index: usize) -> ExecSpec {
        self.spawned.lock()[index].0.clone()
    }

    pub fn spawn_count(&self) -> usize {
        self.spawned.lock().len()
    }
}

#[async_trait]
impl ProcessHost for FakeHost {
    async fn spawn(&self, spec: &ExecSpec) -> Result<Arc<dyn HostedProcess>, HostError> {
        if *self.fail_spawn.lock() {
            return Err(HostError::Other {
                message: format!("cannot launch {}", spec.command_line()),
            });
        }
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        let process = FakeProcess::new(pid);
        self.spawned
            .lock()
            .push((spec.clone(), Arc::clone(&process)));
        Ok(process)
    }
}

/// A process launched by [`FakeHost`].
pub struct FakeProcess {
    pid: u32,
    exit: watch::Sender<Option<u32>>,
    signals: Mutex<Vec<ProcessSignal>>,
    resizes: Mutex<Vec<(u32, u32)>>,
    stdin_closed: Mutex<bool>,
    ignore_signals: Mutex<bool>,
}

impl FakeProcess {
    fn new(pid: u32) -> Arc<Self> {
        let (exit, _) = watch::channel(None);
        Arc::new(Self {
            pid,
            exit,
            signals: Mutex::new(Vec::new()),
            resizes: Mutex::new(Vec::new()),
            stdin_closed: Mutex::new(false),
            ignore_signals: Mutex::new(false),
        })
    }

    /// Exit with `code` unless the process has already exited.
    pub fn exit(&self, code: u32) {
        self.exit.send_if_modified(|exit| {
            if exit.is_some() {
                return false;
            }
            *exit = Some(code);
            true
        });
    }

    /// Keep running when signaled.
    pub fn ignore_signals(&self) {
        *self.ignore_signals.lock() = true;
    }

    pub fn signals(&self) -> Vec<ProcessSignal> {
        self.signals.lock().clone()
    }

    pub fn resizes(&self) -> Vec<(u32, u32)> {
        self.resizes.lock().clone()
    }

    pub fn stdin_closed(&self) -> bool {
        *self.stdin_closed.lock()
    }
}

#[async_trait]
impl HostedProcess for FakeProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    async fn signal(&self, signal: ProcessSignal) -> Result<bool, HostError> {
        if self.exit.borrow().is_some() {
            return Ok(false);
        }
        self.signals.lock().push(signal);
        if !*self.ignore_signals.lock() {
            let code = match signal {
                ProcessSignal::Posix(number) => 128 + number as u32,
                ProcessSignal::CtrlC | ProcessSignal::CtrlShutdown => 0xC000013A,
                ProcessSignal::Terminate => 1,
            };
            self.exit(code);
        }
        Ok(true)
    }

    async fn resize_console(&self, width: u32, height: u32) -> Result<(), HostError> {
        self.resizes.lock().push((width, height));
        Ok(())
    }

    async fn close_stdin(&self) -> Result<(), HostError> {
        *self.stdin_closed.lock() = true;
        Ok(())
    }

    async fn wait(&self) -> Result<u32, HostError> {
        let mut exit = self.exit.subscribe();
        let code = *exit
            .wait_for(Option::is_some)
            .await
            .map_err(|_| HostError::Other {
                message: "process handle dropped".to_string(),
            })?;
        Ok(code.unwrap_or_default())
    }
}
