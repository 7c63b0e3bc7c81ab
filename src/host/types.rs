// ABOUTME: Types passed across the process host boundary.
// ABOUTME: ExecSpec describes what to launch, ProcessSignal what to deliver.

use nonempty::NonEmpty;
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration for launching the process behind an exec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    /// Program followed by its arguments.
    pub args: NonEmpty<String>,
    /// Environment variables added to the process environment.
    pub env: HashMap<String, String>,
    /// Working directory.
    pub cwd: Option<PathBuf>,
    /// Whether the process expects a pseudo-terminal.
    pub terminal: bool,
}

impl ExecSpec {
    /// Create a spec running `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            args: NonEmpty::new(program.into()),
            env: HashMap::new(),
            cwd: None,
            terminal: false,
        }
    }

    /// Append an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set an environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Request a pseudo-terminal.
    pub fn terminal(mut self, terminal: bool) -> Self {
        self.terminal = terminal;
        self
    }

    pub fn program(&self) -> &str {
        self.args.first()
    }

    /// Space-joined command line, for logs and error messages.
    pub fn command_line(&self) -> String {
        self.args.iter().map(String::as_str).collect::<Vec<_>>().join(" ")
    }
}

/// A signal after it has been validated and mapped for a guest OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessSignal {
    /// POSIX signal number, delivered as-is.
    Posix(i32),
    /// Console Ctrl-C event.
    CtrlC,
    /// Console shutdown event.
    CtrlShutdown,
    /// Forced termination.
    Terminate,
}

impl std::fmt::Display for ProcessSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessSignal::Posix(n) => write!(f, "signal {n}"),
            ProcessSignal::CtrlC => write!(f, "ctrl-c"),
            ProcessSignal::CtrlShutdown => write!(f, "ctrl-shutdown"),
            ProcessSignal::Terminate => write!(f, "terminate"),
        }
    }
}
