// ABOUTME: Process host error types with SNAFU pattern.
// ABOUTME: Failures from launching, signaling, or waiting on host processes.

use snafu::Snafu;

use super::types::ProcessSignal;

/// Failure reported by a process host.
///
/// The task and exec layers never reinterpret these; they surface as
/// `ErrorKind::Internal`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HostError {
    #[snafu(display("failed to spawn `{command}`: {source}"))]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    #[snafu(display("spawned `{command}` but it reported no pid"))]
    MissingPid { command: String },

    #[snafu(display("failed to deliver {signal} to pid {pid}: {message}"))]
    Signal {
        pid: u32,
        signal: ProcessSignal,
        message: String,
    },

    #[snafu(display("{signal} is not supported by this host"))]
    UnsupportedSignal { signal: ProcessSignal },

    #[snafu(display("terminal allocation is not supported by this host"))]
    TerminalUnsupported,

    #[snafu(display("stdin of pid {pid} is not available"))]
    StdinUnavailable { pid: u32 },

    #[snafu(display("failed to wait for pid {pid}: {source}"))]
    Wait { pid: u32, source: std::io::Error },

    #[snafu(display("{message}"))]
    Other { message: String },
}
