// ABOUTME: Guest flavors: the bring-up strategy a task is composed with.
// ABOUTME: Linux and Windows guests differ in signal handling and exec defaults.

mod linux;
mod signal;
mod windows;

pub use linux::LinuxGuest;
pub use signal::{SIGKILL, SIGTERM, parse_signal};
pub use windows::WindowsGuest;

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::exec::ExecError;
use crate::host::{ExecSpec, ProcessSignal};

/// Operating system running inside the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuestOs {
    #[default]
    Linux,
    Windows,
}

impl std::fmt::Display for GuestOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GuestOs::Linux => write!(f, "linux"),
            GuestOs::Windows => write!(f, "windows"),
        }
    }
}

impl std::str::FromStr for GuestOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" | "lcow" => Ok(GuestOs::Linux),
            "windows" | "wcow" => Ok(GuestOs::Windows),
            other => Err(format!("unknown guest OS: {other}")),
        }
    }
}

/// Guest-specific behavior shared by every exec of a task.
///
/// Tasks hold one flavor and consult it when creating execs and before
/// delivering signals. Lifecycle rules do not depend on the flavor.
pub trait GuestFlavor: Send + Sync + std::fmt::Debug {
    fn os(&self) -> GuestOs;

    /// Validate a raw signal number and map it to what the guest understands.
    fn map_signal(&self, signal: u32) -> Result<ProcessSignal, ExecError>;

    /// Apply guest defaults to an exec spec before launch.
    fn prepare(&self, spec: ExecSpec) -> ExecSpec {
        spec
    }
}

/// Select the flavor for a guest OS.
pub fn flavor_for(os: GuestOs) -> Arc<dyn GuestFlavor> {
    match os {
        GuestOs::Linux => Arc::new(LinuxGuest),
        GuestOs::Windows => Arc::new(WindowsGuest),
    }
}
