// ABOUTME: Windows guest flavor.
// ABOUTME: Maps the few POSIX signals Windows understands onto console events.

use super::signal::{SIGINT, SIGKILL, SIGTERM};
use super::{GuestFlavor, GuestOs};
use crate::exec::ExecError;
use crate::host::ProcessSignal;

/// Windows guest: only SIGINT, SIGTERM and SIGKILL have an equivalent.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsGuest;

impl GuestFlavor for WindowsGuest {
    fn os(&self) -> GuestOs {
        GuestOs::Windows
    }

    fn map_signal(&self, signal: u32) -> Result<ProcessSignal, ExecError> {
        match signal {
            SIGINT => Ok(ProcessSignal::CtrlC),
            SIGTERM => Ok(ProcessSignal::CtrlShutdown),
            SIGKILL => Ok(ProcessSignal::Terminate),
            _ => Err(ExecError::InvalidSignal {
                signal,
                os: GuestOs::Windows,
            }),
        }
    }
}
