// ABOUTME: Linux guest flavor.
// ABOUTME: Accepts standard POSIX signals and defaults the working directory to `/`.

use super::{GuestFlavor, GuestOs};
use crate::exec::ExecError;
use crate::host::{ExecSpec, ProcessSignal};

/// Highest standard (non real-time) signal number.
const MAX_STANDARD_SIGNAL: u32 = 31;

/// Linux guest: signals pass through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxGuest;

impl GuestFlavor for LinuxGuest {
    fn os(&self) -> GuestOs {
        GuestOs::Linux
    }

    fn map_signal(&self, signal: u32) -> Result<ProcessSignal, ExecError> {
        if signal == 0 || signal > MAX_STANDARD_SIGNAL {
            return Err(ExecError::InvalidSignal {
                signal,
                os: GuestOs::Linux,
            });
        }
        Ok(ProcessSignal::Posix(signal as i32))
    }

    fn prepare(&self, mut spec: ExecSpec) -> ExecSpec {
        if spec.cwd.is_none() {
            spec.cwd = Some("/".into());
        }
        spec
    }
}
