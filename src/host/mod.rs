// ABOUTME: Process host boundary: the external collaborator that runs processes.
// ABOUTME: Exposes the host traits, boundary types, errors and the local host.

mod error;
mod local;
mod traits;
mod types;

pub use error::HostError;
pub use local::LocalHost;
pub use traits::{HostedProcess, ProcessHost};
pub use types::{ExecSpec, ProcessSignal};
