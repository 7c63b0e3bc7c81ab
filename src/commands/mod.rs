// ABOUTME: Command module aggregator for the taskshim CLI.
// ABOUTME: Re-exports the run command handler and exit code mapping.

mod run;

pub use run::{exit_code, run_task};
