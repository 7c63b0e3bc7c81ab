// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the init and run subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskshim::guest::GuestOs;

#[derive(Parser)]
#[command(name = "taskshim")]
#[command(about = "Run a container-style task: one init process, its execs and their lifecycle")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a taskshim.yml template in the current directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Init command to put in the template
        #[arg(long)]
        command: Option<String>,
    },

    /// Run a task until its init process exits, then delete it
    Run {
        /// Config file to use instead of discovery
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Task identifier
        #[arg(long)]
        id: Option<String>,

        /// Guest operating system (linux or windows)
        #[arg(long)]
        guest: Option<GuestOs>,

        /// Emit JSON lines instead of text
        #[arg(long, conflicts_with = "quiet")]
        json: bool,

        /// Only print the final exit line
        #[arg(short, long)]
        quiet: bool,

        /// Init command and its arguments
        #[arg(last = true)]
        command: Vec<String>,
    },
}
