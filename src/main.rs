// ABOUTME: Entry point for the taskshim CLI application.
// ABOUTME: Parses arguments and dispatches to the command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use nonempty::NonEmpty;
use std::env;
use std::path::PathBuf;
use taskshim::config::{self, Config};
use taskshim::error::{Error, Result};
use taskshim::guest::GuestOs;
use taskshim::output::{Output, OutputMode};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter when `-v` is not given.
const LOG_ENV: &str = "TASKSHIM_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Init { force, command } => {
            let cwd = env::current_dir()?;
            config::init_config(&cwd, command.as_deref(), force)?;
            println!("Created {}", cwd.join(config::CONFIG_FILENAME).display());
            Ok(0)
        }
        Commands::Run {
            config,
            id,
            guest,
            json,
            quiet,
            command,
        } => {
            let config = resolve_config(config, id, guest, command)?;
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Text
            };
            let output = Output::new(mode);

            match commands::run_task(config, Output::new(mode)).await {
                Ok(status) => Ok(commands::exit_code(status)),
                Err(e) => {
                    output.error(&e.to_string());
                    Ok(1)
                }
            }
        }
    }
}

/// Load the config for `run` and apply command-line overrides.
///
/// A command given on the command line makes the config file optional.
fn resolve_config(
    path: Option<PathBuf>,
    id: Option<String>,
    guest: Option<GuestOs>,
    command: Vec<String>,
) -> Result<Config> {
    let command = NonEmpty::from_vec(command);

    let mut config = match (path, &command) {
        (Some(path), _) => Config::load(&path)?,
        (None, None) => Config::discover(&env::current_dir()?)?,
        (None, Some(command)) => match Config::discover(&env::current_dir()?) {
            Ok(config) => config,
            Err(Error::ConfigNotFound(_)) => Config::for_command(command.clone()),
            Err(e) => return Err(e),
        },
    };

    if let Some(command) = command {
        config.command = Some(command);
    }
    if id.is_some() {
        config.id = id;
    }
    if let Some(guest) = guest {
        config.guest = guest;
    }

    Ok(config)
}
