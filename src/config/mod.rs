// ABOUTME: Configuration types and parsing for taskshim.yml.
// ABOUTME: Handles YAML parsing, discovery and building the init exec spec.

mod deserialize;
mod init;
mod stop;

pub use init::init_config;
pub use stop::StopConfig;

use crate::error::{Error, Result};
use crate::guest::GuestOs;
use crate::host::ExecSpec;
use crate::types::TaskId;
use deserialize::deserialize_command;
use nonempty::NonEmpty;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "taskshim.yml";
pub const CONFIG_FILENAME_ALT: &str = "taskshim.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".taskshim/config.yml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "TASKSHIM_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub guest: GuestOs,

    #[serde(default, deserialize_with = "deserialize_command")]
    pub command: Option<NonEmpty<String>>,

    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default)]
    pub cwd: Option<PathBuf>,

    #[serde(default)]
    pub terminal: bool,

    #[serde(default)]
    pub stop: StopConfig,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find and load the config for `dir`.
    ///
    /// `TASKSHIM_CONFIG` wins when set; otherwise the usual file names are
    /// tried in order.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Config that runs `command` with every other setting at its default.
    pub fn for_command(command: NonEmpty<String>) -> Self {
        Config {
            command: Some(command),
            ..Self::template()
        }
    }

    /// Task ID from the config, or one derived from the shim's pid.
    pub fn task_id(&self) -> TaskId {
        match &self.id {
            Some(id) => TaskId::new(id.as_str()),
            None => TaskId::new(format!("taskshim-{}", std::process::id())),
        }
    }

    /// Build the init exec spec. `default_cwd` applies when no `cwd` is set.
    pub fn exec_spec(&self, default_cwd: &Path) -> Result<ExecSpec> {
        let command = self.command.clone().ok_or(Error::NoCommand)?;
        let cwd = self
            .cwd
            .clone()
            .unwrap_or_else(|| default_cwd.to_path_buf());

        Ok(ExecSpec {
            args: command,
            env: self.env.clone(),
            cwd: Some(cwd),
            terminal: self.terminal,
        })
    }

    pub fn template() -> Self {
        Config {
            id: None,
            guest: GuestOs::default(),
            command: None,
            env: HashMap::new(),
            cwd: None,
            terminal: false,
            stop: StopConfig::default(),
        }
    }
}
