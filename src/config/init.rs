// ABOUTME: Config scaffolding for new tasks.
// ABOUTME: Creates taskshim.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, command: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let yaml = generate_template_yaml(&Config::template(), command.unwrap_or("sleep 30"));
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config, command: &str) -> String {
    format!(
        r#"# Task identifier (default: derived from the shim's pid)
# id: my-task
guest: {}
command: {}
# env:
#   GREETING: hello
# cwd: /srv/app
stop:
  signal: {}
  timeout: {}s
"#,
        config.guest,
        command,
        config.stop.signal,
        config.stop.timeout.as_secs(),
    )
}
