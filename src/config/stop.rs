// ABOUTME: Graceful shutdown configuration for the init exec.
// ABOUTME: Defines the stop signal and the grace period before a forced kill.

use serde::Deserialize;
use std::time::Duration;

use super::deserialize::deserialize_signal;
use crate::guest::SIGTERM;

#[derive(Debug, Clone, Deserialize)]
pub struct StopConfig {
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_signal", deserialize_with = "deserialize_signal")]
    pub signal: u32,
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_signal() -> u32 {
    SIGTERM
}

impl Default for StopConfig {
    fn default() -> Self {
        StopConfig {
            timeout: default_timeout(),
            signal: default_signal(),
        }
    }
}
