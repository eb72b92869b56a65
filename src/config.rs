use std::time::Duration;
use anyhow::{anyhow, Result};

pub const INTERVAL:  Duration = Duration::from_secs(60);
pub const THRESHOLD: u64      = 10 * 1024 * 1024;
pub const WINDOW:    Duration = Duration::from_secs(5);
pub const SETTLE:    Duration = Duration::from_secs(1);
pub const BACKOFF:   Duration = Duration::from_secs(10);

/// Load-time settings of the monitor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    pub containers: Vec<String>,
    /// Time between network samples.
    pub interval:   Duration,
    /// Bytes moved per interval (rx + tx) above which an alert is raised.
    pub threshold:  u64,
    /// A stop this recent is assumed to be part of a restart.
    pub window:     Duration,
    /// Pause after a death event before classifying it.
    pub settle:     Duration,
    /// Pause after a failed sampling pass.
    pub backoff:    Duration,
}

impl Config {
    pub fn new<S: AsRef<str>>(containers: &[S]) -> Result<Self> {
        let mut names = Vec::<String>::new();

        for name in containers {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(anyhow!("empty container name"));
            }
            if !names.iter().any(|n| n == name) {
                names.push(name.to_owned());
            }
        }

        if names.is_empty() {
            return Err(anyhow!("no containers to monitor"));
        }

        Ok(Self {
            containers: names,
            interval:   INTERVAL,
            threshold:  THRESHOLD,
            window:     WINDOW,
            settle:     SETTLE,
            backoff:    BACKOFF,
        })
    }
}
