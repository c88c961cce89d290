//! Poller configuration

use crate::error::{Error, Result};
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Poller configuration, usually read from `~/.stackwait/config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between two fetches
    pub interval_secs: u64,

    /// Total wait budget in seconds
    pub timeout_secs: u64,

    /// Ignore `timeout_secs` and wait without a budget
    pub wait_forever: bool,

    /// Block storage status defaults
    pub block_storage: StatusDefaults,

    /// Compute status defaults
    pub compute: StatusDefaults,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: 2,
            timeout_secs: 120,
            wait_forever: false,
            block_storage: StatusDefaults::block_storage(),
            compute: StatusDefaults::compute(),
        }
    }
}

/// `~/.stackwait/config.toml`, relative to the working directory when `HOME`
/// is unset
pub fn default_config_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".stackwait")
        .join("config.toml")
}

/// Target and failure statuses a service waits on by default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefaults {
    pub status: String,
    #[serde(default)]
    pub failures: Vec<String>,
}

impl StatusDefaults {
    pub fn block_storage() -> Self {
        Self {
            status: "available".to_string(),
            failures: vec!["error".to_string()],
        }
    }

    pub fn compute() -> Self {
        Self {
            status: "ACTIVE".to_string(),
            failures: vec!["ERROR".to_string()],
        }
    }
}

impl PollConfig {
    /// Load configuration from file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Load `~/.stackwait/config.toml`, or defaults when it does not exist
    pub fn load_default() -> Result<Self> {
        Self::load(&default_config_path())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "interval_secs must be at least 1".to_string(),
            ));
        }
        let services = [("block_storage", &self.block_storage), ("compute", &self.compute)];
        for (service, defaults) in services {
            if defaults.status.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "{}.status must not be empty",
                    service
                )));
            }
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        if self.wait_forever {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }

    /// Wait options built from this configuration
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            interval: self.interval(),
            timeout: self.timeout(),
            cancel: None,
        }
    }
}
