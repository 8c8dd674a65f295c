use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_SHUTDOWN_GRACE_MS: u64 = 5_000;
pub const DEFAULT_FEED_CAPACITY: usize = 1_024;

const ENV_SHUTDOWN_GRACE_MS: &str = "CAPWIRE_SHUTDOWN_GRACE_MS";
const ENV_FEED_CAPACITY: &str = "CAPWIRE_FEED_CAPACITY";
const ENV_LOG: &str = "CAPWIRE_LOG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// How long shutdown waits for background services before aborting them.
    pub shutdown_grace_ms: u64,
    /// Buffered payloads per feed before slow listeners start lagging.
    pub feed_capacity: usize,
    /// `tracing_subscriber::EnvFilter` directive for binaries embedding the host.
    pub log_filter: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_ms: DEFAULT_SHUTDOWN_GRACE_MS,
            feed_capacity: DEFAULT_FEED_CAPACITY,
            log_filter: "info".to_string(),
        }
    }
}

impl HostConfig {
    /// Defaults overlaid with `CAPWIRE_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_SHUTDOWN_GRACE_MS) {
            config.shutdown_grace_ms = parse(ENV_SHUTDOWN_GRACE_MS, value)?;
        }
        if let Some(value) = lookup(ENV_FEED_CAPACITY) {
            let capacity: usize = parse(ENV_FEED_CAPACITY, value.clone())?;
            if capacity == 0 {
                return Err(ConfigError::InvalidVar {
                    var: ENV_FEED_CAPACITY,
                    value,
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.feed_capacity = capacity;
        }
        if let Some(value) = lookup(ENV_LOG) {
            config.log_filter = value;
        }
        Ok(config)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::InvalidVar {
        var,
        reason: e.to_string(),
        value,
    })
}
