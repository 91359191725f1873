//! Configuration of the `subtitler-sync` binary.

use std::path::PathBuf;
use std::time::Duration;

use subtitler_client::config::ConfigError;

use crate::options::{MergePolicy, RefetchPolicy, StoreOptions};

/// Seconds between status polls when not overridden.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Directory holding persisted settings and themes when not overridden.
pub const DEFAULT_STATE_DIR: &str = "./.subtitler";

#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub poll_interval: Duration,
    pub state_dir: PathBuf,
    pub store: StoreOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            store: StoreOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                        | Default          |
    /// |--------------------------------|------------------|
    /// | `SUBTITLER_POLL_INTERVAL_SECS` | `5`              |
    /// | `SUBTITLER_STATE_DIR`          | `./.subtitler`   |
    /// | `SUBTITLER_REFETCH_POLICY`     | `replace_all`    |
    /// | `SUBTITLER_MERGE_POLICY`       | `leave_neighbor` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let poll_interval = match lookup("SUBTITLER_POLL_INTERVAL_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError {
                        var: "SUBTITLER_POLL_INTERVAL_SECS",
                        value: raw,
                        expected: "a positive number of seconds",
                    })
                }
            },
            None => defaults.poll_interval,
        };

        let state_dir = lookup("SUBTITLER_STATE_DIR")
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.state_dir);

        let refetch_policy = match lookup("SUBTITLER_REFETCH_POLICY") {
            Some(raw) => raw.parse::<RefetchPolicy>().map_err(|_| ConfigError {
                var: "SUBTITLER_REFETCH_POLICY",
                value: raw.clone(),
                expected: "replace_all or keep_newer_local",
            })?,
            None => RefetchPolicy::default(),
        };

        let merge_policy = match lookup("SUBTITLER_MERGE_POLICY") {
            Some(raw) => raw.parse::<MergePolicy>().map_err(|_| ConfigError {
                var: "SUBTITLER_MERGE_POLICY",
                value: raw.clone(),
                expected: "leave_neighbor or reload_entries",
            })?,
            None => MergePolicy::default(),
        };

        Ok(Self {
            poll_interval,
            state_dir,
            store: StoreOptions {
                refetch_policy,
                merge_policy,
            },
        })
    }
}
