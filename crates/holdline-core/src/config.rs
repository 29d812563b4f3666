//! Keep-alive configuration.
//!
//! Durations are written as short human strings (`"30s"`, `"500ms"`,
//! `"2m"`) so they read naturally in TOML files.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::ConfigError;

/// Default gap between heartbeat lines.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeepAliveConfig {
    /// Time to wait on the operation before writing a heartbeat.
    #[serde(default = "default_interval", deserialize_with = "deserialize_interval")]
    pub interval: Duration,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl KeepAliveConfig {
    /// Build a config with the given heartbeat interval.
    pub fn with_interval(interval: Duration) -> Result<Self, ConfigError> {
        if interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(Self { interval })
    }
}

fn default_interval() -> Duration {
    DEFAULT_INTERVAL
}

fn deserialize_interval<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let interval = parse_duration(&raw).map_err(serde::de::Error::custom)?;
    if interval.is_zero() {
        return Err(serde::de::Error::custom(ConfigError::ZeroInterval));
    }
    Ok(interval)
}

/// Parse `"500ms"`, `"30s"`, `"2m"` or a bare number of seconds.
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::InvalidDuration(s.to_string());

    // Unit size in milliseconds.
    let (digits, unit_ms) = if let Some(ms) = s.strip_suffix("ms") {
        (ms, 1)
    } else if let Some(secs) = s.strip_suffix('s') {
        (secs, 1_000)
    } else if let Some(mins) = s.strip_suffix('m') {
        (mins, 60_000)
    } else {
        (s, 1_000)
    };

    let count = digits.trim().parse::<u64>().map_err(|_| invalid())?;
    count
        .checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(invalid)
}
