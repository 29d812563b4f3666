//! holdlined.toml configuration.
//!
//! ```toml
//! listen_port = 8080
//!
//! [keepalive]
//! interval = "30s"
//! ```

use std::path::Path;

use holdline_core::KeepAliveConfig;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DaemonConfig {
    #[serde(default = "default_port")]
    pub listen_port: u16,
    #[serde(default)]
    pub keepalive: KeepAliveConfig,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            listen_port: DEFAULT_PORT,
            keepalive: KeepAliveConfig::default(),
        }
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl DaemonConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
