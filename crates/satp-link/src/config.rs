//! Link configuration.
//!
//! All timing assumptions of the link live here: the settle delay between a
//! command and reading its confirmation, and the cadence and budget of
//! indication waits. Values can be loaded from YAML; missing keys fall back
//! to the defaults.
//!
//! ```yaml
//! port: /dev/ttyACM0
//! baud_rate: 115200
//! settle_delay_ms: 500
//! poll_period_ms: 500
//! indication_timeout_ms: 30000
//! resync: skip_byte
//! ```

use std::path::Path;
use std::time::Duration;

use satp_protocol::ResyncPolicy;
use serde::{Deserialize, Serialize};

use crate::error::{LinkError, Result};

/// Default line speed of the radio modules.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Platform default serial port.
pub fn default_port() -> String {
    if cfg!(windows) {
        "COM6".to_string()
    } else {
        "/dev/ttyACM1".to_string()
    }
}

/// Serial link and timing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Serial port name.
    pub port: String,
    /// Line speed.
    pub baud_rate: u32,
    /// Upper bound for a single blocking serial read.
    pub read_timeout_ms: u64,
    /// Wait between sending a command and reading its confirmation.
    pub settle_delay_ms: u64,
    /// Interval between polls while waiting for an indication.
    pub poll_period_ms: u64,
    /// Total time to wait for an indication.
    pub indication_timeout_ms: u64,
    /// Receive buffer behaviour on corrupt frames.
    pub resync: ResyncPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            port: default_port(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: 100,
            settle_delay_ms: 500,
            poll_period_ms: 500,
            indication_timeout_ms: 30_000,
            resync: ResyncPolicy::SkipByte,
        }
    }
}

impl LinkConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_period_ms)
    }

    pub fn indication_timeout(&self) -> Duration {
        Duration::from_millis(self.indication_timeout_ms)
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| LinkError::Config(e.to_string()))
    }

    /// Load a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LinkError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }
}
