//! Configuration for the acquisition pipeline
//!
//! [`DaqConfig`] groups the per-run settings: serial source, window
//! capacity, recording destination and mode, and the optional relay.
//! Configs load from a TOML file and every field has a default
//! (mirroring the original capture setup: 115200 baud, a 100-sample
//! window, `logging.csv`), so a config file only needs the fields it
//! changes. The CLI layers its flags on top.

use crate::error::{DaqError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default serial baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Default serial read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 500;

/// Default number of retries for transient source errors
pub const DEFAULT_TRANSIENT_RETRIES: u32 = 3;

/// Default sliding window capacity in samples
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

/// Default destination for the persisted session
pub const DEFAULT_OUTPUT_PATH: &str = "logging.csv";

/// Default bound of the relay's outbound queue
pub const DEFAULT_RELAY_QUEUE: usize = 64;

/// Which samples the recorder persists at shutdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersistMode {
    /// Persist the final window snapshot (archive-compatible default;
    /// samples evicted from the window are lost)
    #[default]
    Window,
    /// Persist every admitted sample from the independent session log
    Full,
}

impl std::str::FromStr for PersistMode {
    type Err = DaqError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "window" => Ok(PersistMode::Window),
            "full" => Ok(PersistMode::Full),
            other => Err(DaqError::Config(format!(
                "unknown persist mode `{other}` (expected `window` or `full`)"
            ))),
        }
    }
}

/// Serial source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Serial device path (e.g. `/dev/ttyACM0`, `COM6`)
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Read timeout; also bounds interrupt latency
    pub read_timeout_ms: u64,
    /// Consecutive transient errors tolerated before draining
    pub max_transient_retries: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            max_transient_retries: DEFAULT_TRANSIENT_RETRIES,
        }
    }
}

/// Sliding window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Maximum number of samples kept for live inspection
    pub capacity: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_WINDOW_CAPACITY,
        }
    }
}

/// Session recording settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    /// Destination of the persisted session CSV
    pub output_path: PathBuf,
    /// Which samples to persist at shutdown
    pub persist_mode: PersistMode,
    /// Write a `<output>.meta.json` sidecar with session metadata
    pub metadata_sidecar: bool,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            persist_mode: PersistMode::default(),
            metadata_sidecar: false,
        }
    }
}

/// Relay settings; the relay is absent unless configured
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Subscriber endpoint, `host:port`
    pub addr: String,
    /// Bound of the outbound queue (oldest line dropped on overflow)
    #[serde(default = "default_relay_queue")]
    pub queue_capacity: usize,
}

fn default_relay_queue() -> usize {
    DEFAULT_RELAY_QUEUE
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DaqConfig {
    /// Serial source settings
    pub source: SourceConfig,
    /// Sliding window settings
    pub window: WindowConfig,
    /// Session recording settings
    pub recording: RecordingConfig,
    /// Optional relay settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayConfig>,
}

impl DaqConfig {
    /// Load a configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            DaqError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&contents).map_err(|e| {
            DaqError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Reject configurations that can never work
    pub fn validate(&self) -> Result<()> {
        if self.window.capacity == 0 {
            return Err(DaqError::Config(
                "window capacity must be at least 1".to_string(),
            ));
        }
        if self.source.read_timeout_ms == 0 {
            return Err(DaqError::Config(
                "source read timeout must be nonzero".to_string(),
            ));
        }
        if let Some(relay) = &self.relay {
            if relay.queue_capacity == 0 {
                return Err(DaqError::Config(
                    "relay queue capacity must be at least 1".to_string(),
                ));
            }
            if relay.addr.is_empty() {
                return Err(DaqError::Config("relay address is empty".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DaqConfig::default();
        config.validate().unwrap();
        assert_eq!(config.source.baud_rate, 115_200);
        assert_eq!(config.window.capacity, 100);
        assert_eq!(config.recording.persist_mode, PersistMode::Window);
        assert!(config.relay.is_none());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let mut config = DaqConfig::default();
        config.window.capacity = 0;
        assert!(matches!(config.validate(), Err(DaqError::Config(_))));
    }

    #[test]
    fn test_zero_relay_queue_rejected() {
        let mut config = DaqConfig::default();
        config.relay = Some(RelayConfig {
            addr: "127.0.0.1:9000".to_string(),
            queue_capacity: 0,
        });
        assert!(matches!(config.validate(), Err(DaqError::Config(_))));
    }

    #[test]
    fn test_persist_mode_from_str() {
        assert_eq!("window".parse::<PersistMode>().unwrap(), PersistMode::Window);
        assert_eq!("full".parse::<PersistMode>().unwrap(), PersistMode::Full);
        assert!("yes".parse::<PersistMode>().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: DaqConfig = toml::from_str(
            r#"
            [source]
            port = "/dev/ttyACM0"

            [relay]
            addr = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.source.port, "/dev/ttyACM0");
        assert_eq!(config.source.baud_rate, 115_200);
        assert_eq!(config.window.capacity, 100);
        let relay = config.relay.unwrap();
        assert_eq!(relay.addr, "127.0.0.1:9000");
        assert_eq!(relay.queue_capacity, DEFAULT_RELAY_QUEUE);
    }

    #[test]
    fn test_toml_round_trip() {
        let mut config = DaqConfig::default();
        config.source.port = "COM6".to_string();
        config.recording.persist_mode = PersistMode::Full;

        let text = toml::to_string(&config).unwrap();
        let back: DaqConfig = toml::from_str(&text).unwrap();
        assert_eq!(back.source.port, "COM6");
        assert_eq!(back.recording.persist_mode, PersistMode::Full);
    }
}
