//! Server configuration
//!
//! Defaults match the original deployment (line protocol on 5678, HTTP on
//! 1234, a JSON dump every two hours); each value can be overridden through
//! an `IDIS_`-prefixed environment variable.

use std::path::PathBuf;
use std::time::Duration;

/// Process configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Line-protocol listen address
    pub line_addr: String,

    /// HTTP listen address
    pub http_addr: String,

    /// Snapshot file path
    pub snapshot_path: PathBuf,

    /// Interval between periodic snapshots
    pub snapshot_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            line_addr: "127.0.0.1:5678".to_string(),
            http_addr: "127.0.0.1:1234".to_string(),
            snapshot_path: PathBuf::from("dump.json"),
            snapshot_interval: Duration::from_secs(2 * 60 * 60),
        }
    }
}

impl Config {
    /// Build a configuration from the environment, falling back to defaults
    ///
    /// Recognized variables: `IDIS_LINE_ADDR`, `IDIS_HTTP_ADDR`,
    /// `IDIS_SNAPSHOT_PATH`, `IDIS_SNAPSHOT_INTERVAL_SECS`.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        Config {
            line_addr: std::env::var("IDIS_LINE_ADDR").unwrap_or(defaults.line_addr),
            http_addr: std::env::var("IDIS_HTTP_ADDR").unwrap_or(defaults.http_addr),
            snapshot_path: std::env::var("IDIS_SNAPSHOT_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.snapshot_path),
            snapshot_interval: std::env::var("IDIS_SNAPSHOT_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.snapshot_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.line_addr, "127.0.0.1:5678");
        assert_eq!(config.http_addr, "127.0.0.1:1234");
        assert_eq!(config.snapshot_path, PathBuf::from("dump.json"));
        assert_eq!(config.snapshot_interval, Duration::from_secs(7200));
    }
}
