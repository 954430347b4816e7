//! Host configuration models for `.agent-host/config.toml`.
//!
//! This module defines the structure of the global settings file that
//! controls process-wide behavior of the agent host.

use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

/// Output format of the log subscriber.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Represents global settings from `.agent-host/config.toml`.
///
/// # Example
///
/// ```toml
/// # .agent-host/config.toml
/// event_capacity = 2048
/// log_level = "debug"
/// log_format = "json"
/// message_log_limit = 500
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct HostSettings {
    /// Number of events buffered by the fan-out sink before slow
    /// subscribers start lagging.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,

    /// Default log filter when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Upper bound on messages an observing agent keeps in its log.
    #[serde(default = "default_message_log_limit")]
    pub message_log_limit: usize,
}

fn default_event_capacity() -> usize {
    1024
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_message_log_limit() -> usize {
    1000
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            message_log_limit: default_message_log_limit(),
        }
    }
}
