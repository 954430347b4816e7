//! Configuration models that aggregate all settings.
//!
//! This module provides the unified `HostConfig` structure that combines
//! host settings and every tenant's agent configuration into a single
//! configuration object.

use ah_protocol::agent_models::AgentConfig;
use ah_protocol::config_models::HostSettings;
use std::collections::HashMap;

/// Unified host configuration loaded from `.agent-host/` directory.
///
/// This structure aggregates all configuration sources:
/// - `config.toml`: Host settings
/// - `tenants/<tenant>/agent-<n>.{toml,yaml,yml,json}`: Agent configuration
///
/// # Example
///
/// ```rust,no_run
/// use ah_core::config::loader::load_config;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new(".")).await?;
/// println!("Loaded {} agent configurations",
///          config.agent_configs.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    /// Host settings from `config.toml`.
    pub settings: HostSettings,

    /// Agent configuration keyed by `(tenant, agent number)`.
    pub agent_configs: HashMap<(String, u32), AgentConfig>,
}
