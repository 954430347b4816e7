//! Per-agent configuration lookup.

use crate::config::error::ConfigResult;
use ah_protocol::agent_models::AgentConfig;
use async_trait::async_trait;
use std::collections::HashMap;

/// Supplies the configuration for an agent instance that is initialized
/// without an explicit configuration.
#[async_trait]
pub trait ConfigProvider: Send + Sync {
    async fn load(&self, tenant_id: &str, agent_number: u32) -> ConfigResult<AgentConfig>;
}

/// In-memory provider keyed by `(tenant, agent number)`.
///
/// Unknown keys yield an empty configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    configs: HashMap<(String, u32), AgentConfig>,
}

impl StaticConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(
        mut self,
        tenant_id: impl Into<String>,
        agent_number: u32,
        config: AgentConfig,
    ) -> Self {
        self.insert(tenant_id, agent_number, config);
        self
    }

    pub fn insert(&mut self, tenant_id: impl Into<String>, agent_number: u32, config: AgentConfig) {
        self.configs.insert((tenant_id.into(), agent_number), config);
    }
}

impl From<HashMap<(String, u32), AgentConfig>> for StaticConfigProvider {
    fn from(configs: HashMap<(String, u32), AgentConfig>) -> Self {
        Self { configs }
    }
}

#[async_trait]
impl ConfigProvider for StaticConfigProvider {
    async fn load(&self, tenant_id: &str, agent_number: u32) -> ConfigResult<AgentConfig> {
        Ok(self
            .configs
            .get(&(tenant_id.to_string(), agent_number))
            .cloned()
            .unwrap_or_default())
    }
}
