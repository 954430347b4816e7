//! Configuration providers for failure paths.

use ah_core::config::{ConfigError, ConfigProvider, ConfigResult};
use ah_protocol::agent_models::AgentConfig;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// A provider whose backing store is down. Every lookup fails.
#[derive(Debug, Clone, Default)]
pub struct UnavailableProvider {
    lookups: Arc<AtomicUsize>,
}

impl UnavailableProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigProvider for UnavailableProvider {
    async fn load(&self, tenant_id: &str, agent_number: u32) -> ConfigResult<AgentConfig> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Err(ConfigError::Unavailable {
            tenant_id: tenant_id.to_string(),
            agent_number,
            reason: "config store offline".to_string(),
        })
    }
}
