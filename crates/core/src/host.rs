//! Host facade over the agent manager.
//!
//! `AgentHost` wires a registry, a configuration provider and a broadcast
//! sink into one [`AgentManager`] and answers transport [`Op`]s with
//! [`OpResult`]s. A transport owns exactly one host.

use crate::agents::{AgentManager, AgentRegistry};
use crate::config::{ConfigProvider, HostConfig, StaticConfigProvider};
use crate::events::{BroadcastSink, TenantSubscription};
use ah_protocol::event_models::TenantEvent;
use ah_protocol::ipc::{Op, OpResult};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info};

pub struct AgentHost {
    manager: Arc<AgentManager>,
    sink: BroadcastSink,
}

impl AgentHost {
    /// Build a host from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `registry` - Agent types this host can instantiate
    /// * `config` - Fallback configuration for `InitializeAgent` without one
    /// * `event_capacity` - Per-subscriber event buffer
    pub fn new(registry: AgentRegistry, config: Arc<dyn ConfigProvider>, event_capacity: usize) -> Self {
        let sink = BroadcastSink::new(event_capacity);
        let manager = AgentManager::new(Arc::new(registry), config, Arc::new(sink.clone()));
        Self {
            manager: Arc::new(manager),
            sink,
        }
    }

    /// Build a host from a loaded `.agent-host/` configuration.
    pub fn from_config(config: HostConfig) -> Self {
        let registry = AgentRegistry::with_settings(&config.settings);
        let provider = StaticConfigProvider::from(config.agent_configs);
        info!(
            agent_types = registry.descriptors().len(),
            event_capacity = config.settings.event_capacity,
            "Agent host configured"
        );
        Self::new(registry, Arc::new(provider), config.settings.event_capacity)
    }

    pub fn manager(&self) -> Arc<AgentManager> {
        Arc::clone(&self.manager)
    }

    /// Events of one tenant only.
    pub fn subscribe_tenant(&self, tenant_id: impl Into<String>) -> TenantSubscription {
        self.sink.subscribe_tenant(tenant_id)
    }

    /// Events of every tenant.
    pub fn subscribe(&self) -> broadcast::Receiver<TenantEvent> {
        self.sink.subscribe()
    }

    /// Answer one transport operation.
    pub async fn handle(&self, op: Op) -> OpResult {
        debug!(?op, "Handling operation");
        match op {
            Op::InitializeAgent {
                tenant_id,
                agent_number,
                config,
            } => {
                let success = self
                    .manager
                    .initialize_agent(&tenant_id, agent_number, config)
                    .await;
                OpResult::Initialized { agent_number, success }
            }
            Op::ExecuteCommand {
                tenant_id,
                agent_number,
                command,
            } => {
                let response = self
                    .manager
                    .execute_command(&tenant_id, agent_number, command)
                    .await;
                OpResult::CommandResponse { agent_number, response }
            }
            Op::ProcessVoiceCommand {
                tenant_id,
                agent_number,
                text,
            } => {
                let text = self
                    .manager
                    .process_voice_command(&tenant_id, agent_number, &text)
                    .await;
                OpResult::VoiceReply { agent_number, text }
            }
            Op::ShutdownAgent {
                tenant_id,
                agent_number,
            } => {
                self.manager.shutdown_agent(&tenant_id, agent_number).await;
                OpResult::AgentShutdown { agent_number }
            }
            Op::GetAgentInfo {
                tenant_id,
                agent_number,
            } => OpResult::AgentInfo {
                info: self.manager.get_agent_info(&tenant_id, agent_number).await,
            },
            Op::GetTenantAgents { tenant_id } => OpResult::TenantAgents {
                agents: self.manager.get_tenant_agents(&tenant_id).await,
            },
            Op::Shutdown => {
                self.manager.shutdown_all_agents().await;
                OpResult::ShutdownComplete
            }
        }
    }
}
