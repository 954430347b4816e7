//! Agent manager for orchestrating agent instances across tenants.
//!
//! The `AgentManager` is responsible for:
//! - Creating instances from the registry, keyed by `(tenant, agent number)`
//! - Routing commands and voice text to the right instance
//! - Forwarding each instance's events to the fan-out sink
//! - Delivering inter-agent messages within a tenant
//! - Tearing instances down individually or all at once
//!
//! Every public operation returns a typed value (`bool`, `Response`,
//! `String`, `Option<AgentInfo>`); failures are logged and converted, never
//! propagated.

use crate::agents::context::{AgentDirectory, AgentLink};
use crate::agents::factory::AgentRegistry;
use crate::config::ConfigProvider;
use crate::events::{EventEmitter, EventSink};
use crate::state::instances::{AgentHandle, InstanceEntry, InstanceKey, InstanceMap};
use ah_protocol::agent_models::{AgentConfig, AgentInfo};
use ah_protocol::command_models::{Command, Response, ResponseMetadata};
use ah_protocol::event_models::{AgentEvent, AgentFault, AgentMessage, TenantEvent};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

const LAZY_INIT_FAILED: &str = "Agent not initialized and failed to initialize";
const LAZY_INIT_MISSING: &str = "Agent initialization succeeded but agent not found";
const VOICE_NOT_INITIALIZED: &str = "Agent not initialized. Please try again.";

type SharedInstances = Arc<Mutex<InstanceMap>>;

/// Read-only directory view over the manager's instance map.
///
/// Holds a weak reference so agents never keep the map alive.
struct ManagerDirectory {
    instances: Weak<Mutex<InstanceMap>>,
}

#[async_trait]
impl AgentDirectory for ManagerDirectory {
    async fn tenant_agents(&self, tenant_id: &str) -> Vec<AgentInfo> {
        match self.instances.upgrade() {
            Some(instances) => instances.lock().await.tenant_snapshots(tenant_id),
            None => Vec::new(),
        }
    }
}

/// Single authority over which agent instances exist.
pub struct AgentManager {
    registry: Arc<AgentRegistry>,
    config: Arc<dyn ConfigProvider>,
    sink: Arc<dyn EventSink>,
    instances: SharedInstances,
}

impl AgentManager {
    /// Create a manager.
    ///
    /// # Arguments
    ///
    /// * `registry` - Constructors for every supported agent number
    /// * `config` - Supplies configuration when a caller provides none
    /// * `sink` - Receives every instance's events, scoped by tenant
    pub fn new(
        registry: Arc<AgentRegistry>,
        config: Arc<dyn ConfigProvider>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            registry,
            config,
            sink,
            instances: Arc::new(Mutex::new(InstanceMap::new())),
        }
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    /// Create and initialize the instance for `(tenant_id, agent_number)`.
    ///
    /// Returns `true` if the instance exists afterwards. An already existing
    /// instance is left untouched. Without `config`, the configuration
    /// provider is consulted.
    pub async fn initialize_agent(
        &self,
        tenant_id: &str,
        agent_number: u32,
        config: Option<AgentConfig>,
    ) -> bool {
        let key = InstanceKey::new(tenant_id, agent_number);

        if self.instances.lock().await.contains(&key) {
            info!(tenant = %tenant_id, agent_number, "Agent already initialized");
            return true;
        }

        let mut agent = match self.registry.create(agent_number) {
            Ok(agent) => agent,
            Err(e) => {
                error!(tenant = %tenant_id, agent_number, error = %e, "Failed to create agent");
                return false;
            }
        };

        let config = match config {
            Some(config) => config,
            None => match self.config.load(tenant_id, agent_number).await {
                Ok(config) => config,
                Err(e) => {
                    error!(tenant = %tenant_id, agent_number, error = %e, "Failed to load agent configuration");
                    return false;
                }
            },
        };

        let (events, outbox) = EventEmitter::channel();
        agent.attach(AgentLink {
            tenant_id: tenant_id.to_string(),
            events,
            directory: Arc::new(ManagerDirectory {
                instances: Arc::downgrade(&self.instances),
            }),
        });

        if let Err(e) = agent.initialize(config).await {
            error!(
                tenant = %tenant_id,
                agent_number,
                agent = %agent.descriptor().name,
                error = %e,
                "Failed to initialize agent"
            );
            return false;
        }

        let name = agent.descriptor().name;
        let info = agent.info();
        let state = agent.watch_state();
        let handle: AgentHandle = Arc::new(Mutex::new(agent));
        let entry = InstanceEntry::new(Arc::clone(&handle), info, state);

        let inserted = self.instances.lock().await.insert(key.clone(), entry);
        match inserted {
            Ok(()) => {
                self.spawn_forwarder(key, outbox);
                info!(tenant = %tenant_id, agent_number, agent = %name, "Agent registered");
            }
            Err(_) => {
                // A concurrent initialization won; discard this instance.
                debug!(tenant = %tenant_id, agent_number, "Discarding duplicate agent instance");
                if let Err(e) = handle.lock().await.cleanup().await {
                    warn!(tenant = %tenant_id, agent_number, error = %e, "Duplicate agent cleanup failed");
                }
            }
        }
        true
    }

    /// Execute `command`, bootstrapping the instance on first use.
    pub async fn execute_command(&self, tenant_id: &str, agent_number: u32, command: Command) -> Response {
        let key = InstanceKey::new(tenant_id, agent_number);

        let mut handle = self.handle(&key).await;
        if handle.is_none() {
            debug!(tenant = %tenant_id, agent_number, "Lazily initializing agent");
            if !self.initialize_agent(tenant_id, agent_number, None).await {
                return failure(LAZY_INIT_FAILED, agent_number);
            }
            handle = self.handle(&key).await;
        }

        let Some(handle) = handle else {
            warn!(tenant = %tenant_id, agent_number, "Agent vanished after initialization");
            return failure(LAZY_INIT_MISSING, agent_number);
        };

        let action = command.action.clone();
        let result = handle.lock().await.execute(command).await;
        match result {
            Ok(response) => {
                debug!(
                    tenant = %tenant_id,
                    agent_number,
                    action = %action,
                    success = response.success,
                    "Command executed"
                );
                response
            }
            Err(e) => {
                error!(tenant = %tenant_id, agent_number, action = %action, error = %e, "Command rejected");
                failure(&e.to_string(), agent_number)
            }
        }
    }

    /// Resolve `text` against an already initialized instance.
    pub async fn process_voice_command(&self, tenant_id: &str, agent_number: u32, text: &str) -> String {
        let key = InstanceKey::new(tenant_id, agent_number);

        let Some(handle) = self.handle(&key).await else {
            warn!(tenant = %tenant_id, agent_number, "Voice command for uninitialized agent");
            return VOICE_NOT_INITIALIZED.to_string();
        };

        let reply = handle.lock().await.process_voice_command(text).await;
        reply
    }

    /// Clean up and remove one instance. Returns whether it existed.
    pub async fn shutdown_agent(&self, tenant_id: &str, agent_number: u32) -> bool {
        let key = InstanceKey::new(tenant_id, agent_number);

        let removed = self.instances.lock().await.remove(&key);
        let Some(entry) = removed else {
            debug!(tenant = %tenant_id, agent_number, "No agent to shut down");
            return false;
        };

        let result = entry.handle().lock().await.cleanup().await;
        match result {
            Ok(()) => info!(tenant = %tenant_id, agent_number, "Agent shut down"),
            Err(e) => error!(tenant = %tenant_id, agent_number, error = %e, "Agent cleanup failed"),
        }
        true
    }

    /// Clean up and remove every instance concurrently.
    ///
    /// All cleanups run to completion; failures are logged. Returns the
    /// number of instances removed.
    pub async fn shutdown_all_agents(&self) -> usize {
        let drained = self.instances.lock().await.drain();
        let count = drained.len();

        let mut cleanups = JoinSet::new();
        for (key, entry) in drained {
            let handle = entry.handle();
            cleanups.spawn(async move {
                let result = handle.lock().await.cleanup().await;
                (key, result)
            });
        }

        let mut failures = 0usize;
        while let Some(joined) = cleanups.join_next().await {
            match joined {
                Ok((key, Ok(()))) => debug!(instance = %key, "Agent shut down"),
                Ok((key, Err(e))) => {
                    failures += 1;
                    error!(instance = %key, error = %e, "Agent cleanup failed");
                }
                Err(e) => {
                    failures += 1;
                    error!(error = %e, "Agent cleanup task panicked");
                }
            }
        }

        info!(count, failures, "All agents shut down");
        count
    }

    pub async fn get_agent_info(&self, tenant_id: &str, agent_number: u32) -> Option<AgentInfo> {
        let key = InstanceKey::new(tenant_id, agent_number);
        self.instances.lock().await.get(&key).map(InstanceEntry::snapshot)
    }

    pub async fn get_tenant_agents(&self, tenant_id: &str) -> Vec<AgentInfo> {
        self.instances.lock().await.tenant_snapshots(tenant_id)
    }

    pub async fn instance_count(&self) -> usize {
        self.instances.lock().await.len()
    }

    /// Clone the instance handle, releasing the map lock before returning.
    async fn handle(&self, key: &InstanceKey) -> Option<AgentHandle> {
        self.instances.lock().await.handle(key)
    }

    fn spawn_forwarder(&self, key: InstanceKey, mut outbox: UnboundedReceiver<AgentEvent>) {
        let sink = Arc::clone(&self.sink);
        let instances = Arc::downgrade(&self.instances);

        tokio::spawn(async move {
            while let Some(event) = outbox.recv().await {
                forward_event(&key, event, sink.as_ref(), &instances).await;
            }
            debug!(instance = %key, "Event forwarder stopped");
        });
    }
}

fn failure(message: &str, agent_number: u32) -> Response {
    Response::failure(message).with_metadata(ResponseMetadata {
        agent_number: Some(agent_number),
        ..ResponseMetadata::default()
    })
}

async fn forward_event(
    key: &InstanceKey,
    event: AgentEvent,
    sink: &dyn EventSink,
    instances: &Weak<Mutex<InstanceMap>>,
) {
    match event {
        AgentEvent::Status(_) => sink.publish(TenantEvent::new(key.tenant_id.clone(), event)),
        AgentEvent::Error(ref fault) => {
            error!(
                tenant = %key.tenant_id,
                agent = %fault.agent_name,
                message = %fault.message,
                "Agent reported an error"
            );
            sink.publish(TenantEvent::new(key.tenant_id.clone(), event));
        }
        AgentEvent::Message(message) => {
            sink.publish(TenantEvent::new(
                key.tenant_id.clone(),
                AgentEvent::Message(message.clone()),
            ));
            deliver_message(key, message, sink, instances).await;
        }
    }
}

async fn resolve_target(
    instances: &Weak<Mutex<InstanceMap>>,
    tenant_id: &str,
    name: &str,
) -> Option<(InstanceKey, AgentHandle)> {
    let instances = instances.upgrade()?;
    let map = instances.lock().await;
    map.resolve_name(tenant_id, name)
}

/// Hand a message to the named agent of the sender's tenant.
///
/// Messages are not queued: with no live recipient, an `error` event is
/// published to the tenant instead.
async fn deliver_message(
    key: &InstanceKey,
    message: AgentMessage,
    sink: &dyn EventSink,
    instances: &Weak<Mutex<InstanceMap>>,
) {
    match resolve_target(instances, &key.tenant_id, &message.to).await {
        Some((target, handle)) => {
            debug!(from = %key, to = %target, action = ?message.action(), "Delivering agent message");
            handle.lock().await.receive_message(message).await;
        }
        None => {
            warn!(
                tenant = %key.tenant_id,
                from = %message.from,
                to = %message.to,
                "Undeliverable agent message"
            );
            sink.publish(TenantEvent::new(
                key.tenant_id.clone(),
                AgentEvent::Error(AgentFault {
                    agent_number: key.agent_number,
                    agent_name: message.from.clone(),
                    message: format!(
                        "Message to '{}' undeliverable: no live agent with that name",
                        message.to
                    ),
                    timestamp: Utc::now(),
                }),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::implementations::MockBehavior;
    use crate::config::StaticConfigProvider;
    use crate::events::NullSink;
    use ah_protocol::agent_models::AgentState;
    use serde_json::json;

    fn mock_manager() -> AgentManager {
        let mut registry = AgentRegistry::builtin();
        registry
            .register_behavior(|| MockBehavior::named(900, "Mock Agent"))
            .unwrap();
        registry
            .register_behavior(|| MockBehavior::named(901, "Strict Agent").require("api_key"))
            .unwrap();
        AgentManager::new(
            Arc::new(registry),
            Arc::new(StaticConfigProvider::new()),
            Arc::new(NullSink),
        )
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let manager = mock_manager();

        assert!(manager.initialize_agent("t1", 900, None).await);
        assert!(manager.initialize_agent("t1", 900, None).await);
        assert_eq!(manager.instance_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_agent_type_returns_false() {
        let manager = mock_manager();
        assert!(!manager.initialize_agent("t1", 404, None).await);
        assert_eq!(manager.instance_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_initialize_leaves_no_instance() {
        let manager = mock_manager();
        assert!(!manager.initialize_agent("t1", 901, None).await);
        assert!(manager.get_agent_info("t1", 901).await.is_none());

        let mut config = AgentConfig::new();
        config.insert("api_key".to_string(), json!("k"));
        assert!(manager.initialize_agent("t1", 901, Some(config)).await);
    }

    #[tokio::test]
    async fn test_lazy_bootstrap_failure_is_response() {
        let manager = mock_manager();
        let response = manager
            .execute_command("t1", 901, Command::new("echo", "t1"))
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some(LAZY_INIT_FAILED));
        assert_eq!(response.metadata.unwrap().agent_number, Some(901));
    }

    #[tokio::test]
    async fn test_voice_requires_initialized_agent() {
        let manager = mock_manager();
        assert_eq!(
            manager.process_voice_command("t1", 900, "say hi").await,
            VOICE_NOT_INITIALIZED
        );
        assert_eq!(manager.instance_count().await, 0);

        manager.initialize_agent("t1", 900, None).await;
        assert_eq!(manager.process_voice_command("t1", 900, "say hi").await, "hi");
    }

    #[tokio::test]
    async fn test_shutdown_agent_removes_instance() {
        let manager = mock_manager();
        manager.initialize_agent("t1", 900, None).await;

        assert!(manager.shutdown_agent("t1", 900).await);
        assert!(manager.get_agent_info("t1", 900).await.is_none());
        assert!(!manager.shutdown_agent("t1", 900).await);
    }

    #[tokio::test]
    async fn test_info_snapshot_tracks_state() {
        let manager = mock_manager();
        manager.initialize_agent("t1", 900, None).await;

        let info = manager.get_agent_info("t1", 900).await.unwrap();
        assert!(info.is_initialized);
        assert_eq!(info.state, AgentState::Idle);
        assert_eq!(info.command_patterns.len(), 2);
    }
}
