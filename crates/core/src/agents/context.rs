//! Per-instance runtime context handed to agent behaviors.

use crate::agents::memory::MemoryStore;
use crate::events::EventEmitter;
use ah_protocol::agent_models::{AgentDescriptor, AgentInfo};
use ah_protocol::event_models::{AgentEvent, AgentMessage, AgentStatus, StatusUpdate};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Read-only view of the live agents of a tenant.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn tenant_agents(&self, tenant_id: &str) -> Vec<AgentInfo>;
}

/// Everything the manager wires into an instance before initializing it.
#[derive(Clone)]
pub struct AgentLink {
    pub tenant_id: String,
    pub events: EventEmitter,
    pub directory: Arc<dyn AgentDirectory>,
}

impl fmt::Debug for AgentLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentLink")
            .field("tenant_id", &self.tenant_id)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

pub struct AgentContext {
    descriptor: AgentDescriptor,
    tenant_id: Option<String>,
    memory: MemoryStore,
    events: EventEmitter,
    directory: Option<Arc<dyn AgentDirectory>>,
}

impl AgentContext {
    pub fn new(descriptor: AgentDescriptor) -> Self {
        Self {
            descriptor,
            tenant_id: None,
            memory: MemoryStore::new(),
            events: EventEmitter::detached(),
            directory: None,
        }
    }

    pub fn attach(&mut self, link: AgentLink) {
        self.tenant_id = Some(link.tenant_id);
        self.events = link.events;
        self.directory = Some(link.directory);
    }

    /// Drop the outbox and the directory. Memory is left untouched.
    pub fn detach(&mut self) {
        self.events.detach();
        self.directory = None;
    }

    pub fn descriptor(&self) -> &AgentDescriptor {
        &self.descriptor
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut MemoryStore {
        &mut self.memory
    }

    pub fn save_memory(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) {
        self.memory.save(key, value, ttl);
    }

    pub fn get_memory(&mut self, key: &str) -> Option<Value> {
        self.memory.get(key)
    }

    /// Queue a message for the agent named `to` within the same tenant.
    pub fn send_message(&self, to: impl Into<String>, data: Value) -> bool {
        self.events.emit(AgentEvent::Message(AgentMessage::new(
            self.descriptor.name.clone(),
            to,
            data,
        )))
    }

    pub fn emit_status(&self, status: AgentStatus, details: Option<Value>) -> bool {
        self.events.emit(AgentEvent::Status(StatusUpdate {
            agent_number: self.descriptor.agent_number,
            agent_name: self.descriptor.name.clone(),
            status,
            details,
            timestamp: Utc::now(),
        }))
    }

    /// Live agents of this instance's tenant, as seen by the manager.
    pub async fn active_agents(&self) -> Vec<AgentInfo> {
        match (&self.directory, &self.tenant_id) {
            (Some(directory), Some(tenant_id)) => directory.tenant_agents(tenant_id).await,
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for AgentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentContext")
            .field("descriptor", &self.descriptor)
            .field("tenant_id", &self.tenant_id)
            .field("memory_entries", &self.memory.len())
            .field("attached", &self.events.is_attached())
            .finish()
    }
}
