//! The live instance map owned by the agent manager.
//!
//! Instances are keyed by `(tenant, agent number)`. A second index maps
//! `(tenant, display name)` to the same key so inter-agent messages resolve
//! without scanning.

use crate::agents::base::Agent;
use ah_protocol::agent_models::{AgentInfo, AgentState};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Shared, serialized access to one agent instance.
pub type AgentHandle = Arc<Mutex<Box<dyn Agent>>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceKey {
    pub tenant_id: String,
    pub agent_number: u32,
}

impl InstanceKey {
    pub fn new(tenant_id: impl Into<String>, agent_number: u32) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            agent_number,
        }
    }
}

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.agent_number)
    }
}

pub struct InstanceEntry {
    handle: AgentHandle,
    info: AgentInfo,
    state: watch::Receiver<AgentState>,
}

impl InstanceEntry {
    /// `info` is captured after initialization; state is tracked live.
    pub fn new(handle: AgentHandle, info: AgentInfo, state: watch::Receiver<AgentState>) -> Self {
        Self { handle, info, state }
    }

    pub fn handle(&self) -> AgentHandle {
        Arc::clone(&self.handle)
    }

    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Current info without locking the agent.
    pub fn snapshot(&self) -> AgentInfo {
        let state = *self.state.borrow();
        AgentInfo {
            state,
            is_initialized: state.is_initialized(),
            ..self.info.clone()
        }
    }
}

impl fmt::Debug for InstanceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceEntry")
            .field("info", &self.info)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct InstanceMap {
    entries: HashMap<InstanceKey, InstanceEntry>,
    names: HashMap<(String, String), InstanceKey>,
}

impl InstanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &InstanceKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a new instance. An occupied key hands the entry back.
    pub fn insert(&mut self, key: InstanceKey, entry: InstanceEntry) -> Result<(), InstanceEntry> {
        if self.entries.contains_key(&key) {
            return Err(entry);
        }
        self.names
            .entry((key.tenant_id.clone(), entry.name().to_string()))
            .or_insert_with(|| key.clone());
        self.entries.insert(key, entry);
        Ok(())
    }

    pub fn remove(&mut self, key: &InstanceKey) -> Option<InstanceEntry> {
        let entry = self.entries.remove(key)?;
        let name_key = (key.tenant_id.clone(), entry.name().to_string());
        if self.names.get(&name_key) == Some(key) {
            self.names.remove(&name_key);
        }
        Some(entry)
    }

    pub fn get(&self, key: &InstanceKey) -> Option<&InstanceEntry> {
        self.entries.get(key)
    }

    pub fn handle(&self, key: &InstanceKey) -> Option<AgentHandle> {
        self.entries.get(key).map(InstanceEntry::handle)
    }

    /// Resolve a display name within one tenant.
    pub fn resolve_name(&self, tenant_id: &str, name: &str) -> Option<(InstanceKey, AgentHandle)> {
        let key = self.names.get(&(tenant_id.to_string(), name.to_string()))?;
        let handle = self.handle(key)?;
        Some((key.clone(), handle))
    }

    /// Snapshots of one tenant's instances, ordered by agent number.
    pub fn tenant_snapshots(&self, tenant_id: &str) -> Vec<AgentInfo> {
        let mut snapshots: Vec<AgentInfo> = self
            .entries
            .iter()
            .filter(|(key, _)| key.tenant_id == tenant_id)
            .map(|(_, entry)| entry.snapshot())
            .collect();
        snapshots.sort_by_key(|info| info.agent_number);
        snapshots
    }

    /// Remove and return every instance.
    pub fn drain(&mut self) -> Vec<(InstanceKey, InstanceEntry)> {
        self.names.clear();
        self.entries.drain().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
