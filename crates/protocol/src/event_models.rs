//! Events emitted by agents.
//!
//! Events are ephemeral and never persisted. Ordering is FIFO per emitting
//! agent; there is no global ordering across agents.
//!
//! Uses tagged enum serialization for TypeScript compatibility:
//! ```json
//! {
//!   "kind": "status",
//!   "payload": {
//!     "agentNumber": 1,
//!     "agentName": "Business Intelligence",
//!     "status": "executing",
//!     "details": { "action": "get_revenue" },
//!     "timestamp": "2024-06-01T12:00:00Z"
//!   }
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Externally visible execution status carried by status events.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Idle,
    Executing,
    Error,
}

/// A state transition of one agent instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    pub agent_number: u32,
    pub agent_name: String,
    pub status: AgentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    pub timestamp: DateTime<Utc>,
}

/// A message from one agent to another, addressed by display name.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub from: String,
    pub to: String,
    pub data: Value,
    pub timestamp: DateTime<Utc>,
}

impl AgentMessage {
    pub fn new(from: impl Into<String>, to: impl Into<String>, data: Value) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            data,
            timestamp: Utc::now(),
        }
    }

    /// The `action` field of the payload, if the sender supplied one.
    pub fn action(&self) -> Option<&str> {
        self.data.get("action").and_then(Value::as_str)
    }
}

/// A fault reported by or about an agent outside a command response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct AgentFault {
    pub agent_number: u32,
    pub agent_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything an agent can emit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum AgentEvent {
    /// The agent changed state.
    Status(StatusUpdate),

    /// The agent sent a message to another agent.
    Message(AgentMessage),

    /// The agent (or the host on its behalf) reported a fault.
    Error(AgentFault),
}

impl AgentEvent {
    /// Display name of the agent the event originates from.
    pub fn source_agent(&self) -> &str {
        match self {
            Self::Status(update) => &update.agent_name,
            Self::Message(message) => &message.from,
            Self::Error(fault) => &fault.agent_name,
        }
    }

    /// Display name of the addressed agent, for messages.
    pub fn target_agent(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(&message.to),
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Status(update) => update.timestamp,
            Self::Message(message) => message.timestamp,
            Self::Error(fault) => fault.timestamp,
        }
    }
}

/// An agent event scoped to the tenant whose instance produced it.
///
/// This is the unit handed to the fan-out sink.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct TenantEvent {
    pub tenant_id: String,
    pub event: AgentEvent,
}

impl TenantEvent {
    pub fn new(tenant_id: impl Into<String>, event: AgentEvent) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            event,
        }
    }
}
