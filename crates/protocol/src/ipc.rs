//! Transport-facing communication protocol.
//!
//! This module defines the message types exchanged between the transport
//! layer (WebSocket/HTTP, already authenticated) and the agent host core.
//!
//! The protocol follows an Operation/Result pattern:
//! - `Op`: Requests sent from the transport to the core
//! - `OpResult`: The typed answer to each request
//!
//! Agent events are relayed separately as [`TenantEvent`](crate::TenantEvent)s.
//! Every operation has a well-formed result; agent faults never surface as
//! transport errors.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::agent_models::{AgentConfig, AgentInfo};
use crate::command_models::{Command, Response};

/// Operations sent from the transport to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "executeCommand",
///   "payload": {
///     "tenant_id": "user-1",
///     "agent_number": 1,
///     "command": { "action": "get_revenue", "userId": "user-1", "requestId": "req-1",
///                  "timestamp": "2024-06-01T12:00:00Z" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Create and initialize an agent instance for a tenant.
    ///
    /// Without a `config`, the host asks its configuration collaborator.
    InitializeAgent {
        tenant_id: String,
        agent_number: u32,
        #[serde(default)]
        config: Option<AgentConfig>,
    },

    /// Execute a command, initializing the instance on demand.
    ExecuteCommand {
        tenant_id: String,
        agent_number: u32,
        command: Command,
    },

    /// Resolve free text against an initialized instance and execute it.
    ProcessVoiceCommand {
        tenant_id: String,
        agent_number: u32,
        text: String,
    },

    /// Tear down one instance.
    ShutdownAgent { tenant_id: String, agent_number: u32 },

    /// Request a snapshot of one instance.
    GetAgentInfo { tenant_id: String, agent_number: u32 },

    /// Request snapshots of every instance owned by a tenant.
    GetTenantAgents { tenant_id: String },

    /// Tear down every instance of every tenant.
    Shutdown,
}

/// Results sent from the core back to the transport.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum OpResult {
    Initialized { agent_number: u32, success: bool },

    CommandResponse { agent_number: u32, response: Response },

    VoiceReply { agent_number: u32, text: String },

    AgentShutdown { agent_number: u32 },

    AgentInfo { info: Option<AgentInfo> },

    TenantAgents { agents: Vec<AgentInfo> },

    ShutdownComplete,
}
