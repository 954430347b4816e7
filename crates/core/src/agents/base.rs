//! Base Agent trait and supporting types.
//!
//! [`Agent`] is the object-safe contract the manager drives. Concrete agent
//! types do not implement it directly; they implement [`AgentBehavior`] and
//! are wrapped in [`BaseAgent`](crate::agents::lifecycle::BaseAgent), which
//! owns the lifecycle, the pattern matcher, the memory store and the event
//! outbox.

use crate::agents::context::{AgentContext, AgentLink};
use ah_protocol::agent_models::{AgentConfig, AgentDescriptor, AgentInfo, AgentState, CommandPattern};
use ah_protocol::command_models::{Command, Response};
use ah_protocol::event_models::AgentMessage;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("Agent already initialized: {0}")]
    AlreadyInitialized(String),
    #[error("Agent not initialized: {0}")]
    NotInitialized(String),
    #[error("Agent destroyed: {0}")]
    Destroyed(String),
    #[error("Invalid command pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("Agent setup failed: {0}")]
    SetupFailed(String),
    #[error("Agent cleanup failed: {0}")]
    CleanupFailed(String),
    #[error("No agent registered for agent number {0}")]
    UnknownAgentType(u32),
}

/// A live, stateful agent instance.
///
/// Implementations are not required to support overlapping calls; every
/// mutating method takes `&mut self` and the manager serializes access.
#[async_trait]
pub trait Agent: Send + Sync {
    fn descriptor(&self) -> AgentDescriptor;

    fn state(&self) -> AgentState;

    /// Observe state changes without borrowing the agent.
    fn watch_state(&self) -> watch::Receiver<AgentState>;

    /// Connect the agent to its tenant, outbox and directory.
    ///
    /// Called by the manager before `initialize` so setup-time events are
    /// not lost.
    fn attach(&mut self, link: AgentLink);

    async fn initialize(&mut self, config: AgentConfig) -> Result<(), AgentError>;

    /// Run one command.
    ///
    /// Handler failures and unknown actions are reported inside the
    /// `Response`. `Err` is reserved for lifecycle violations.
    async fn execute(&mut self, command: Command) -> Result<Response, AgentError>;

    async fn process_voice_command(&mut self, text: &str) -> String;

    /// Deliver a message sent by another agent of the same tenant.
    async fn receive_message(&mut self, message: AgentMessage);

    async fn cleanup(&mut self) -> Result<(), AgentError>;

    fn save_memory(&mut self, key: &str, value: Value, ttl: Option<Duration>);

    fn get_memory(&mut self, key: &str) -> Option<Value>;

    fn info(&self) -> AgentInfo;
}

/// Domain behavior of one agent type.
///
/// `Action` is the closed set of commands the type understands. It is
/// deserialized from `Command::action`, so a unit-variant enum with
/// `#[serde(rename_all = "snake_case")]` maps `"get_revenue"` to
/// `Action::GetRevenue`.
#[async_trait]
pub trait AgentBehavior: Send + Sync + 'static {
    type Action: DeserializeOwned + Send + Debug;

    fn descriptor(&self) -> AgentDescriptor;

    /// Reject configurations with missing or malformed keys.
    fn validate_config(&self, _config: &AgentConfig) -> Result<(), AgentError> {
        Ok(())
    }

    fn command_patterns(&self) -> Vec<CommandPattern>;

    async fn setup(
        &mut self,
        _config: &AgentConfig,
        _context: &mut AgentContext,
    ) -> anyhow::Result<()> {
        Ok(())
    }

    async fn handle(
        &mut self,
        action: Self::Action,
        command: &Command,
        context: &mut AgentContext,
    ) -> anyhow::Result<Value>;

    fn resources_used(&self) -> Vec<String> {
        Vec::new()
    }

    /// Agent-specific voice phrasing. `None` falls back to the generic
    /// formatter.
    fn format_voice_response(&self, _response: &Response) -> Option<String> {
        None
    }

    async fn on_message(&mut self, _message: &AgentMessage, _context: &mut AgentContext) {}

    async fn teardown(&mut self, _context: &mut AgentContext) -> anyhow::Result<()> {
        Ok(())
    }
}
