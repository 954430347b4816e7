//! Agent identity and configuration models.
//!
//! An agent *type* is identified by its [`AgentDescriptor`]; a running agent
//! for one tenant is described to callers through an [`AgentInfo`] snapshot.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ts_rs::TS;

/// Opaque key/value configuration supplied to an agent at initialization.
///
/// Each concrete agent validates the keys it cares about.
pub type AgentConfig = HashMap<String, Value>;

/// Identity of an agent type.
///
/// The `agent_number` is unique within the registry. Descriptors are
/// immutable once registered.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(rename_all = "camelCase")]
pub struct AgentDescriptor {
    /// Positive identifier of the agent type.
    pub agent_number: u32,

    /// Human-readable display name.
    ///
    /// Also used as the address for inter-agent messages.
    pub name: String,

    /// Short description of what the agent does.
    pub description: String,
}

impl AgentDescriptor {
    pub fn new(agent_number: u32, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            agent_number,
            name: name.into(),
            description: description.into(),
        }
    }
}

/// A free-text pattern group mapped to one agent action.
///
/// Every entry in `patterns` is a regular expression; multiple patterns
/// may map to the same action (synonyms). Declared once during agent
/// initialization and read-only afterwards.
///
/// # Example
///
/// ```json
/// {
///   "patterns": ["revenue for (.*)", "income in (.*)"],
///   "action": "get_revenue_period",
///   "parameters": {},
///   "description": "Get revenue for specific period"
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct CommandPattern {
    /// Regular expressions tried in list order.
    pub patterns: Vec<String>,

    /// Action name dispatched when any pattern matches.
    pub action: String,

    /// Static parameters merged over the captured ones.
    #[serde(default)]
    pub parameters: HashMap<String, Value>,

    /// Human-readable summary of the command.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CommandPattern {
    /// Create a pattern group for `action` from a list of regex strings.
    pub fn new(action: impl Into<String>, patterns: &[&str]) -> Self {
        Self {
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
            action: action.into(),
            parameters: HashMap::new(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }
}

/// Lifecycle state of one agent instance.
///
/// ```text
/// Uninitialized -> Idle -> Executing -> {Idle, Error}
/// Error -> Idle
/// any -> Destroyed
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Constructed but `initialize` has not completed.
    Uninitialized,

    /// Ready to accept commands.
    Idle,

    /// A command is being executed.
    Executing,

    /// The last command failed; the instance returns to `Idle` once the
    /// failing call completes.
    Error,

    /// Terminal state after `cleanup`.
    Destroyed,
}

impl AgentState {
    /// Whether the instance has been initialized and not yet destroyed.
    pub fn is_initialized(self) -> bool {
        !matches!(self, Self::Uninitialized | Self::Destroyed)
    }
}

/// Read-only snapshot of one live agent instance.
///
/// Contains identity, initialization flag and the declared command
/// patterns, but none of the agent's internal state.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct AgentInfo {
    pub agent_number: u32,
    pub name: String,
    pub description: String,
    pub is_initialized: bool,
    pub state: AgentState,
    pub voice_enabled: bool,
    pub command_patterns: Vec<CommandPattern>,
}
