//! Command and response models.
//!
//! A [`Command`] is a structured action request routed to exactly one agent
//! instance; the agent answers with a [`Response`]. Both shapes are what the
//! transport layer sends and receives:
//!
//! ```json
//! { "action": "get_revenue", "parameters": {}, "context": {},
//!   "userId": "u-1", "requestId": "req-42", "timestamp": "2024-06-01T12:00:00Z" }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use ts_rs::TS;
use uuid::Uuid;

/// A structured action request.
///
/// `request_id` must be unique per call for correlation and `timestamp`
/// must be set before dispatch; agents use it to report end-to-end latency.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    /// Name of the action to dispatch.
    pub action: String,

    /// Action parameters.
    #[serde(default)]
    pub parameters: HashMap<String, Value>,

    /// Free-form context (e.g. the spoken text of a voice command).
    #[serde(default)]
    pub context: HashMap<String, Value>,

    /// The authenticated caller.
    pub user_id: String,

    /// Correlation id, unique per call.
    pub request_id: String,

    /// When the command was created.
    pub timestamp: DateTime<Utc>,
}

impl Command {
    /// Create a command with a fresh request id and the current timestamp.
    pub fn new(action: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            parameters: HashMap::new(),
            context: HashMap::new(),
            user_id: user_id.into(),
            request_id: format!("req-{}", Uuid::new_v4()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(key.into(), value);
        self
    }

    pub fn with_parameters(mut self, parameters: HashMap<String, Value>) -> Self {
        self.parameters.extend(parameters);
        self
    }

    pub fn with_context(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context.insert(key.into(), value);
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    /// Look up a string parameter.
    pub fn str_parameter(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }
}

/// Execution details attached to a [`Response`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default, TS)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    /// Wall-clock time spent inside the agent's `execute`.
    pub execution_time_ms: u64,

    /// External resources touched while executing.
    #[serde(default)]
    pub resources_used: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_suggested_actions: Option<Vec<String>>,

    /// The agent type that produced the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_number: Option<u32>,

    /// Time from `command.timestamp` to completion, including queueing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_to_end_ms: Option<u64>,
}

/// Result of executing a command.
///
/// Exactly one of `data`/`error` is meaningful, gated by `success`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl Response {
    /// A successful response carrying `data`.
    pub fn ok(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
        }
    }

    /// A failed response carrying an error message.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: ResponseMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}
