//! Mock agent implementation for testing.

use crate::agents::base::{AgentBehavior, AgentError};
use crate::agents::context::AgentContext;
use ah_protocol::agent_models::{AgentConfig, AgentDescriptor, CommandPattern};
use ah_protocol::command_models::{Command, Response};
use ah_protocol::event_models::AgentMessage;
use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockAction {
    Echo,
    Fail,
    Remember,
    Recall,
    Send,
    Inbox,
    Sleep,
}

/// Configurable in-memory agent used to exercise the lifecycle and manager.
///
/// Actions:
/// - `echo`: returns `{"echo": text}` from `text` or `param1`
/// - `fail`: always fails with `mock failure`
/// - `remember` / `recall`: memory round trip (`key`, `value`, `ttl_ms`)
/// - `send`: sends `{"action": action}` to the agent named `to`
/// - `inbox`: lists the actions of the messages received so far
/// - `sleep`: waits `ms` milliseconds, then reports the config it was given
#[derive(Debug, Clone)]
pub struct MockBehavior {
    descriptor: AgentDescriptor,
    required_keys: Vec<String>,
    fail_teardown: bool,
    teardowns: Option<Arc<AtomicUsize>>,
    config: AgentConfig,
    inbox: Vec<AgentMessage>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self::new(AgentDescriptor::new(900, "Mock Agent", "In-memory agent for tests"))
    }
}

impl MockBehavior {
    pub fn new(descriptor: AgentDescriptor) -> Self {
        Self {
            descriptor,
            required_keys: Vec::new(),
            fail_teardown: false,
            teardowns: None,
            config: AgentConfig::new(),
            inbox: Vec::new(),
        }
    }

    pub fn named(agent_number: u32, name: &str) -> Self {
        Self::new(AgentDescriptor::new(agent_number, name, "In-memory agent for tests"))
    }

    /// Make `key` mandatory in the initialization config.
    pub fn require(mut self, key: &str) -> Self {
        self.required_keys.push(key.to_string());
        self
    }

    pub fn failing_teardown(mut self) -> Self {
        self.fail_teardown = true;
        self
    }

    /// Bump `counter` every time teardown runs, whether or not it fails.
    pub fn count_teardowns(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.teardowns = Some(counter);
        self
    }
}

#[async_trait]
impl AgentBehavior for MockBehavior {
    type Action = MockAction;

    fn descriptor(&self) -> AgentDescriptor {
        self.descriptor.clone()
    }

    fn validate_config(&self, config: &AgentConfig) -> Result<(), AgentError> {
        match self.required_keys.iter().find(|key| !config.contains_key(*key)) {
            Some(key) => Err(AgentError::ConfigInvalid(format!(
                "missing required key '{key}'"
            ))),
            None => Ok(()),
        }
    }

    fn command_patterns(&self) -> Vec<CommandPattern> {
        vec![
            CommandPattern::new("echo", &["say (\\w+)"]).with_description("Echo a word"),
            CommandPattern::new("fail", &["trigger failure"]),
        ]
    }

    async fn setup(&mut self, config: &AgentConfig, _context: &mut AgentContext) -> anyhow::Result<()> {
        self.config = config.clone();
        Ok(())
    }

    async fn handle(
        &mut self,
        action: MockAction,
        command: &Command,
        context: &mut AgentContext,
    ) -> anyhow::Result<Value> {
        match action {
            MockAction::Echo => {
                let text = command
                    .str_parameter("text")
                    .or_else(|| command.str_parameter("param1"))
                    .unwrap_or_default();
                Ok(json!({ "echo": text }))
            }
            MockAction::Fail => bail!("mock failure"),
            MockAction::Remember => {
                let key = command
                    .str_parameter("key")
                    .ok_or_else(|| anyhow!("missing parameter 'key'"))?;
                let value = command.parameters.get("value").cloned().unwrap_or(Value::Null);
                let ttl = command
                    .parameters
                    .get("ttl_ms")
                    .and_then(Value::as_u64)
                    .map(Duration::from_millis);
                context.save_memory(key, value, ttl);
                Ok(json!({ "stored": key }))
            }
            MockAction::Recall => {
                let key = command
                    .str_parameter("key")
                    .ok_or_else(|| anyhow!("missing parameter 'key'"))?;
                Ok(json!({ "value": context.get_memory(key) }))
            }
            MockAction::Send => {
                let to = command
                    .str_parameter("to")
                    .ok_or_else(|| anyhow!("missing parameter 'to'"))?;
                let action = command.str_parameter("action").unwrap_or("ping");
                let queued = context.send_message(to, json!({ "action": action }));
                Ok(json!({ "queued": queued }))
            }
            MockAction::Inbox => {
                let actions: Vec<Value> = self
                    .inbox
                    .iter()
                    .map(|message| json!({ "from": message.from, "action": message.action() }))
                    .collect();
                Ok(json!({ "messages": actions }))
            }
            MockAction::Sleep => {
                let ms = command
                    .parameters
                    .get("ms")
                    .and_then(Value::as_u64)
                    .unwrap_or(10);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(json!({ "config": self.config }))
            }
        }
    }

    fn resources_used(&self) -> Vec<String> {
        vec!["mock".to_string()]
    }

    fn format_voice_response(&self, response: &Response) -> Option<String> {
        if !response.success {
            return None;
        }
        response
            .data
            .as_ref()
            .and_then(|data| data.get("echo"))
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    async fn on_message(&mut self, message: &AgentMessage, _context: &mut AgentContext) {
        self.inbox.push(message.clone());
    }

    async fn teardown(&mut self, _context: &mut AgentContext) -> anyhow::Result<()> {
        self.inbox.clear();
        if let Some(counter) = &self.teardowns {
            counter.fetch_add(1, Ordering::SeqCst);
        }
        if self.fail_teardown {
            bail!("mock teardown failure");
        }
        Ok(())
    }
}
