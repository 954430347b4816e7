//! Generic lifecycle wrapper turning an [`AgentBehavior`] into an [`Agent`].
//!
//! `BaseAgent` enforces the state machine, compiles the behavior's command
//! patterns once at initialization, dispatches actions through the
//! behavior's closed action enum and converts every handler failure into a
//! failed [`Response`].

use crate::agents::base::{Agent, AgentBehavior, AgentError};
use crate::agents::context::{AgentContext, AgentLink};
use crate::agents::patterns::CommandMatcher;
use crate::state::machine::{status_for, StateMachine};
use ah_protocol::agent_models::{AgentConfig, AgentDescriptor, AgentInfo, AgentState};
use ah_protocol::command_models::{Command, Response, ResponseMetadata};
use ah_protocol::event_models::AgentMessage;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, info, warn};

const VOICE_FALLBACK_USER: &str = "voice-user";
const VOICE_ERROR_REPLY: &str =
    "I encountered an error processing your request. Please try again.";

/// Generic voice phrasing for a response.
pub fn default_voice_response(response: &Response) -> String {
    if !response.success {
        return format!(
            "Error: {}",
            response.error.as_deref().unwrap_or("Operation failed")
        );
    }

    match &response.data {
        Some(Value::String(text)) => text.clone(),
        _ => "Operation completed successfully.".to_string(),
    }
}

pub struct BaseAgent<B: AgentBehavior> {
    behavior: B,
    descriptor: AgentDescriptor,
    machine: StateMachine,
    matcher: CommandMatcher,
    context: AgentContext,
}

impl<B: AgentBehavior> BaseAgent<B> {
    pub fn new(behavior: B) -> Self {
        let descriptor = behavior.descriptor();
        Self {
            context: AgentContext::new(descriptor.clone()),
            descriptor,
            behavior,
            machine: StateMachine::new(),
            matcher: CommandMatcher::default(),
        }
    }

    pub fn behavior(&self) -> &B {
        &self.behavior
    }

    fn tenant(&self) -> &str {
        self.context.tenant_id().unwrap_or("-")
    }

    /// Move to `to` and report the new status to listeners.
    fn enter(&self, to: AgentState, details: Option<Value>) {
        match self.machine.transition(to) {
            Ok(_) => {
                if let Some(status) = status_for(to) {
                    self.context.emit_status(status, details);
                }
            }
            Err(e) => warn!(
                tenant = %self.tenant(),
                agent = %self.descriptor.name,
                "{e}"
            ),
        }
    }

    fn ensure_ready(&self) -> Result<(), AgentError> {
        match self.machine.current() {
            AgentState::Uninitialized => Err(AgentError::NotInitialized(self.descriptor.name.clone())),
            AgentState::Destroyed => Err(AgentError::Destroyed(self.descriptor.name.clone())),
            _ => Ok(()),
        }
    }

    async fn dispatch(&mut self, command: &Command) -> Result<Value, String> {
        let action = serde_json::from_value::<B::Action>(Value::String(command.action.clone()))
            .map_err(|_| format!("Unknown action: {}", command.action))?;

        debug!(
            tenant = %self.tenant(),
            agent = %self.descriptor.name,
            ?action,
            "Dispatching command"
        );

        self.behavior
            .handle(action, command, &mut self.context)
            .await
            .map_err(|e| e.to_string())
    }

    fn metadata(&self, started: Instant, command: &Command) -> ResponseMetadata {
        let end_to_end_ms = (Utc::now() - command.timestamp).num_milliseconds().max(0);

        ResponseMetadata {
            execution_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            resources_used: self.behavior.resources_used(),
            next_suggested_actions: None,
            agent_number: Some(self.descriptor.agent_number),
            end_to_end_ms: u64::try_from(end_to_end_ms).ok(),
        }
    }
}

#[async_trait]
impl<B: AgentBehavior> Agent for BaseAgent<B> {
    fn descriptor(&self) -> AgentDescriptor {
        self.descriptor.clone()
    }

    fn state(&self) -> AgentState {
        self.machine.current()
    }

    fn watch_state(&self) -> watch::Receiver<AgentState> {
        self.machine.subscribe()
    }

    fn attach(&mut self, link: AgentLink) {
        self.context.attach(link);
    }

    async fn initialize(&mut self, config: AgentConfig) -> Result<(), AgentError> {
        match self.machine.current() {
            AgentState::Uninitialized => {}
            AgentState::Destroyed => {
                return Err(AgentError::Destroyed(self.descriptor.name.clone()))
            }
            _ => return Err(AgentError::AlreadyInitialized(self.descriptor.name.clone())),
        }

        self.behavior.validate_config(&config)?;
        let matcher = CommandMatcher::new(self.behavior.command_patterns())?;

        self.behavior
            .setup(&config, &mut self.context)
            .await
            .map_err(|e| AgentError::SetupFailed(e.to_string()))?;

        self.matcher = matcher;
        self.enter(AgentState::Idle, None);

        info!(
            tenant = %self.tenant(),
            agent = %self.descriptor.name,
            agent_number = self.descriptor.agent_number,
            patterns = self.matcher.patterns().len(),
            "Agent initialized"
        );
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> Result<Response, AgentError> {
        let started = Instant::now();
        self.ensure_ready()?;

        self.enter(
            AgentState::Executing,
            Some(json!({ "action": command.action })),
        );

        let response = match self.dispatch(&command).await {
            Ok(data) => {
                self.enter(AgentState::Idle, None);
                Response::ok(data)
            }
            Err(message) => {
                warn!(
                    tenant = %self.tenant(),
                    agent = %self.descriptor.name,
                    action = %command.action,
                    error = %message,
                    "Command execution failed"
                );
                self.enter(AgentState::Error, Some(json!({ "error": &message })));
                self.enter(AgentState::Idle, None);
                Response::failure(message)
            }
        };

        Ok(response.with_metadata(self.metadata(started, &command)))
    }

    async fn process_voice_command(&mut self, text: &str) -> String {
        debug!(
            tenant = %self.tenant(),
            agent = %self.descriptor.name,
            text,
            "Processing voice command"
        );

        let user_id = self
            .context
            .tenant_id()
            .unwrap_or(VOICE_FALLBACK_USER)
            .to_string();

        let Some(command) = self.matcher.to_command(text, &user_id) else {
            return format!(
                "I didn't understand that command. Available commands: {}",
                self.matcher.examples()
            );
        };

        match self.execute(command).await {
            Ok(response) => self
                .behavior
                .format_voice_response(&response)
                .unwrap_or_else(|| default_voice_response(&response)),
            Err(e) => {
                warn!(
                    tenant = %self.tenant(),
                    agent = %self.descriptor.name,
                    error = %e,
                    "Voice command failed"
                );
                VOICE_ERROR_REPLY.to_string()
            }
        }
    }

    async fn receive_message(&mut self, message: AgentMessage) {
        if !self.machine.current().is_initialized() {
            debug!(
                tenant = %self.tenant(),
                agent = %self.descriptor.name,
                from = %message.from,
                "Dropping message for inactive agent"
            );
            return;
        }
        self.behavior.on_message(&message, &mut self.context).await;
    }

    async fn cleanup(&mut self) -> Result<(), AgentError> {
        if self.machine.current() == AgentState::Destroyed {
            return Ok(());
        }

        let teardown = self.behavior.teardown(&mut self.context).await;

        self.context.memory_mut().clear();
        self.enter(AgentState::Destroyed, None);
        self.context.detach();

        info!(
            tenant = %self.tenant(),
            agent = %self.descriptor.name,
            "Agent cleaned up"
        );

        teardown.map_err(|e| AgentError::CleanupFailed(e.to_string()))
    }

    fn save_memory(&mut self, key: &str, value: Value, ttl: Option<Duration>) {
        self.context.save_memory(key, value, ttl);
    }

    fn get_memory(&mut self, key: &str) -> Option<Value> {
        self.context.get_memory(key)
    }

    fn info(&self) -> AgentInfo {
        let state = self.machine.current();
        AgentInfo {
            agent_number: self.descriptor.agent_number,
            name: self.descriptor.name.clone(),
            description: self.descriptor.description.clone(),
            is_initialized: state.is_initialized(),
            state,
            voice_enabled: !self.matcher.is_empty(),
            command_patterns: self.matcher.patterns(),
        }
    }
}
