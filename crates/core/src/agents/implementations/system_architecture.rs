//! System Architecture agent (#31).
//!
//! Watches the inter-agent messages delivered to it and reports the tenant's
//! live agents, the observed communication paths and a Mermaid diagram of
//! both.

use crate::agents::agent_type::{number_for_name, AgentKind};
use crate::agents::base::{AgentBehavior, AgentError};
use crate::agents::context::AgentContext;
use ah_protocol::agent_models::{AgentConfig, AgentDescriptor, AgentInfo, CommandPattern};
use ah_protocol::command_models::{Command, Response};
use ah_protocol::event_models::AgentMessage;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::time::Instant;

const DEFAULT_MESSAGE_LOG_LIMIT: usize = 1000;
const RECENT_FLOW_LEN: usize = 20;
const TOP_FLOW_PATTERNS: usize = 5;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureAction {
    GetDiagram,
    GetMetrics,
    GetConnections,
    GetDataFlow,
    GetActiveAgents,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoggedMessage {
    from: String,
    to: String,
    action: Option<String>,
    timestamp: DateTime<Utc>,
}

#[derive(Debug)]
pub struct SystemArchitecture {
    message_log_limit: usize,
    connections: Vec<Connection>,
    message_log: VecDeque<LoggedMessage>,
    total_messages: u64,
    started: Instant,
}

impl Default for SystemArchitecture {
    fn default() -> Self {
        Self {
            message_log_limit: DEFAULT_MESSAGE_LOG_LIMIT,
            connections: Vec::new(),
            message_log: VecDeque::new(),
            total_messages: 0,
            started: Instant::now(),
        }
    }
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}h {minutes}m {secs}s")
}

impl SystemArchitecture {
    pub fn with_message_log_limit(mut self, limit: usize) -> Self {
        self.message_log_limit = limit.max(1);
        self
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }

    fn record(&mut self, message: &AgentMessage) {
        self.message_log.push_back(LoggedMessage {
            from: message.from.clone(),
            to: message.to.clone(),
            action: message.action().map(str::to_string),
            timestamp: message.timestamp,
        });
        while self.message_log.len() > self.message_log_limit {
            self.message_log.pop_front();
        }
        self.total_messages += 1;

        match self
            .connections
            .iter_mut()
            .find(|c| c.from == message.from && c.to == message.to)
        {
            Some(existing) => existing.count += 1,
            None => self.connections.push(Connection {
                from: message.from.clone(),
                to: message.to.clone(),
                kind: "message",
                count: 1,
            }),
        }
    }

    /// The busiest connection; the latest one wins ties.
    fn most_active(&self) -> Option<&Connection> {
        self.connections.iter().fold(None, |best, current| match best {
            Some(best) if best.count > current.count => Some(best),
            _ => Some(current),
        })
    }

    fn connection_map(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for connection in &self.connections {
            let targets = map.entry(connection.from.as_str()).or_default();
            if !targets.contains(&connection.to.as_str()) {
                targets.push(connection.to.as_str());
            }
        }
        map
    }

    /// The most frequent consecutive action pairs in the message log.
    fn flow_patterns(&self) -> Vec<Value> {
        let mut counts: Vec<(String, u64)> = Vec::new();
        let actions: Vec<&str> = self
            .message_log
            .iter()
            .map(|m| m.action.as_deref().unwrap_or("unknown"))
            .collect();

        for pair in actions.windows(2) {
            let pattern = format!("{} -> {}", pair[0], pair[1]);
            match counts.iter_mut().find(|(p, _)| *p == pattern) {
                Some((_, count)) => *count += 1,
                None => counts.push((pattern, 1)),
            }
        }

        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
            .into_iter()
            .take(TOP_FLOW_PATTERNS)
            .map(|(pattern, count)| json!({ "pattern": pattern, "count": count }))
            .collect()
    }

    fn diagram(&self, agents: &[AgentInfo]) -> String {
        let numbers: HashMap<&str, u32> = agents
            .iter()
            .map(|agent| (agent.name.as_str(), agent.agent_number))
            .collect();
        let number_of = |name: &str| {
            numbers
                .get(name)
                .copied()
                .unwrap_or_else(|| number_for_name(name))
        };

        let agent_nodes = agents
            .iter()
            .map(|agent| format!("A{}[{}]", agent.agent_number, agent.name))
            .collect::<Vec<_>>()
            .join("\n      ");

        let agent_edges = self
            .connections
            .iter()
            .map(|c| {
                format!(
                    "A{} -->|{} msgs| A{}",
                    number_of(&c.from),
                    c.count,
                    number_of(&c.to)
                )
            })
            .collect::<Vec<_>>()
            .join("\n    ");

        format!(
            "graph TB
    subgraph Transport
      WS[Transport Layer]
      Auth[Authentication]
    end

    subgraph Core
      AM[Agent Manager]
      Sink[Event Fan-out]
    end

    subgraph Agents
      {agent_nodes}
    end

    WS --> Auth
    Auth --> AM
    AM --> Agents
    Agents --> Sink
    Sink --> WS

    {agent_edges}

    style WS fill:#fbb,stroke:#333,stroke-width:2px
    style AM fill:#bfb,stroke:#333,stroke-width:2px"
        )
    }

    fn metrics(&self, active_agents: usize) -> Value {
        let uptime = self.uptime_secs();
        let messages_per_minute = if uptime >= 60 {
            (self.total_messages as f64 / (uptime as f64 / 60.0)).round() as u64
        } else {
            0
        };

        json!({
            "current": {
                "activeAgents": active_agents,
                "totalMessages": self.total_messages,
                "uptime": uptime,
                "formatted": { "uptime": format_uptime(uptime) },
            },
            "performance": {
                "messagesPerMinute": messages_per_minute,
                "loggedMessages": self.message_log.len(),
            },
        })
    }
}

#[async_trait]
impl AgentBehavior for SystemArchitecture {
    type Action = ArchitectureAction;

    fn descriptor(&self) -> AgentDescriptor {
        AgentKind::SystemArchitecture.descriptor()
    }

    fn validate_config(&self, config: &AgentConfig) -> Result<(), AgentError> {
        match config.get("message_log_limit") {
            Some(limit) if limit.as_u64().filter(|n| *n > 0).is_none() => Err(
                AgentError::ConfigInvalid("message_log_limit must be a positive integer".to_string()),
            ),
            _ => Ok(()),
        }
    }

    fn command_patterns(&self) -> Vec<CommandPattern> {
        vec![
            CommandPattern::new(
                "get_diagram",
                &["show system diagram", "display architecture", "system overview"],
            )
            .with_description("Display system architecture diagram"),
            CommandPattern::new(
                "get_metrics",
                &["system health", "performance metrics", "system status"],
            )
            .with_description("Show system performance metrics"),
            CommandPattern::new(
                "get_connections",
                &["show connections", "agent connections", "communication map"],
            )
            .with_description("Display agent communication paths"),
            CommandPattern::new("get_data_flow", &["show data flow", "trace data", "data pipeline"])
                .with_description("Show how data flows through the system"),
            CommandPattern::new(
                "get_active_agents",
                &["active agents", "running agents", "agent status"],
            )
            .with_description("List all active agents"),
        ]
    }

    async fn setup(&mut self, config: &AgentConfig, _context: &mut AgentContext) -> anyhow::Result<()> {
        if let Some(limit) = config.get("message_log_limit").and_then(Value::as_u64) {
            self.message_log_limit = usize::try_from(limit)?;
        }
        self.started = Instant::now();
        Ok(())
    }

    async fn handle(
        &mut self,
        action: ArchitectureAction,
        _command: &Command,
        context: &mut AgentContext,
    ) -> anyhow::Result<Value> {
        match action {
            ArchitectureAction::GetDiagram => {
                let agents = context.active_agents().await;
                let metrics = self.metrics(agents.len());
                Ok(json!({
                    "diagram": self.diagram(&agents),
                    "type": "mermaid",
                    "metrics": metrics["current"],
                    "timestamp": Utc::now(),
                }))
            }
            ArchitectureAction::GetMetrics => {
                let agents = context.active_agents().await;
                Ok(self.metrics(agents.len()))
            }
            ArchitectureAction::GetConnections => Ok(json!({
                "connections": self.connections,
                "totalConnections": self.connections.len(),
                "mostActive": self.most_active(),
                "connectionMap": self.connection_map(),
            })),
            ArchitectureAction::GetDataFlow => {
                let skip = self.message_log.len().saturating_sub(RECENT_FLOW_LEN);
                let recent: Vec<&LoggedMessage> = self.message_log.iter().skip(skip).collect();
                Ok(json!({
                    "recentFlow": recent,
                    "patterns": self.flow_patterns(),
                }))
            }
            ArchitectureAction::GetActiveAgents => {
                let agents = context.active_agents().await;
                Ok(json!({
                    "count": agents.len(),
                    "agents": agents.iter().map(|agent| json!({
                        "number": agent.agent_number,
                        "name": agent.name,
                        "status": if agent.is_initialized { "active" } else { "inactive" },
                        "voiceEnabled": agent.voice_enabled,
                    })).collect::<Vec<_>>(),
                }))
            }
        }
    }

    fn resources_used(&self) -> Vec<String> {
        vec!["agent_directory".to_string(), "message_log".to_string()]
    }

    fn format_voice_response(&self, response: &Response) -> Option<String> {
        if !response.success {
            return None;
        }
        let data = response.data.as_ref()?;

        if data.get("diagram").is_some() {
            return Some(
                "I've generated the system architecture diagram. You can see how all agents and components are connected."
                    .to_string(),
            );
        }

        if let Some(current) = data.get("current").filter(|c| c.get("activeAgents").is_some()) {
            return Some(format!(
                "System status: {} active agents, {} uptime, {} messages observed.",
                current["activeAgents"],
                current["formatted"]["uptime"].as_str().unwrap_or_default(),
                current["totalMessages"],
            ));
        }

        if data.get("connections").is_some() {
            let mut reply = format!(
                "There are {} agent connections.",
                data["totalConnections"]
            );
            if let Some(most) = data.get("mostActive").filter(|m| !m.is_null()) {
                reply.push_str(&format!(
                    " The most active connection is between {} and {} with {} messages.",
                    most["from"].as_str().unwrap_or_default(),
                    most["to"].as_str().unwrap_or_default(),
                    most["count"],
                ));
            }
            return Some(reply);
        }

        if let Some(agents) = data.get("agents").and_then(Value::as_array) {
            let names: Vec<&str> = agents
                .iter()
                .filter_map(|a| a["name"].as_str())
                .collect();
            return Some(format!(
                "{} agents are currently active: {}.",
                data["count"],
                names.join(", ")
            ));
        }

        Some("System architecture data retrieved successfully.".to_string())
    }

    async fn on_message(&mut self, message: &AgentMessage, _context: &mut AgentContext) {
        self.record(message);
    }

    async fn teardown(&mut self, _context: &mut AgentContext) -> anyhow::Result<()> {
        self.connections.clear();
        self.message_log.clear();
        self.total_messages = 0;
        Ok(())
    }
}
