//! One-shot subcommands: `agents`, `exec` and `voice`.

use ah_core::agents::AgentKind;
use ah_core::AgentHost;
use ah_protocol::command_models::Command;
use ah_protocol::ipc::{Op, OpResult};
use color_eyre::eyre::{bail, eyre, Result};
use colored::Colorize;
use serde_json::Value;

/// Parse a `key=value` parameter. Values that are valid JSON keep their
/// type; anything else becomes a string.
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn list_agents(host: &AgentHost, all: bool) {
    let registry = host.manager().registry().clone();

    for descriptor in registry.descriptors() {
        println!(
            "{:>4}  {}  {}",
            descriptor.agent_number.to_string().bold(),
            descriptor.name.green(),
            descriptor.description.dimmed()
        );
    }

    if all {
        for kind in AgentKind::ALL.iter().filter(|k| !registry.contains(k.number())) {
            println!(
                "{:>4}  {}  {}",
                kind.number().to_string().bold(),
                kind.name().yellow(),
                "(not available)".dimmed()
            );
        }
    }
}

/// Execute one command and print the response as JSON.
///
/// Returns whether the command succeeded.
pub async fn exec(
    host: &AgentHost,
    tenant_id: String,
    agent_number: u32,
    action: String,
    params: Vec<(String, Value)>,
) -> Result<bool> {
    let command = Command::new(action, tenant_id.clone()).with_parameters(params.into_iter().collect());
    let result = host
        .handle(Op::ExecuteCommand {
            tenant_id,
            agent_number,
            command,
        })
        .await;

    let OpResult::CommandResponse { response, .. } = result else {
        return Err(eyre!("Unexpected result for executeCommand: {result:?}"));
    };
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.success)
}

/// Initialize the agent, then resolve `text` as a voice command.
pub async fn voice(host: &AgentHost, tenant_id: String, agent_number: u32, text: String) -> Result<()> {
    let result = host
        .handle(Op::InitializeAgent {
            tenant_id: tenant_id.clone(),
            agent_number,
            config: None,
        })
        .await;
    if !matches!(result, OpResult::Initialized { success: true, .. }) {
        bail!("Failed to initialize agent {agent_number} for tenant '{tenant_id}'");
    }

    let result = host
        .handle(Op::ProcessVoiceCommand {
            tenant_id,
            agent_number,
            text,
        })
        .await;
    let OpResult::VoiceReply { text, .. } = result else {
        return Err(eyre!("Unexpected result for processVoiceCommand: {result:?}"));
    };
    println!("{text}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_param_keeps_json_types() {
        assert_eq!(parse_param("ms=25"), Ok(("ms".to_string(), json!(25))));
        assert_eq!(parse_param("flag=true"), Ok(("flag".to_string(), json!(true))));
        assert_eq!(
            parse_param("period=March"),
            Ok(("period".to_string(), json!("March")))
        );
        assert_eq!(parse_param("eq=a=b"), Ok(("eq".to_string(), json!("a=b"))));
    }

    #[test]
    fn test_parse_param_rejects_malformed() {
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }
}
