//! Fixtures for building managers and on-disk configuration.

use crate::common::mock_sinks::RecordingSink;
use ah_core::agents::{AgentManager, AgentRegistry, MockBehavior};
use ah_core::config::{ConfigProvider, StaticConfigProvider};
use ah_protocol::command_models::Command;
use serde_json::Value;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tempfile::TempDir;

pub const MOCK: u32 = 900;
pub const STRICT: u32 = 901;
pub const FRAGILE: u32 = 902;
pub const BUSINESS_INTELLIGENCE: u32 = 1;
pub const SYSTEM_ARCHITECTURE: u32 = 31;

/// Built-in agents plus test agents:
/// - 900 "Mock Agent"
/// - 901 "Strict Agent", requires `api_key`
/// - 902 "Fragile Agent", whose cleanup fails
pub fn test_registry() -> AgentRegistry {
    let mut registry = AgentRegistry::builtin();
    registry
        .register_behavior(|| MockBehavior::named(MOCK, "Mock Agent"))
        .unwrap();
    registry
        .register_behavior(|| MockBehavior::named(STRICT, "Strict Agent").require("api_key"))
        .unwrap();
    registry
        .register_behavior(|| MockBehavior::named(FRAGILE, "Fragile Agent").failing_teardown())
        .unwrap();
    registry
}

/// Like [`test_registry`], but every MOCK and FRAGILE instance bumps
/// `teardowns` when it is cleaned up.
pub fn counting_registry(teardowns: Arc<AtomicUsize>) -> AgentRegistry {
    let mut registry = AgentRegistry::builtin();
    let counter = Arc::clone(&teardowns);
    registry
        .register_behavior(move || {
            MockBehavior::named(MOCK, "Mock Agent").count_teardowns(Arc::clone(&counter))
        })
        .unwrap();
    registry
        .register_behavior(move || {
            MockBehavior::named(FRAGILE, "Fragile Agent")
                .failing_teardown()
                .count_teardowns(Arc::clone(&teardowns))
        })
        .unwrap();
    registry
}

pub fn manager_with(
    registry: AgentRegistry,
    provider: impl ConfigProvider + 'static,
) -> (AgentManager, RecordingSink) {
    let sink = RecordingSink::new();
    let manager = AgentManager::new(Arc::new(registry), Arc::new(provider), Arc::new(sink.clone()));
    (manager, sink)
}

pub fn manager_with_provider(provider: impl ConfigProvider + 'static) -> (AgentManager, RecordingSink) {
    manager_with(test_registry(), provider)
}

pub fn test_manager() -> (AgentManager, RecordingSink) {
    manager_with_provider(StaticConfigProvider::new())
}

pub fn command(action: &str, tenant_id: &str, parameters: &[(&str, Value)]) -> Command {
    parameters
        .iter()
        .fold(Command::new(action, tenant_id), |cmd, (key, value)| {
            cmd.with_parameter(*key, value.clone())
        })
}

/// A project directory with `.agent-host/` settings and one tenant.
pub fn create_test_root() -> std::io::Result<TempDir> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path().join(".agent-host");

    std::fs::create_dir_all(root.join("tenants/acme"))?;
    std::fs::write(
        root.join("config.toml"),
        "event_capacity = 64\nmessage_log_limit = 10\n",
    )?;
    std::fs::write(
        root.join("tenants/acme/agent-1.toml"),
        "currency_symbol = \"€\"\n",
    )?;
    std::fs::write(
        root.join("tenants/acme/agent-31.yaml"),
        "message_log_limit: 5\n",
    )?;

    Ok(temp_dir)
}
