//! Assertion helpers over recorded events.

use ah_protocol::event_models::{AgentEvent, AgentStatus, TenantEvent};

/// Status updates of one agent, in publish order.
pub fn statuses_of(events: &[TenantEvent], agent_name: &str) -> Vec<AgentStatus> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            AgentEvent::Status(update) if update.agent_name == agent_name => Some(update.status),
            _ => None,
        })
        .collect()
}

pub fn has_error_event(events: &[TenantEvent]) -> bool {
    events.iter().any(|e| matches!(e.event, AgentEvent::Error(_)))
}

pub fn message_events(events: &[TenantEvent]) -> Vec<(String, String)> {
    events
        .iter()
        .filter_map(|e| match &e.event {
            AgentEvent::Message(m) => Some((m.from.clone(), m.to.clone())),
            _ => None,
        })
        .collect()
}

/// Assert that every event was published for `tenant_id`.
pub fn assert_single_tenant(events: &[TenantEvent], tenant_id: &str) {
    for event in events {
        assert_eq!(
            event.tenant_id, tenant_id,
            "event leaked across tenants: {event:?}"
        );
    }
}
