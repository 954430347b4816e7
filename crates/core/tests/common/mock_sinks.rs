//! Event sinks that record what the manager publishes.

use ah_core::events::EventSink;
use ah_protocol::event_models::TenantEvent;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Keeps every published event in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<TenantEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TenantEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn tenant_events(&self, tenant_id: &str) -> Vec<TenantEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.tenant_id == tenant_id)
            .collect()
    }

    /// Wait until `predicate` holds for the recorded events.
    ///
    /// Forwarders run on their own tasks, so events land asynchronously.
    pub async fn wait_for<F>(&self, predicate: F) -> Vec<TenantEvent>
    where
        F: Fn(&[TenantEvent]) -> bool,
    {
        for _ in 0..200 {
            let events = self.events();
            if predicate(&events) {
                return events;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for events, got: {:#?}", self.events());
    }
}

impl EventSink for RecordingSink {
    fn publish(&self, event: TenantEvent) {
        self.events.lock().unwrap().push(event);
    }
}
