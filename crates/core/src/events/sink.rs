//! Event fan-out sink.
//!
//! The sink is the boundary to whatever transport delivers events to
//! connected clients. It receives `(tenant, event)` pairs from the agent
//! manager and must tolerate concurrent publishes from many agents.
//!
//! [`BroadcastSink`] provides in-memory fan-out using tokio broadcast
//! channels. Events are not persisted; a subscriber that falls behind by more
//! than the channel capacity loses the oldest events.

use ah_protocol::event_models::TenantEvent;
use async_stream::stream;
use std::pin::Pin;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// Receives tenant-scoped events from the agent manager.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: TenantEvent);
}

/// A sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: TenantEvent) {}
}

/// Broadcast-channel sink with per-tenant subscriptions.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<TenantEvent>,
}

impl BroadcastSink {
    /// Create a sink buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to every tenant's events.
    pub fn subscribe(&self) -> broadcast::Receiver<TenantEvent> {
        self.sender.subscribe()
    }

    /// Subscribe to the events of a single tenant.
    pub fn subscribe_tenant(&self, tenant_id: impl Into<String>) -> TenantSubscription {
        TenantSubscription {
            tenant_id: tenant_id.into(),
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventSink for BroadcastSink {
    fn publish(&self, event: TenantEvent) {
        let tenant = event.tenant_id.clone();
        match self.sender.send(event) {
            Ok(receivers) => debug!(tenant = %tenant, receivers, "Published agent event"),
            Err(_) => debug!(tenant = %tenant, "No subscribers listening to agent event"),
        }
    }
}

/// Errors that can occur when receiving events.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EventBusError {
    #[error("Event bus is closed")]
    Closed,

    #[error("Receiver lagged by {0} events (events were dropped)")]
    Lagged(u64),
}

/// Receiver filtered to one tenant.
pub struct TenantSubscription {
    tenant_id: String,
    receiver: broadcast::Receiver<TenantEvent>,
}

impl TenantSubscription {
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Receive the next event for this tenant.
    ///
    /// Events for other tenants are skipped.
    pub async fn recv(&mut self) -> Result<TenantEvent, EventBusError> {
        loop {
            let event = self.receiver.recv().await.map_err(|e| match e {
                broadcast::error::RecvError::Closed => EventBusError::Closed,
                broadcast::error::RecvError::Lagged(n) => {
                    warn!(tenant = %self.tenant_id, "Event receiver lagged by {n} events");
                    EventBusError::Lagged(n)
                }
            })?;

            if event.tenant_id == self.tenant_id {
                return Ok(event);
            }
        }
    }

    /// Receive without waiting, if an event for this tenant is buffered.
    pub fn try_recv(&mut self) -> Option<TenantEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.tenant_id == self.tenant_id => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    warn!(tenant = %self.tenant_id, "Event receiver lagged by {n} events");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }

    /// Convert into a stream that ends when the sink is dropped.
    ///
    /// Lagging is logged and skipped rather than ending the stream.
    pub fn into_stream(mut self) -> Pin<Box<dyn Stream<Item = TenantEvent> + Send>> {
        Box::pin(stream! {
            loop {
                match self.recv().await {
                    Ok(event) => yield event,
                    Err(EventBusError::Lagged(_)) => continue,
                    Err(EventBusError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_protocol::event_models::{AgentEvent, AgentStatus, StatusUpdate};
    use chrono::Utc;
    use tokio::time::{timeout, Duration};
    use tokio_stream::StreamExt;

    fn status_event(tenant: &str, status: AgentStatus) -> TenantEvent {
        TenantEvent::new(
            tenant,
            AgentEvent::Status(StatusUpdate {
                agent_number: 1,
                agent_name: "Business Intelligence".to_string(),
                status,
                details: None,
                timestamp: Utc::now(),
            }),
        )
    }

    #[tokio::test]
    async fn test_publish_and_receive_for_tenant() {
        let sink = BroadcastSink::new(16);
        let mut subscription = sink.subscribe_tenant("t1");

        sink.publish(status_event("t2", AgentStatus::Idle));
        sink.publish(status_event("t1", AgentStatus::Executing));

        let event = timeout(Duration::from_millis(100), subscription.recv())
            .await
            .expect("timeout")
            .expect("recv");
        assert_eq!(event.tenant_id, "t1");
        assert!(matches!(
            event.event,
            AgentEvent::Status(StatusUpdate { status: AgentStatus::Executing, .. })
        ));
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_event() {
        let sink = BroadcastSink::new(16);
        let mut all = sink.subscribe();
        let mut tenant = sink.subscribe_tenant("t1");
        assert_eq!(sink.subscriber_count(), 2);

        sink.publish(status_event("t1", AgentStatus::Idle));

        assert_eq!(all.recv().await.unwrap().tenant_id, "t1");
        assert_eq!(tenant.recv().await.unwrap().tenant_id, "t1");
    }

    #[test]
    fn test_publish_without_subscribers_is_harmless() {
        let sink = BroadcastSink::new(4);
        sink.publish(status_event("t1", AgentStatus::Idle));
        NullSink.publish(status_event("t1", AgentStatus::Idle));
    }

    #[test]
    fn test_try_recv_skips_other_tenants() {
        let sink = BroadcastSink::new(16);
        let mut subscription = sink.subscribe_tenant("t1");

        sink.publish(status_event("t2", AgentStatus::Idle));
        assert!(subscription.try_recv().is_none());

        sink.publish(status_event("t1", AgentStatus::Idle));
        assert_eq!(subscription.try_recv().unwrap().tenant_id, "t1");
    }

    #[tokio::test]
    async fn test_stream_ends_when_sink_dropped() {
        let sink = BroadcastSink::new(16);
        let stream = sink.subscribe_tenant("t1").into_stream();

        sink.publish(status_event("t1", AgentStatus::Idle));
        sink.publish(status_event("t1", AgentStatus::Executing));
        drop(sink);

        let events: Vec<_> = stream.collect().await;
        assert_eq!(events.len(), 2);
    }
}
