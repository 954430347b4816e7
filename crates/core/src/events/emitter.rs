//! Per-instance event outbox.

use ah_protocol::event_models::AgentEvent;
use tokio::sync::mpsc;

/// Sending half of an agent's outbox.
///
/// A detached emitter silently drops events, the same as an event source
/// nobody listens to.
#[derive(Debug, Clone, Default)]
pub struct EventEmitter {
    tx: Option<mpsc::UnboundedSender<AgentEvent>>,
}

impl EventEmitter {
    /// Create an attached emitter and the receiver draining it.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AgentEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn detached() -> Self {
        Self::default()
    }

    /// Emit an event. Returns whether a listener received it.
    pub fn emit(&self, event: AgentEvent) -> bool {
        match &self.tx {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }

    /// Drop the outbox so the receiving side observes end-of-stream.
    pub fn detach(&mut self) {
        self.tx = None;
    }

    pub fn is_attached(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ah_protocol::event_models::AgentMessage;
    use serde_json::json;

    fn message() -> AgentEvent {
        AgentEvent::Message(AgentMessage::new("a", "b", json!({})))
    }

    #[tokio::test]
    async fn test_events_arrive_in_order() {
        let (emitter, mut rx) = EventEmitter::channel();

        assert!(emitter.emit(message()));
        assert!(emitter.emit(AgentEvent::Message(AgentMessage::new("a", "c", json!({})))));

        assert_eq!(rx.recv().await.unwrap().target_agent(), Some("b"));
        assert_eq!(rx.recv().await.unwrap().target_agent(), Some("c"));
    }

    #[test]
    fn test_detached_emitter_drops_events() {
        let emitter = EventEmitter::detached();
        assert!(!emitter.is_attached());
        assert!(!emitter.emit(message()));
    }

    #[tokio::test]
    async fn test_detach_closes_stream() {
        let (mut emitter, mut rx) = EventEmitter::channel();
        assert!(emitter.is_attached());

        emitter.detach();
        assert!(rx.recv().await.is_none());
    }
}
