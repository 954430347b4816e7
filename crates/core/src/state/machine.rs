//! Agent lifecycle state machine.
//!
//! This module owns the legal transitions between [`AgentState`]s and
//! publishes the current state through a `watch` channel so the manager can
//! take snapshots without waiting for a busy agent.

use ah_protocol::agent_models::AgentState;
use ah_protocol::event_models::AgentStatus;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Invalid agent state transition: {from:?} -> {to:?}")]
pub struct InvalidTransition {
    pub from: AgentState,
    pub to: AgentState,
}

/// Whether `from -> to` is a legal transition.
///
/// `Destroyed` is reachable from any state and is terminal.
pub fn can_transition(from: AgentState, to: AgentState) -> bool {
    use AgentState::*;

    match (from, to) {
        (Destroyed, _) => false,
        (_, Destroyed) => true,
        (Uninitialized, Idle) => true,
        (Idle, Executing) => true,
        (Executing, Idle) | (Executing, Error) => true,
        (Error, Idle) => true,
        _ => false,
    }
}

/// The status reported to subscribers when entering `state`, if any.
pub fn status_for(state: AgentState) -> Option<AgentStatus> {
    match state {
        AgentState::Idle => Some(AgentStatus::Idle),
        AgentState::Executing => Some(AgentStatus::Executing),
        AgentState::Error => Some(AgentStatus::Error),
        AgentState::Uninitialized | AgentState::Destroyed => None,
    }
}

/// Current state of one agent, observable from outside the agent.
#[derive(Debug)]
pub struct StateMachine {
    tx: watch::Sender<AgentState>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AgentState::Uninitialized);
        Self { tx }
    }

    pub fn current(&self) -> AgentState {
        *self.tx.borrow()
    }

    /// Move to `to`, returning the previous state.
    pub fn transition(&self, to: AgentState) -> Result<AgentState, InvalidTransition> {
        let from = self.current();
        if !can_transition(from, to) {
            return Err(InvalidTransition { from, to });
        }
        self.tx.send_replace(to);
        Ok(from)
    }

    pub fn subscribe(&self) -> watch::Receiver<AgentState> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let machine = StateMachine::new();
        assert_eq!(machine.current(), AgentState::Uninitialized);

        assert_eq!(machine.transition(AgentState::Idle), Ok(AgentState::Uninitialized));
        assert_eq!(machine.transition(AgentState::Executing), Ok(AgentState::Idle));
        assert_eq!(machine.transition(AgentState::Error), Ok(AgentState::Executing));
        assert_eq!(machine.transition(AgentState::Idle), Ok(AgentState::Error));
        assert_eq!(machine.transition(AgentState::Destroyed), Ok(AgentState::Idle));
    }

    #[test]
    fn test_cannot_execute_before_initialization() {
        let machine = StateMachine::new();
        let err = machine.transition(AgentState::Executing).unwrap_err();
        assert_eq!(err.from, AgentState::Uninitialized);
        assert_eq!(machine.current(), AgentState::Uninitialized);
    }

    #[test]
    fn test_destroyed_is_terminal_and_reachable_from_anywhere() {
        for start in [
            AgentState::Uninitialized,
            AgentState::Idle,
            AgentState::Executing,
            AgentState::Error,
        ] {
            assert!(can_transition(start, AgentState::Destroyed));
        }
        assert!(!can_transition(AgentState::Destroyed, AgentState::Idle));
        assert!(!can_transition(AgentState::Destroyed, AgentState::Destroyed));
    }

    #[test]
    fn test_subscribers_observe_changes() {
        let machine = StateMachine::new();
        let rx = machine.subscribe();

        machine.transition(AgentState::Idle).unwrap();
        assert_eq!(*rx.borrow(), AgentState::Idle);
    }

    #[test]
    fn test_status_for_states() {
        assert_eq!(status_for(AgentState::Executing), Some(AgentStatus::Executing));
        assert_eq!(status_for(AgentState::Error), Some(AgentStatus::Error));
        assert_eq!(status_for(AgentState::Destroyed), None);
    }
}
