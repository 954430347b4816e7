//! Agent registry: maps agent numbers to constructors.

use crate::agents::base::{Agent, AgentBehavior, AgentError};
use crate::agents::implementations::{BusinessIntelligence, SystemArchitecture};
use crate::agents::lifecycle::BaseAgent;
use ah_protocol::agent_models::AgentDescriptor;
use ah_protocol::config_models::HostSettings;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Builds a fresh, uninitialized agent instance.
pub type AgentConstructor = Arc<dyn Fn() -> Box<dyn Agent> + Send + Sync>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Agent number {0} is already registered")]
    Duplicate(u32),
    #[error("Agent number must be greater than zero")]
    ZeroAgentNumber,
}

#[derive(Clone)]
struct Registration {
    descriptor: AgentDescriptor,
    constructor: AgentConstructor,
}

/// Registry of constructible agent types.
///
/// The registry is immutable once handed to the manager; every
/// `initialize_agent` call builds a new instance from it.
#[derive(Clone, Default)]
pub struct AgentRegistry {
    registrations: BTreeMap<u32, Registration>,
}

impl AgentRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in agent types with default settings.
    pub fn builtin() -> Self {
        Self::with_settings(&HostSettings::default())
    }

    /// The built-in agent types, tuned by host-wide settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use ah_core::agents::AgentRegistry;
    ///
    /// let registry = AgentRegistry::builtin();
    /// assert!(registry.contains(1));
    /// assert!(registry.contains(31));
    /// assert!(registry.create(7).is_err());
    /// ```
    pub fn with_settings(settings: &HostSettings) -> Self {
        let message_log_limit = settings.message_log_limit;
        let mut registry = Self::empty();
        registry.insert(Self::registration(BusinessIntelligence::default));
        registry.insert(Self::registration(move || {
            SystemArchitecture::default().with_message_log_limit(message_log_limit)
        }));
        registry
    }

    /// Register a constructor under `descriptor.agent_number`.
    pub fn register<F>(&mut self, descriptor: AgentDescriptor, constructor: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Box<dyn Agent> + Send + Sync + 'static,
    {
        self.try_insert(Registration {
            descriptor,
            constructor: Arc::new(constructor),
        })
    }

    /// Register an [`AgentBehavior`] wrapped in the standard lifecycle.
    pub fn register_behavior<B, F>(&mut self, make: F) -> Result<(), RegistryError>
    where
        B: AgentBehavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        self.try_insert(Self::registration(make))
    }

    /// Build a new, uninitialized instance of agent type `agent_number`.
    pub fn create(&self, agent_number: u32) -> Result<Box<dyn Agent>, AgentError> {
        self.registrations
            .get(&agent_number)
            .map(|registration| (registration.constructor)())
            .ok_or(AgentError::UnknownAgentType(agent_number))
    }

    pub fn contains(&self, agent_number: u32) -> bool {
        self.registrations.contains_key(&agent_number)
    }

    pub fn descriptor(&self, agent_number: u32) -> Option<AgentDescriptor> {
        self.registrations
            .get(&agent_number)
            .map(|registration| registration.descriptor.clone())
    }

    /// All registered descriptors, ordered by agent number.
    pub fn descriptors(&self) -> Vec<AgentDescriptor> {
        self.registrations
            .values()
            .map(|registration| registration.descriptor.clone())
            .collect()
    }

    fn registration<B, F>(make: F) -> Registration
    where
        B: AgentBehavior,
        F: Fn() -> B + Send + Sync + 'static,
    {
        Registration {
            descriptor: make().descriptor(),
            constructor: Arc::new(move || Box::new(BaseAgent::new(make())) as Box<dyn Agent>),
        }
    }

    fn try_insert(&mut self, registration: Registration) -> Result<(), RegistryError> {
        let agent_number = registration.descriptor.agent_number;
        if agent_number == 0 {
            return Err(RegistryError::ZeroAgentNumber);
        }
        if self.registrations.contains_key(&agent_number) {
            return Err(RegistryError::Duplicate(agent_number));
        }
        self.insert(registration);
        Ok(())
    }

    fn insert(&mut self, registration: Registration) {
        self.registrations
            .insert(registration.descriptor.agent_number, registration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::implementations::MockBehavior;
    use ah_protocol::agent_models::AgentState;

    #[test]
    fn test_builtin_registry() {
        let registry = AgentRegistry::builtin();
        let numbers: Vec<u32> = registry.descriptors().iter().map(|d| d.agent_number).collect();
        assert_eq!(numbers, vec![1, 31]);
        assert_eq!(
            registry.descriptor(31).map(|d| d.name),
            Some("System Architecture".to_string())
        );
    }

    #[test]
    fn test_create_returns_fresh_instances() {
        let registry = AgentRegistry::builtin();

        let agent = registry.create(1).unwrap();
        assert_eq!(agent.state(), AgentState::Uninitialized);
        assert_eq!(agent.descriptor().name, "Business Intelligence");
    }

    #[test]
    fn test_unknown_agent_type() {
        let registry = AgentRegistry::builtin();
        assert!(matches!(
            registry.create(99),
            Err(AgentError::UnknownAgentType(99))
        ));
    }

    #[test]
    fn test_register_behavior_rejects_duplicates_and_zero() {
        let mut registry = AgentRegistry::empty();
        registry
            .register_behavior(|| MockBehavior::named(5, "Five"))
            .unwrap();

        assert_eq!(
            registry.register_behavior(|| MockBehavior::named(5, "Again")),
            Err(RegistryError::Duplicate(5))
        );
        assert_eq!(
            registry.register_behavior(|| MockBehavior::named(0, "Zero")),
            Err(RegistryError::ZeroAgentNumber)
        );
        assert!(registry.contains(5));
    }

    #[test]
    fn test_register_custom_constructor() {
        let mut registry = AgentRegistry::empty();
        let descriptor = AgentDescriptor::new(42, "Custom", "custom constructor");
        registry
            .register(descriptor, || {
                Box::new(BaseAgent::new(MockBehavior::named(42, "Custom"))) as Box<dyn Agent>
            })
            .unwrap();

        assert_eq!(registry.create(42).unwrap().descriptor().agent_number, 42);
    }
}
