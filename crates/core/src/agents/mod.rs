//! Agent abstraction and management.
//!
//! This module provides the `Agent` contract, the `AgentBehavior` trait that
//! concrete agent types implement, the registry of constructible types and
//! the `AgentManager` that owns every live instance.

pub mod agent_type;
pub mod base;
pub mod context;
pub mod factory;
pub mod implementations;
pub mod lifecycle;
pub mod manager;
pub mod memory;
pub mod patterns;

pub use agent_type::AgentKind;
pub use base::{Agent, AgentBehavior, AgentError};
pub use context::{AgentContext, AgentDirectory, AgentLink};
pub use factory::{AgentConstructor, AgentRegistry, RegistryError};
pub use implementations::{BusinessIntelligence, MockBehavior, SystemArchitecture};
pub use lifecycle::BaseAgent;
pub use manager::AgentManager;
pub use memory::MemoryStore;
pub use patterns::{CommandMatcher, PatternMatch};
