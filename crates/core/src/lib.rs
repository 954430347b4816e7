//! # ah-core
//!
//! Agent lifecycle, registry and routing for agent-host.
//!
//! This crate provides:
//! - Configuration loading from `.agent-host/` directory
//! - The agent contract, the standard lifecycle wrapper and built-in agents
//! - The multi-tenant agent manager and its event fan-out
//! - The host facade that answers transport operations
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading and providers
//! - [`agents`]: Agent traits, registry, built-in agents and the manager
//! - [`events`]: Per-instance event outboxes and fan-out sinks
//! - [`host`]: Operation dispatch for transports
//! - [`state`]: Lifecycle state machine and the instance map

pub mod agents;
pub mod config;
pub mod events;
pub mod host;
pub mod state;

pub use host::AgentHost;
