//! # ah-protocol
//!
//! Core protocol definitions and data models for agent-host.
//!
//! This crate defines all shared data structures used for:
//! - Agent identity, configuration and declared command patterns
//! - Commands routed to agents and the responses they produce
//! - Events relayed from agents to external subscribers
//! - Communication between the transport layer and the core
//!
//! ## Modules
//!
//! - [`agent_models`]: Agent descriptors, configuration, patterns and info snapshots
//! - [`command_models`]: Commands and responses
//! - [`config_models`]: Host settings from `config.toml`
//! - [`event_models`]: Status, inter-agent message and fault events
//! - [`ipc`]: Operations and results for transport-core communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other agent-host crates

pub mod agent_models;
pub mod command_models;
pub mod config_models;
pub mod event_models;
pub mod ipc;

// Re-export all public types for convenience
pub use agent_models::*;
pub use command_models::*;
pub use config_models::*;
pub use event_models::*;
pub use ipc::*;
