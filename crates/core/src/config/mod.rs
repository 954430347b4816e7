//! Configuration loading and management.
//!
//! This module loads host settings and per-tenant agent configuration from
//! the `.agent-host/` directory and exposes the configuration collaborator
//! used by the agent manager.

pub mod error;
pub mod loader;
pub mod models;
pub mod provider;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::HostConfig;
pub use provider::{ConfigProvider, StaticConfigProvider};
