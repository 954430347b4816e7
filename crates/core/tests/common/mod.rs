//! Common test utilities shared by the integration tests.
//!
//! This module provides:
//! - Fixtures (registries, managers, on-disk configuration)
//! - A recording event sink
//! - A configuration provider that always fails
//! - Event assertions

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod mock_providers;
pub mod mock_sinks;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
#[allow(unused_imports)]
pub use mock_providers::*;
#[allow(unused_imports)]
pub use mock_sinks::*;
