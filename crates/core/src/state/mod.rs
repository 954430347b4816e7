//! Agent instance state.
//!
//! This module provides:
//! - The lifecycle state machine of a single instance
//! - The instance map keyed by tenant and agent number

pub mod instances;
pub mod machine;
