//! Agent event plumbing.
//!
//! Agents write events into a per-instance outbox ([`EventEmitter`]); the
//! agent manager drains each outbox and hands tenant-scoped events to an
//! [`EventSink`].

pub mod emitter;
pub mod sink;

pub use emitter::EventEmitter;
pub use sink::{BroadcastSink, EventBusError, EventSink, NullSink, TenantSubscription};
