//! A local stand-in for an EventBridge event bus.
//!
//! Functions subscribe with content-based patterns; published entries are
//! matched against every rule and delivered, concurrently, to each matching
//! function's Lambda-compatible HTTP endpoint. Everything lives in memory.
//!
//! - [`rules`] - rule definitions, patterns, and the rule store
//! - [`matcher`] - decides whether a rule fires for an event
//! - [`dispatch`] - fans matched events out to handlers and reports outcomes
//! - [`server`] - the HTTP surface (`http` feature)
//! - [`client`] - an HTTP client for a running bus

mod bridge;
pub mod client;
pub mod config;
pub mod dispatch;
mod event;
mod ids;
pub mod manifest;
pub mod matcher;
pub mod rules;
#[cfg(feature = "http")]
pub mod server;
mod wire;

pub use bridge::{BridgeConfig, EventBridge, EventBridgeBuilder};
pub use event::{PutEventsEntry, DEFAULT_EVENT_BUS};
pub use ids::{IdGenerator, SequentialIds, UuidGenerator};
pub use wire::{Envelope, PutEventsRequest};
