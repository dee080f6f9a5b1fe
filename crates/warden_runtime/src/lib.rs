//! Runtime-side dispatch for deployed policy functions.
//!
//! A bundle built by `warden_deploy` embeds the policy description and a
//! dispatch manifest generated at build time, so the handler for an
//! inbound event is fixed before the function ever runs. This crate loads
//! both, routes the event, and hands `(event, context)` to the injected
//! policy engine; resource-state resolution and policy evaluation are the
//! engine's concern. The engine crate provides the bootstrap binary by
//! calling [`dispatch::serve`] from its main.

pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;

pub use config::ExecutionConfig;
pub use dispatch::{serve, DispatchMode, EntryPoint, EventCategory, InvocationContext};
pub use engine::{Policy, PolicyEngine};
pub use error::DispatchError;
