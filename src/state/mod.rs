//! State management module.
//!
//! Contains the connection registry and the per-connection record it owns.

mod client;
mod names;
mod registry;

pub use client::{Client, ClientId};
pub use names::NameRules;
pub use registry::{Registry, USER_NOT_FOUND};
pub(crate) use registry::Strike;

#[cfg(test)]
pub(crate) use registry::tests as test_support;
