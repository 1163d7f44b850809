//! Integration test common infrastructure.
//!
//! Spawns real `relayd` processes and drives them over TCP and the
//! operator console.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;
