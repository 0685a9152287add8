//! UDP light discovery module.
//!
//! Provides reply classification and a broadcast discovery service.

pub mod service;

pub use service::{parse_reply, DiscoveryService, DISCOVERY_PORT};
