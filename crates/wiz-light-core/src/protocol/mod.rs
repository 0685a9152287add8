//! Protocol layer for light communication.
//!
//! This module defines the JSON wire messages exchanged with WiZ lights
//! and the codec turning them into UDP datagram payloads.

pub mod message;
pub mod params;

pub use message::{WizMessage, WizMethod};
pub use params::{WizError, WizParams, WizResult};
