//! Device communication layer.
//!
//! Provides validated light identities and the async UDP socket used
//! to command them.

pub mod handle;
pub mod socket;

pub use handle::WizHandle;
pub use socket::{Operation, WizSocket, DEVICE_PORT, PILOT_PORT};
