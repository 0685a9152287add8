//! Core library for controlling WiZ smart lights over UDP.
//!
//! Talks the lights' JSON-datagram protocol: build a [`WizMessage`],
//! send it through a [`WizSocket`] to the light behind a [`WizHandle`],
//! and decode whatever comes back. [`DiscoveryService`] finds the
//! lights in the first place by broadcasting a registration request on
//! the local network.
//!
//! ```no_run
//! use std::net::Ipv4Addr;
//! use wiz_light_core::{WizHandle, WizMessage, WizSocket};
//!
//! # async fn demo() -> wiz_light_core::Result<()> {
//! let light = WizHandle::new("a8bb5006033d", Ipv4Addr::new(192, 168, 0, 52))?;
//! let socket = WizSocket::open().await?;
//! socket.send(&WizMessage::get_pilot(), &light).await?;
//! let (reply, _) = socket.recv().await?;
//! println!("{}", reply);
//! socket.close();
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod discovery;
pub mod error;
pub mod protocol;

pub use device::{Operation, WizHandle, WizSocket, DEVICE_PORT, PILOT_PORT};
pub use discovery::{DiscoveryService, DISCOVERY_PORT};
pub use error::{CoreError, HandleError, ParseError, Result, TransportError};
pub use protocol::{WizError, WizMessage, WizMethod, WizParams, WizResult};
