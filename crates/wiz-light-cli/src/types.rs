//! Shared types and argument parsing helpers for the CLI.

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::Serialize;
use wiz_light_core::WizHandle;

use crate::error::CliError;

/// A light found during discovery, with the moment it was first seen.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveredLight {
    /// Normalized MAC address (12 lowercase hex digits)
    pub mac: String,
    /// IPv4 address the light answered from
    pub ip: String,
    /// When the first registration reply arrived
    pub first_seen: DateTime<Utc>,
}

impl DiscoveredLight {
    pub fn new(handle: &WizHandle, first_seen: DateTime<Utc>) -> Self {
        Self {
            mac: handle.mac().to_string(),
            ip: handle.ip().to_string(),
            first_seen,
        }
    }
}

/// Parse a host MAC address into raw bytes.
///
/// Accepts `aa:bb:cc:dd:ee:ff`, `aa-bb-cc-dd-ee-ff` and bare `aabbccddeeff`
/// forms, upper or lower case.
pub fn parse_host_mac(text: &str) -> Result<[u8; 6], CliError> {
    let digits: String = text.chars().filter(|c| *c != ':' && *c != '-').collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CliError::InvalidArgument(format!(
            "'{}' is not a MAC address (expected 12 hex digits)",
            text
        )));
    }

    let mut mac = [0u8; 6];
    for (i, byte) in mac.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&digits[i * 2..i * 2 + 2], 16)
            .map_err(|_| CliError::InvalidArgument(format!("'{}' is not a MAC address", text)))?;
    }
    Ok(mac)
}

/// Parse an IPv4 address argument.
pub fn parse_ipv4(text: &str) -> Result<Ipv4Addr, CliError> {
    text.parse()
        .map_err(|_| CliError::InvalidArgument(format!("'{}' is not an IPv4 address", text)))
}
