//! The UDP wire unit: one JSON object per datagram.
//!
//! Requests carry `params`, success replies carry `result`, failure
//! replies carry `error`. The optional `id` correlates a reply with its
//! request when the device echoes it back.

use std::fmt;
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::protocol::params::{WizError, WizParams, WizResult};

/// Known protocol methods with their exact wire spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WizMethod {
    Registration,
    Pulse,
    FirstBeat,
    GetPilot,
    SetPilot,
    SyncPilot,
    GetSystemConfig,
    SetSystemConfig,
    GetUserConfig,
    SetUserConfig,
}

impl WizMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WizMethod::Registration => "registration",
            WizMethod::Pulse => "pulse",
            WizMethod::FirstBeat => "firstBeat",
            WizMethod::GetPilot => "getPilot",
            WizMethod::SetPilot => "setPilot",
            WizMethod::SyncPilot => "syncPilot",
            WizMethod::GetSystemConfig => "getSystemConfig",
            WizMethod::SetSystemConfig => "setSystemConfig",
            WizMethod::GetUserConfig => "getUserConfig",
            WizMethod::SetUserConfig => "setUserConfig",
        }
    }
}

impl fmt::Display for WizMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single protocol message, request or reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizMessage {
    pub method: WizMethod,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<WizParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<WizResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WizError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i32>,
}

impl WizMessage {
    fn request(method: WizMethod) -> Self {
        Self {
            method,
            params: None,
            result: None,
            error: None,
            id: None,
        }
    }

    /// Registration request, broadcast during discovery.
    ///
    /// Tells lights in `home_id` to reply to `host_ip` and to push state
    /// updates there. The host MAC goes on the wire as 12 lowercase hex
    /// digits.
    pub fn registration(home_id: u32, host_ip: Ipv4Addr, host_mac: [u8; 6]) -> Self {
        let phone_mac: String = host_mac.iter().map(|b| format!("{:02x}", b)).collect();
        Self {
            params: Some(WizParams {
                home_id: Some(home_id),
                phone_ip: Some(host_ip.to_string()),
                phone_mac: Some(phone_mac),
                register: Some(true),
                ..Default::default()
            }),
            ..Self::request(WizMethod::Registration)
        }
    }

    /// Request the current pilot (light state).
    pub fn get_pilot() -> Self {
        Self::request(WizMethod::GetPilot)
    }

    /// Change the pilot. Only the fields set in `params` are applied.
    pub fn set_pilot(params: WizParams) -> Self {
        Self {
            params: Some(params),
            ..Self::request(WizMethod::SetPilot)
        }
    }

    /// Request hardware and firmware information.
    pub fn get_system_config() -> Self {
        Self::request(WizMethod::GetSystemConfig)
    }

    /// Request user-tunable device settings.
    pub fn get_user_config() -> Self {
        Self::request(WizMethod::GetUserConfig)
    }

    /// Decode one datagram. Malformed input is an error, never a panic.
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        Ok(serde_json::from_slice(data)?)
    }

    /// Encode to UTF-8 JSON bytes. Well-formed messages always encode.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

impl fmt::Display for WizMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&serde_json::to_string(self).unwrap_or_default())
    }
}
