//! Wire payload records for the WiZ UDP protocol.
//!
//! Every field is optional and omitted from the wire when absent. Lights
//! ignore keys they do not understand and so do we: unknown inbound keys
//! (`env`, `src`, ...) are dropped instead of failing the parse.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Request parameters and pushed state, shared by every method.
///
/// A `setPilot` request fills the pilot fields, a `registration` request
/// fills the host fields, and a `syncPilot` push mixes pilot state with
/// device info. Absent fields never serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizParams {
    // Pilot state
    /// Light on/off state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<bool>,
    /// Scene to play, 0 when a static color is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<u32>,
    /// Scene playback speed, 0-200
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u8>,
    /// Whether the scene is animating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<bool>,
    /// Red channel, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r: Option<u8>,
    /// Green channel, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub g: Option<u8>,
    /// Blue channel, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub b: Option<u8>,
    /// Cold white channel, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c: Option<u8>,
    /// Warm white channel, 0-255
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w: Option<u8>,
    /// White color temperature in Kelvin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<u32>,
    /// Brightness percentage, 10-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimming: Option<u8>,

    // Registration
    /// IP the host wants replies sent to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_ip: Option<String>,
    /// Host MAC as 12 lowercase hex digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_mac: Option<String>,
    /// True to register for pushed updates, false to unregister
    #[serde(skip_serializing_if = "Option::is_none")]
    pub register: Option<bool>,

    // Device info
    /// Hardware module name, e.g. "ESP01_SHRGB1C_31"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    /// Device MAC as 12 lowercase hex digits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_lock: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairing_lock: Option<bool>,
    /// Firmware version string, e.g. "1.22.0"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fw_version: Option<String>,

    // User configuration
    /// Fade-in time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_in: Option<u32>,
    /// Fade-out time in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_out: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fade_night: Option<bool>,
    /// Default dimming level after power-on, 10-100
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dft_dim: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pwm_range: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drv_conf: Option<Vec<u32>>,
    /// Supported white temperature range in Kelvin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_range: Option<Vec<u32>>,
    /// Extended temperature range in Kelvin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_range: Option<Vec<u32>>,
    /// Power-on behavior flag
    #[serde(skip_serializing_if = "Option::is_none")]
    pub po: Option<bool>,
}

/// Success reply payload: everything a request can carry plus the
/// outcome flag and signal strength.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// Received signal strength in dBm, negative
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rssi: Option<i32>,
    #[serde(flatten)]
    pub params: WizParams,
}

/// Failure reply payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl fmt::Display for WizError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = self.message.as_deref().unwrap_or("unknown device error");
        match self.code {
            Some(code) => write!(f, "{} (code {})", message, code),
            None => f.write_str(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_params_omit_absent_fields() {
        let params = WizParams {
            state: Some(true),
            dimming: Some(50),
            ..Default::default()
        };

        let encoded = serde_json::to_string(&params).unwrap();
        let value: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(value, json!({"state": true, "dimming": 50}));
        assert!(!encoded.contains("null"));
    }

    #[test]
    fn test_params_camel_case_names() {
        let params = WizParams {
            scene_id: Some(14),
            phone_mac: Some("a1b2c3d4e5f6".to_string()),
            fw_version: Some("1.22.0".to_string()),
            ..Default::default()
        };

        let value: Value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["sceneId"], 14);
        assert_eq!(value["phoneMac"], "a1b2c3d4e5f6");
        assert_eq!(value["fwVersion"], "1.22.0");
    }

    #[test]
    fn test_result_flattens_params() {
        let data = r#"{"mac":"a8bb5006033d","rssi":-60,"state":true,"sceneId":0,"temp":6500,"dimming":100,"success":true}"#;
        let result: WizResult = serde_json::from_str(data).unwrap();

        assert_eq!(result.success, Some(true));
        assert_eq!(result.rssi, Some(-60));
        assert_eq!(result.params.mac.as_deref(), Some("a8bb5006033d"));
        assert_eq!(result.params.state, Some(true));
        assert_eq!(result.params.temp, Some(6500));
    }

    #[test]
    fn test_result_roundtrip() {
        let result = WizResult {
            success: Some(true),
            rssi: Some(-71),
            params: WizParams {
                mac: Some("f0189809091a".to_string()),
                state: Some(false),
                ..Default::default()
            },
        };

        let encoded = serde_json::to_vec(&result).unwrap();
        let decoded: WizResult = serde_json::from_slice(&encoded).unwrap();
        assert_eq!(decoded, result);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let data = r#"{"state":true,"src":"udp","env":"pro","mqttCd":0}"#;
        let params: WizParams = serde_json::from_str(data).unwrap();
        assert_eq!(params.state, Some(true));
    }

    #[test]
    fn test_error_display() {
        let err = WizError {
            code: Some(-32601),
            message: Some("Method not found".to_string()),
        };
        assert_eq!(format!("{}", err), "Method not found (code -32601)");

        let bare = WizError::default();
        assert_eq!(format!("{}", bare), "unknown device error");
    }
}
