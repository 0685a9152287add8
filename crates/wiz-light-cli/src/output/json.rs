//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::{json, Value};

use wiz_light_core::WizResult;

use super::OutputFormatter;
use crate::types::DiscoveredLight;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_lights(&self, lights: &[DiscoveredLight]) -> String {
        let output = json!({
            "lights": lights,
            "count": lights.len()
        });
        Self::to_json(&output)
    }

    fn format_pilot(&self, ip: &str, result: &WizResult) -> String {
        Self::to_json(&json!({
            "ip": ip,
            "pilot": result
        }))
    }

    fn format_config(&self, ip: &str, result: &WizResult) -> String {
        Self::to_json(&json!({
            "ip": ip,
            "config": result
        }))
    }

    fn format_bulk_results(&self, results: &[(String, bool, String)]) -> String {
        let items: Vec<Value> = results
            .iter()
            .map(|(ip, success, message)| {
                json!({
                    "ip": ip,
                    "success": success,
                    "message": message
                })
            })
            .collect();

        let success_count = results.iter().filter(|(_, s, _)| *s).count();
        let fail_count = results.len() - success_count;

        Self::to_json(&json!({
            "results": items,
            "summary": {
                "total": results.len(),
                "succeeded": success_count,
                "failed": fail_count
            }
        }))
    }
}
