//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use wiz_light_core::WizResult;

use crate::types::DiscoveredLight;

/// Output formatter trait
pub trait OutputFormatter {
    /// Format discovered light list
    fn format_lights(&self, lights: &[DiscoveredLight]) -> String;

    /// Format a pilot (light state) reply
    fn format_pilot(&self, ip: &str, result: &WizResult) -> String;

    /// Format a configuration reply
    fn format_config(&self, ip: &str, result: &WizResult) -> String;

    /// Format bulk operation results
    fn format_bulk_results(&self, results: &[(String, bool, String)]) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
