//! Table-formatted output for CLI.

use chrono::Local;
use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use wiz_light_core::WizResult;

use super::OutputFormatter;
use crate::types::DiscoveredLight;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_lights(&self, lights: &[DiscoveredLight]) -> String {
        if lights.is_empty() {
            return "No lights found.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["MAC", "IP", "First seen"]);

        for light in lights {
            let seen = light.first_seen.with_timezone(&Local);
            table.add_row(vec![
                Cell::new(&light.mac),
                Cell::new(&light.ip),
                Cell::new(seen.format("%H:%M:%S").to_string()),
            ]);
        }

        format!("{}\n\nFound {} light(s)", table, lights.len())
    }

    fn format_pilot(&self, ip: &str, result: &WizResult) -> String {
        let mut lines = Vec::new();

        match &result.params.mac {
            Some(mac) => lines.push(format!("Light: {} ({})", ip, mac)),
            None => lines.push(format!("Light: {}", ip)),
        }

        if let Some(on) = result.params.state {
            let state = if on { "On".green() } else { "Off".red() };
            lines.push(format!("  State:    {}", state));
        }

        if let Some(scene) = result.params.scene_id {
            if scene != 0 {
                lines.push(format!("  Scene:    {}", scene));
            }
        }

        if let (Some(r), Some(g), Some(b)) = (result.params.r, result.params.g, result.params.b) {
            lines.push(format!("  Color:    rgb({}, {}, {})", r, g, b));
        }

        if let Some(c) = result.params.c {
            lines.push(format!("  Cold:     {}", c));
        }

        if let Some(w) = result.params.w {
            lines.push(format!("  Warm:     {}", w));
        }

        if let Some(temp) = result.params.temp {
            lines.push(format!("  Temp:     {} K", temp));
        }

        if let Some(dimming) = result.params.dimming {
            lines.push(format!("  Dimming:  {}%", dimming));
        }

        if let Some(rssi) = result.rssi {
            lines.push(format!("  Signal:   {} dBm", rssi));
        }

        lines.join("\n")
    }

    fn format_config(&self, ip: &str, result: &WizResult) -> String {
        let mut lines = Vec::new();

        match &result.params.mac {
            Some(mac) => lines.push(format!("Light: {} ({})", ip, mac)),
            None => lines.push(format!("Light: {}", ip)),
        }

        if let Some(module) = &result.params.module_name {
            lines.push(format!("  Module:      {}", module));
        }

        if let Some(fw) = &result.params.fw_version {
            lines.push(format!("  Firmware:    {}", fw));
        }

        if let Some(home) = result.params.home_id {
            lines.push(format!("  Home:        {}", home));
        }

        if let Some(room) = result.params.room_id {
            lines.push(format!("  Room:        {}", room));
        }

        if let Some(group) = result.params.group_id {
            lines.push(format!("  Group:       {}", group));
        }

        if let Some(type_id) = result.params.type_id {
            lines.push(format!("  Type:        {}", type_id));
        }

        if let Some(range) = &result.params.white_range {
            let range: Vec<String> = range.iter().map(|k| k.to_string()).collect();
            lines.push(format!("  White range: {} K", range.join("-")));
        }

        if let Some(range) = &result.params.ext_range {
            let range: Vec<String> = range.iter().map(|k| k.to_string()).collect();
            lines.push(format!("  Ext range:   {} K", range.join("-")));
        }

        if let Some(fade_in) = result.params.fade_in {
            lines.push(format!("  Fade in:     {} ms", fade_in));
        }

        if let Some(fade_out) = result.params.fade_out {
            lines.push(format!("  Fade out:    {} ms", fade_out));
        }

        if let Some(night) = result.params.fade_night {
            let status = if night { "Enabled" } else { "Disabled" };
            lines.push(format!("  Night fade:  {}", status));
        }

        if let Some(dim) = result.params.dft_dim {
            lines.push(format!("  Default dim: {}%", dim));
        }

        lines.join("\n")
    }

    fn format_bulk_results(&self, results: &[(String, bool, String)]) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["IP", "Status", "Result"]);

        let mut success_count = 0;
        let mut fail_count = 0;

        for (ip, success, message) in results {
            let status_cell = if *success {
                success_count += 1;
                Cell::new("OK").fg(Color::Green)
            } else {
                fail_count += 1;
                Cell::new("FAIL").fg(Color::Red)
            };

            table.add_row(vec![Cell::new(ip), status_cell, Cell::new(message)]);
        }

        let summary = format!(
            "\nSummary: {} succeeded, {} failed",
            success_count.to_string().green(),
            fail_count.to_string().red()
        );

        format!("{}{}", table, summary)
    }
}
