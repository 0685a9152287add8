//! Listen command implementation.
//!
//! Binds the host pilot port and prints state updates pushed by lights.

use std::io::{self, Write};
use std::net::IpAddr;

use colored::*;
use serde_json::json;
use tracing::warn;

use wiz_light_core::protocol::{WizMessage, WizParams};
use wiz_light_core::{WizSocket, PILOT_PORT};

use crate::cli::ListenArgs;
use crate::error::{CliError, TransportError};
use crate::types::parse_ipv4;

/// Run the listen command
pub async fn run_listen(args: ListenArgs, json: bool) -> Result<(), CliError> {
    let filter_ip = match &args.ip {
        Some(text) => Some(parse_ipv4(text)?),
        None => None,
    };

    if args.count == Some(0) {
        return Ok(());
    }
    let mut remaining = args.count;

    let socket = WizSocket::bind().await?;

    println!(
        "Listening for pilot updates on port {} (press Ctrl+C to stop)...\n",
        PILOT_PORT
    );

    let outcome = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break Ok(()),
            received = socket.recv() => match received {
                Ok((message, addr)) => {
                    if let Some(ip) = filter_ip {
                        if addr.ip() != IpAddr::V4(ip) {
                            continue;
                        }
                    }

                    print_update(&message, &addr.ip().to_string(), json);
                    io::stdout().flush().ok();

                    if let Some(count) = remaining.as_mut() {
                        *count -= 1;
                        if *count == 0 {
                            break Ok(());
                        }
                    }
                }
                Err(TransportError::Parse(e)) => {
                    warn!("ignoring malformed datagram: {}", e);
                }
                Err(e) => break Err(CliError::from(e)),
            },
        }
    };

    socket.close();
    outcome
}

fn print_update(message: &WizMessage, ip: &str, json: bool) {
    if json {
        // One JSON object per line so the stream stays greppable
        println!(
            "{}",
            json!({
                "ip": ip,
                "update": message
            })
        );
        return;
    }

    let summary = match &message.params {
        Some(params) => pilot_summary(params),
        None => String::new(),
    };

    println!(
        "{:>15} {:>10} {}",
        ip.dimmed(),
        message.method.to_string().cyan(),
        summary
    );
}

/// One line summary of a pushed pilot state.
fn pilot_summary(params: &WizParams) -> String {
    let mut parts = Vec::new();

    if let Some(on) = params.state {
        parts.push(if on { "on".to_string() } else { "off".to_string() });
    }

    if let Some(dimming) = params.dimming {
        parts.push(format!("{}%", dimming));
    }

    if let (Some(r), Some(g), Some(b)) = (params.r, params.g, params.b) {
        parts.push(format!("rgb({}, {}, {})", r, g, b));
    }

    if let Some(temp) = params.temp {
        parts.push(format!("{} K", temp));
    }

    if let Some(scene) = params.scene_id {
        if scene != 0 {
            parts.push(format!("scene {}", scene));
        }
    }

    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pilot_summary_state_and_dimming() {
        let params = WizParams {
            state: Some(true),
            dimming: Some(75),
            ..Default::default()
        };

        assert_eq!(pilot_summary(&params), "on, 75%");
    }

    #[test]
    fn test_pilot_summary_color() {
        let params = WizParams {
            state: Some(false),
            r: Some(255),
            g: Some(0),
            b: Some(64),
            ..Default::default()
        };

        assert_eq!(pilot_summary(&params), "off, rgb(255, 0, 64)");
    }

    #[test]
    fn test_pilot_summary_skips_zero_scene() {
        let params = WizParams {
            scene_id: Some(0),
            ..Default::default()
        };

        assert_eq!(pilot_summary(&params), "");
    }
}
