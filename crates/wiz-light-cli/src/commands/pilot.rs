//! Pilot command implementation.
//!
//! Reads and changes light state over the device port.

use std::net::Ipv4Addr;
use std::time::{Duration, Instant};

use colored::*;
use futures::stream::{self, StreamExt};
use tracing::warn;

use wiz_light_core::protocol::{WizError, WizMessage, WizParams, WizResult};
use wiz_light_core::{WizHandle, WizSocket};

use crate::cli::{PilotArgs, PilotCommands, PilotGetArgs, PilotSetArgs};
use crate::discovery::{discover_lights, DiscoveryOptions};
use crate::error::{CliError, TransportError};
use crate::output::get_formatter;
use crate::types::{parse_host_mac, parse_ipv4};

/// Run the pilot command
pub async fn run_pilot(
    args: PilotArgs,
    timeout: u64,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    match args.command {
        PilotCommands::Get(args) => run_pilot_get(args, timeout, json).await,
        PilotCommands::Set(args) => run_pilot_set(args, timeout, json, strict).await,
    }
}

async fn run_pilot_get(args: PilotGetArgs, timeout: u64, json: bool) -> Result<(), CliError> {
    let ip = parse_ipv4(&args.ip)?;
    let handle = WizHandle::new(&args.mac, ip)?;

    let socket = WizSocket::open().await?;
    let wait = Duration::from_millis(timeout);

    let outcome = async {
        socket.send(&WizMessage::get_pilot(), &handle).await?;
        await_reply(&socket, wait).await
    }
    .await;
    socket.close();

    let result = outcome?;

    let formatter = get_formatter(json);
    println!("{}", formatter.format_pilot(&args.ip, &result));

    Ok(())
}

async fn run_pilot_set(
    args: PilotSetArgs,
    timeout: u64,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    let params = pilot_from_flags(&args)?;
    let wait = Duration::from_millis(timeout);

    if args.target == "all" {
        return run_pilot_set_all(&args, params, wait, json, strict).await;
    }

    let mac = match &args.mac {
        Some(mac) => mac,
        None => {
            return Err(CliError::InvalidArgument(
                "--mac is required unless the target is \"all\"".to_string(),
            ))
        }
    };

    let ip = parse_ipv4(&args.target)?;
    set_light(ip, mac, &params, wait).await?;

    println!("{} {} updated", "[OK]".green(), args.target);
    Ok(())
}

/// Send one setPilot and check the acknowledgement.
async fn set_light(
    ip: Ipv4Addr,
    mac: &str,
    params: &WizParams,
    wait: Duration,
) -> Result<(), CliError> {
    let handle = WizHandle::new(mac, ip)?;
    let socket = WizSocket::open().await?;

    let outcome = async {
        socket
            .send(&WizMessage::set_pilot(params.clone()), &handle)
            .await?;

        let result = await_reply(&socket, wait).await?;
        if result.success == Some(false) {
            return Err(CliError::Device(WizError {
                code: None,
                message: Some("light reported failure".to_string()),
            }));
        }
        Ok(())
    }
    .await;
    socket.close();

    outcome
}

async fn run_pilot_set_all(
    args: &PilotSetArgs,
    params: WizParams,
    wait: Duration,
    json: bool,
    strict: bool,
) -> Result<(), CliError> {
    let host_ip = parse_ipv4(required(&args.host_ip, "--host-ip")?)?;
    let host_mac = parse_host_mac(required(&args.host_mac, "--host-mac")?)?;
    let home_id = match args.home_id {
        Some(id) if id != 0 => id,
        _ => {
            return Err(CliError::InvalidArgument(
                "--home-id is required when the target is \"all\"".to_string(),
            ))
        }
    };

    let options = DiscoveryOptions {
        host_ip,
        host_mac,
        home_id,
        duration: Duration::from_secs(args.discovery_duration),
    };

    println!(
        "Discovering lights for {} seconds...",
        args.discovery_duration
    );
    let lights = discover_lights(&options).await?;

    if lights.is_empty() {
        return Err(CliError::NoLightsFound);
    }

    println!("Updating {} light(s)...", lights.len());

    let concurrency = args.concurrency.max(1);
    let results: Vec<(String, bool, String)> = stream::iter(lights)
        .map(|light| {
            let params = params.clone();
            async move {
                let outcome = match light.ip.parse::<Ipv4Addr>() {
                    Ok(ip) => set_light(ip, &light.mac, &params, wait).await,
                    Err(_) => Err(CliError::InvalidArgument(format!(
                        "'{}' is not an IPv4 address",
                        light.ip
                    ))),
                };

                match outcome {
                    Ok(()) => (light.ip, true, "updated".to_string()),
                    Err(e) => (light.ip, false, e.to_string()),
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let formatter = get_formatter(json);
    println!("{}", formatter.format_bulk_results(&results));

    let failed = results.iter().filter(|(_, ok, _)| !ok).count();
    if strict && failed > 0 {
        return Err(CliError::PartialFailure {
            succeeded: results.len() - failed,
            failed,
        });
    }

    Ok(())
}

/// Wait for a datagram carrying a result, skipping everything else.
///
/// Lights on the same network push syncPilot updates at any time, so the
/// first datagram is not necessarily the reply to our request.
pub(crate) async fn await_reply(socket: &WizSocket, wait: Duration) -> Result<WizResult, CliError> {
    let deadline = Instant::now() + wait;

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(CliError::Timeout("no reply from light".to_string()));
        }

        match socket.recv_timeout(remaining).await {
            Ok((message, _addr)) => {
                if let Some(error) = message.error {
                    return Err(CliError::Device(error));
                }
                if let Some(result) = message.result {
                    return Ok(result);
                }
                // Not a reply, keep waiting
            }
            Err(TransportError::Parse(e)) => {
                warn!("ignoring malformed datagram: {}", e);
            }
            Err(TransportError::Io(e)) if e.kind() == std::io::ErrorKind::TimedOut => {
                return Err(CliError::Timeout("no reply from light".to_string()));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn pilot_from_flags(args: &PilotSetArgs) -> Result<WizParams, CliError> {
    let mut params = WizParams::default();

    if args.on {
        params.state = Some(true);
    } else if args.off {
        params.state = Some(false);
    }

    params.r = args.r;
    params.g = args.g;
    params.b = args.b;
    params.c = args.cool;
    params.w = args.warm;
    params.temp = args.temp;
    params.dimming = args.dimming;
    params.scene_id = args.scene;
    params.speed = args.speed;

    if params == WizParams::default() {
        return Err(CliError::InvalidArgument(
            "nothing to change; pass --on/--off, --r/--g/--b, --temp, --dimming, --scene or --speed"
                .to_string(),
        ));
    }

    Ok(params)
}

fn required<'a>(value: &'a Option<String>, flag: &str) -> Result<&'a str, CliError> {
    match value {
        Some(v) => Ok(v),
        None => Err(CliError::InvalidArgument(format!(
            "{} is required when the target is \"all\"",
            flag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::PilotSetArgs;

    fn args() -> PilotSetArgs {
        PilotSetArgs {
            target: "192.168.1.50".to_string(),
            mac: None,
            on: false,
            off: false,
            r: None,
            g: None,
            b: None,
            cool: None,
            warm: None,
            temp: None,
            dimming: None,
            scene: None,
            speed: None,
            host_ip: None,
            host_mac: None,
            home_id: None,
            discovery_duration: 3,
            concurrency: 3,
        }
    }

    #[test]
    fn test_pilot_from_flags_requires_a_change() {
        let err = pilot_from_flags(&args()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn test_pilot_from_flags_on() {
        let mut a = args();
        a.on = true;

        let params = pilot_from_flags(&a).unwrap();
        assert_eq!(params.state, Some(true));
        assert_eq!(params.r, None);
    }

    #[test]
    fn test_pilot_from_flags_off() {
        let mut a = args();
        a.off = true;

        let params = pilot_from_flags(&a).unwrap();
        assert_eq!(params.state, Some(false));
    }

    #[test]
    fn test_pilot_from_flags_color_and_dimming() {
        let mut a = args();
        a.r = Some(255);
        a.g = Some(120);
        a.b = Some(0);
        a.dimming = Some(80);

        let params = pilot_from_flags(&a).unwrap();
        assert_eq!(params.r, Some(255));
        assert_eq!(params.g, Some(120));
        assert_eq!(params.b, Some(0));
        assert_eq!(params.dimming, Some(80));
        assert_eq!(params.state, None);
    }

    #[test]
    fn test_required_flags_for_set_all() {
        assert!(required(&None, "--host-ip").is_err());
        assert_eq!(
            required(&Some("192.168.1.2".to_string()), "--host-ip").unwrap(),
            "192.168.1.2"
        );
    }
}
