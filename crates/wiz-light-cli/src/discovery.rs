//! Discovery helpers for the CLI.
//!
//! Thin wrapper around core's discovery service with CLI-specific types.

use std::net::Ipv4Addr;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::sleep;
use wiz_light_core::{DiscoveryService, WizHandle};

use crate::error::CliError;
use crate::types::DiscoveredLight;

/// Discovery options
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// IPv4 address of this host, sent in the registration broadcast
    pub host_ip: Ipv4Addr,
    /// MAC address of this host
    pub host_mac: [u8; 6],
    /// WiZ home id the lights belong to
    pub home_id: u32,
    /// Discovery duration
    pub duration: Duration,
}

/// Discover lights on the network.
///
/// Broadcasts a registration message, collects replies for the configured
/// duration, then stops the service and returns every light seen.
pub async fn discover_lights(options: &DiscoveryOptions) -> Result<Vec<DiscoveredLight>, CliError> {
    let service = DiscoveryService::new(options.host_ip, options.host_mac);
    let (tx, mut rx) = mpsc::unbounded_channel();

    service
        .start(options.home_id, move |handle: WizHandle| {
            let _ = tx.send((handle, Utc::now()));
        })
        .await?;

    sleep(options.duration).await;
    service.stop().await;

    let mut lights = Vec::new();
    while let Ok((handle, seen)) = rx.try_recv() {
        lights.push(DiscoveredLight::new(&handle, seen));
    }
    Ok(lights)
}

/// Watch for lights continuously, calling the callback for each new one.
///
/// Runs until Ctrl+C.
pub async fn watch_lights<F>(options: &DiscoveryOptions, mut on_light: F) -> Result<(), CliError>
where
    F: FnMut(DiscoveredLight),
{
    let service = DiscoveryService::new(options.host_ip, options.host_mac);
    let (tx, mut rx) = mpsc::unbounded_channel();

    service
        .start(options.home_id, move |handle: WizHandle| {
            let _ = tx.send((handle, Utc::now()));
        })
        .await?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            received = rx.recv() => match received {
                Some((handle, seen)) => on_light(DiscoveredLight::new(&handle, seen)),
                None => break,
            },
        }
    }

    service.stop().await;
    Ok(())
}
