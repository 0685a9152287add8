//! Discover command implementation.

use std::io::{self, Write};
use std::time::Duration;

use colored::*;

use crate::cli::DiscoverArgs;
use crate::discovery::{discover_lights, watch_lights, DiscoveryOptions};
use crate::error::CliError;
use crate::output::{get_formatter, OutputFormatter};
use crate::types::{parse_host_mac, parse_ipv4, DiscoveredLight};

/// Run the discover command
pub async fn run_discover(args: DiscoverArgs, json: bool) -> Result<(), CliError> {
    if args.home_id == 0 {
        return Err(CliError::InvalidArgument(
            "--home-id must be a positive WiZ home id".to_string(),
        ));
    }

    let options = DiscoveryOptions {
        host_ip: parse_ipv4(&args.host_ip)?,
        host_mac: parse_host_mac(&args.host_mac)?,
        home_id: args.home_id,
        duration: Duration::from_secs(args.duration),
    };

    if args.watch {
        run_watch_mode(options, json).await
    } else {
        let formatter = get_formatter(json);
        run_oneshot_mode(options, formatter.as_ref()).await
    }
}

async fn run_oneshot_mode(
    options: DiscoveryOptions,
    formatter: &dyn OutputFormatter,
) -> Result<(), CliError> {
    println!(
        "Discovering lights for {} seconds...",
        options.duration.as_secs()
    );

    let lights = discover_lights(&options).await?;

    println!("{}", formatter.format_lights(&lights));

    if lights.is_empty() {
        return Err(CliError::NoLightsFound);
    }

    Ok(())
}

async fn run_watch_mode(options: DiscoveryOptions, json: bool) -> Result<(), CliError> {
    println!("Watching for lights (press Ctrl+C to stop)...\n");

    watch_lights(&options, move |light: DiscoveredLight| {
        if json {
            // One JSON object per line so the stream stays greppable
            println!(
                "{}",
                serde_json::to_string(&light).unwrap_or_else(|_| "{}".to_string())
            );
        } else {
            let seen = light.first_seen.with_timezone(&chrono::Local);
            println!(
                "[{}] {} at {}",
                seen.format("%H:%M:%S").to_string().dimmed(),
                light.mac.cyan(),
                light.ip
            );
        }

        io::stdout().flush().ok();
    })
    .await
}
