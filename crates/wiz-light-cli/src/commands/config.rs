//! Configuration commands implementation.

use std::time::Duration;

use wiz_light_core::protocol::WizMessage;
use wiz_light_core::{WizHandle, WizSocket};

use crate::cli::{ConfigArgs, ConfigCommands, ConfigGetArgs, ConfigKind};
use crate::commands::pilot::await_reply;
use crate::error::CliError;
use crate::output::get_formatter;
use crate::types::parse_ipv4;

/// Run the config command
pub async fn run_config(args: ConfigArgs, timeout: u64, json: bool) -> Result<(), CliError> {
    match args.command {
        ConfigCommands::Get(args) => run_config_get(args, timeout, json).await,
    }
}

async fn run_config_get(args: ConfigGetArgs, timeout: u64, json: bool) -> Result<(), CliError> {
    let ip = parse_ipv4(&args.ip)?;
    let handle = WizHandle::new(&args.mac, ip)?;

    let request = match args.kind {
        ConfigKind::System => WizMessage::get_system_config(),
        ConfigKind::User => WizMessage::get_user_config(),
    };

    let socket = WizSocket::open().await?;
    let wait = Duration::from_millis(timeout);

    let outcome = async {
        socket.send(&request, &handle).await?;
        await_reply(&socket, wait).await
    }
    .await;
    socket.close();

    let result = outcome?;

    let formatter = get_formatter(json);
    println!("{}", formatter.format_config(&args.ip, &result));

    Ok(())
}
