//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// WiZ Light CLI - Command-line control of WiZ smart lights
#[derive(Parser, Debug)]
#[command(name = "wiz-light-cli")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Reply timeout in milliseconds
    #[arg(long, global = true, default_value = "5000", env = "WIZ_CLI_TIMEOUT")]
    pub timeout: u64,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Exit non-zero on any partial failure (for "all" targets)
    #[arg(long, global = true)]
    pub strict: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover lights on the network
    Discover(DiscoverArgs),

    /// Read or change light state
    Pilot(PilotArgs),

    /// Read device configuration
    Config(ConfigArgs),

    /// Print state updates pushed by registered lights
    Listen(ListenArgs),
}

// ==================== Discover ====================

#[derive(Args, Debug)]
pub struct DiscoverArgs {
    /// Host IPv4 address the lights should reply to
    #[arg(long)]
    pub host_ip: String,

    /// Host MAC, as aa:bb:cc:dd:ee:ff or 12 hex digits
    #[arg(long)]
    pub host_mac: String,

    /// Home id the lights are paired to
    #[arg(long)]
    pub home_id: u32,

    /// Discovery duration in seconds (ignored in watch mode)
    #[arg(short, long, default_value = "5")]
    pub duration: u64,

    /// Watch mode - keep listening until Ctrl+C
    #[arg(short, long)]
    pub watch: bool,
}

// ==================== Pilot ====================

#[derive(Args, Debug)]
pub struct PilotArgs {
    #[command(subcommand)]
    pub command: PilotCommands,
}

#[derive(Subcommand, Debug)]
pub enum PilotCommands {
    /// Get the current state of one light
    Get(PilotGetArgs),

    /// Change state on one light or on every discovered light
    Set(PilotSetArgs),
}

#[derive(Args, Debug)]
pub struct PilotGetArgs {
    /// Light IP address
    pub ip: String,

    /// Light MAC (12 hex digits)
    pub mac: String,
}

#[derive(Args, Debug)]
pub struct PilotSetArgs {
    /// Light IP address, or "all" for every discovered light
    pub target: String,

    /// Light MAC (12 hex digits), required unless target is "all"
    #[arg(long)]
    pub mac: Option<String>,

    /// Turn the light on
    #[arg(long, conflicts_with = "off")]
    pub on: bool,

    /// Turn the light off
    #[arg(long)]
    pub off: bool,

    /// Red channel, 0-255
    #[arg(long)]
    pub r: Option<u8>,

    /// Green channel, 0-255
    #[arg(long)]
    pub g: Option<u8>,

    /// Blue channel, 0-255
    #[arg(long)]
    pub b: Option<u8>,

    /// Cold white channel, 0-255
    #[arg(long)]
    pub cool: Option<u8>,

    /// Warm white channel, 0-255
    #[arg(long)]
    pub warm: Option<u8>,

    /// White color temperature in Kelvin
    #[arg(long)]
    pub temp: Option<u32>,

    /// Brightness percentage, 10-100
    #[arg(long)]
    pub dimming: Option<u8>,

    /// Scene to play
    #[arg(long)]
    pub scene: Option<u32>,

    /// Scene playback speed, 0-200
    #[arg(long)]
    pub speed: Option<u8>,

    /// Host IPv4 address for discovery when target is "all"
    #[arg(long)]
    pub host_ip: Option<String>,

    /// Host MAC for discovery when target is "all"
    #[arg(long)]
    pub host_mac: Option<String>,

    /// Home id for discovery when target is "all"
    #[arg(long)]
    pub home_id: Option<u32>,

    /// Discovery duration when target is "all" (seconds)
    #[arg(long, default_value = "3")]
    pub discovery_duration: u64,

    /// Concurrency limit when fanning out to "all"
    #[arg(long, default_value = "3")]
    pub concurrency: usize,
}

// ==================== Config ====================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Fetch a configuration record from a light
    Get(ConfigGetArgs),
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    /// Light IP address
    pub ip: String,

    /// Light MAC (12 hex digits)
    pub mac: String,

    /// Which configuration record to fetch
    #[arg(long, value_enum, default_value = "system")]
    pub kind: ConfigKind,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ConfigKind {
    /// Hardware and firmware information
    System,
    /// User-tunable settings
    User,
}

// ==================== Listen ====================

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Only show updates from this light IP
    pub ip: Option<String>,

    /// Exit after this many updates (default: run until Ctrl+C)
    #[arg(short, long)]
    pub count: Option<u64>,
}
