use std::ops::RangeInclusive;
use std::time::Duration;

use clap::{Args, Subcommand};
use lanumb_client::{connect_with_config, ClientConfig, UmbClient};
use lanumb_transport::{ReceiveBudget, TcpTransport};

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;
use crate::DeviceArgs;

pub mod describe;
pub mod info;
pub mod read;
pub mod status;
pub mod time;
pub mod version;
pub mod watch;

/// Channel numbers UMB devices assign to measurements.
pub const CHANNEL_RANGE: RangeInclusive<u16> = 100..=29999;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read the current value of one or more channels.
    Read(ReadArgs),
    /// Poll channels and print whenever a value changes.
    Watch(WatchArgs),
    /// Show the device status.
    Status(StatusArgs),
    /// Show the time the device has been running.
    Time(TimeArgs),
    /// Dump a block of device information.
    Info(InfoArgs),
    /// Look up the meaning of a status code (no device needed).
    Describe(DescribeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, device: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Read(args) => read::run(args, device, format),
        Command::Watch(args) => watch::run(args, device, format),
        Command::Status(args) => status::run(args, device, format),
        Command::Time(args) => time::run(args, device, format),
        Command::Info(args) => info::run(args, device, format),
        Command::Describe(args) => describe::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    /// Channel numbers (100-29999).
    #[arg(required = true, value_name = "CHANNEL")]
    pub channels: Vec<u16>,
    /// Send one online-data request per channel instead of multi-channel requests.
    #[arg(long)]
    pub single: bool,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Channel numbers (100-29999).
    #[arg(required = true, value_name = "CHANNEL")]
    pub channels: Vec<u16>,
    /// Polling interval (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub interval: String,
    /// Exit after printing N changes.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug, Default)]
pub struct StatusArgs {}

#[derive(Args, Debug, Default)]
pub struct TimeArgs {}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// identification, description, versions, channels, or a raw code (e.g. 0x16).
    #[arg(long, default_value = "identification")]
    pub selector: String,
}

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Status code (0-255).
    pub code: u8,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open a client for the device the global arguments point at.
pub fn connect(device: &DeviceArgs) -> CliResult<UmbClient<TcpTransport>> {
    let read_timeout = parse_duration(&device.read_timeout)?;
    let connect_timeout = parse_duration(&device.connect_timeout)?;
    let config = ClientConfig {
        receive: ReceiveBudget {
            read_timeout,
            ..ReceiveBudget::default()
        },
        check_addressing: device.check_addressing,
    };

    connect_with_config(&device.host, device.port, connect_timeout, config)
        .map_err(|err| client_error("connect failed", err))
}

pub fn validate_channels(channels: &[u16]) -> CliResult<()> {
    match channels.iter().find(|&&c| !CHANNEL_RANGE.contains(&c)) {
        Some(channel) => Err(CliError::new(
            USAGE,
            format!(
                "channel {channel} out of range ({}-{})",
                CHANNEL_RANGE.start(),
                CHANNEL_RANGE.end()
            ),
        )),
        None => Ok(()),
    }
}

/// Parse `500ms`, `2s` or a bare number of seconds.
pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = match input.strip_suffix("ms") {
        Some(number) => (number, true),
        None => (input.strip_suffix('s').unwrap_or(input), false),
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
