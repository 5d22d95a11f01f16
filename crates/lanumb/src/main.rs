mod cmd;
mod exit;
mod logging;
mod output;

use clap::{Args, Parser};
use lanumb_client::DEFAULT_RECEIVER;
use lanumb_transport::DEFAULT_PORT;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lanumb", version, about = "Query UMB weather stations over LAN")]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

/// Where the device is and how patiently to talk to it.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// Host name or IP address of the LAN converter.
    #[arg(long, env = "LANUMB_HOST", default_value = "10.0.1.26", global = true)]
    pub host: String,

    /// TCP port of the LAN converter.
    #[arg(long, env = "LANUMB_PORT", default_value_t = DEFAULT_PORT, global = true)]
    pub port: u16,

    /// UMB device address to query.
    #[arg(long, env = "LANUMB_RECEIVER", default_value_t = DEFAULT_RECEIVER, global = true)]
    pub receiver: u8,

    /// Per-read timeout while collecting a reply (e.g. 100ms, 1s).
    #[arg(long, default_value = "100ms", global = true)]
    pub read_timeout: String,

    /// Timeout for establishing the connection (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", global = true)]
    pub connect_timeout: String,

    /// Reject replies that are not addressed to this client.
    #[arg(long, global = true)]
    pub check_addressing: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.device, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
