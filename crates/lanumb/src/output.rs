use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lanumb_client::{DeviceInfo, Reading, StatusCode};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct ReadingOutput {
    pub channel: u16,
    pub status: u8,
    pub status_description: &'static str,
    /// `null` when the device sent no value for the channel.
    pub value: Option<f64>,
    pub value_type: Option<&'static str>,
    pub timestamp: String,
}

impl ReadingOutput {
    pub fn new(reading: &Reading, timestamp: &str) -> Self {
        Self {
            channel: reading.channel,
            status: reading.status.code(),
            status_description: reading.status.description(),
            value: reading.value.map(|v| v.as_f64()),
            value_type: reading.value.map(|v| v.type_name()),
            timestamp: timestamp.to_string(),
        }
    }
}

#[derive(Serialize)]
struct StatusOutput {
    receiver: u8,
    status: u8,
    description: &'static str,
    recognized: bool,
}

#[derive(Serialize)]
struct DescribeOutput {
    status: u8,
    description: &'static str,
    recognized: bool,
}

#[derive(Serialize)]
struct TimeOutput {
    receiver: u8,
    elapsed_seconds: u32,
}

#[derive(Serialize)]
struct InfoOutput {
    receiver: u8,
    selector: u8,
    status: u8,
    data: String,
    text: Option<String>,
}

pub fn print_readings(readings: &[Reading], format: OutputFormat) {
    let timestamp = now_unix_seconds();
    let rows: Vec<ReadingOutput> = readings
        .iter()
        .map(|r| ReadingOutput::new(r, &timestamp))
        .collect();

    match format {
        OutputFormat::Json => {
            for row in &rows {
                print_json(row);
            }
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["CHANNEL", "VALUE", "TYPE", "STATUS"]);
            for row in &rows {
                table.add_row(vec![
                    row.channel.to_string(),
                    display_value(row.value),
                    row.value_type.unwrap_or("-").to_string(),
                    row.status_description.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = rows
                .iter()
                .map(|row| format!("{}={}", row.channel, display_value(row.value)))
                .collect::<Vec<_>>()
                .join(" ");
            println!("{line}");
        }
    }
}

pub fn print_status(receiver: u8, status: StatusCode, format: OutputFormat) {
    let out = StatusOutput {
        receiver,
        status: status.code(),
        description: status.description(),
        recognized: status.is_recognized(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["RECEIVER", "STATUS", "DESCRIPTION"]);
            table.add_row(vec![
                out.receiver.to_string(),
                out.status.to_string(),
                out.description.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("status {}: {}", out.status, out.description),
    }
}

pub fn print_elapsed_time(receiver: u8, seconds: u32, format: OutputFormat) {
    let out = TimeOutput {
        receiver,
        elapsed_seconds: seconds,
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["RECEIVER", "ELAPSED (S)"]);
            table.add_row(vec![out.receiver.to_string(), out.elapsed_seconds.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("elapsed {}s", out.elapsed_seconds),
    }
}

pub fn print_device_info(receiver: u8, selector: u8, info: &DeviceInfo, format: OutputFormat) {
    let out = InfoOutput {
        receiver,
        selector,
        status: info.status.code(),
        data: hex(&info.data),
        text: printable_text(&info.data),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["SELECTOR", "STATUS", "DATA", "TEXT"]);
            table.add_row(vec![
                format!("0x{:02X}", out.selector),
                out.status.to_string(),
                out.data.clone(),
                out.text.clone().unwrap_or_default(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}", out.data),
    }
}

pub fn print_description(status: StatusCode, format: OutputFormat) {
    let out = DescribeOutput {
        status: status.code(),
        description: status.description(),
        recognized: status.is_recognized(),
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["STATUS", "DESCRIPTION"]);
            table.add_row(vec![out.status.to_string(), out.description.to_string()]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!("{}: {}", out.status, out.description),
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn display_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Space separated upper-case hex bytes.
pub fn hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Device info blocks are often ASCII padded with NULs or spaces.
fn printable_text(data: &[u8]) -> Option<String> {
    let text = std::str::from_utf8(data).ok()?;
    let text = text.trim_end_matches(['\0', ' ']);
    if text.is_empty() || text.chars().any(|c| c.is_control()) {
        return None;
    }
    Some(text.to_string())
}

pub fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
