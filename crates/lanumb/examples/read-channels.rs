//! Read a few channels from a weather station and print them.
//!
//! Usage: `cargo run --example read-channels -- <host> [channel...]`

use lanumb::client::{connect, ClientError, DEFAULT_RECEIVER};

fn main() -> Result<(), ClientError> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "10.0.1.26".to_string());
    let mut channels: Vec<u16> = args.filter_map(|arg| arg.parse().ok()).collect();
    if channels.is_empty() {
        // Temperature, relative humidity, air pressure.
        channels = vec![100, 200, 300];
    }

    let mut client = connect(&host, lanumb::transport::DEFAULT_PORT)?;

    match client.query_status(DEFAULT_RECEIVER)? {
        Some(status) => println!("device status: {status}"),
        None => println!("device did not answer the status query"),
    }

    match client.query_channels_chunked(&channels, DEFAULT_RECEIVER)? {
        Some(readings) => {
            for reading in readings {
                match reading.value {
                    Some(value) => {
                        println!("{:>5}: {value} ({})", reading.channel, value.type_name())
                    }
                    None => println!("{:>5}: {}", reading.channel, reading.status),
                }
            }
        }
        None => println!("no reply"),
    }

    client.close()
}
