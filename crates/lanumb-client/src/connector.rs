use std::time::Duration;

use lanumb_transport::{TcpTransport, DEFAULT_CONNECT_TIMEOUT};

use crate::client::{ClientConfig, UmbClient};
use crate::error::Result;

/// Connect to a UMB device over TCP with default settings.
pub fn connect(host: &str, port: u16) -> Result<UmbClient<TcpTransport>> {
    connect_with_config(host, port, DEFAULT_CONNECT_TIMEOUT, ClientConfig::default())
}

/// Connect with explicit configuration.
pub fn connect_with_config(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    config: ClientConfig,
) -> Result<UmbClient<TcpTransport>> {
    let transport = TcpTransport::connect(host, port, connect_timeout)?;
    Ok(UmbClient::with_config(transport, config))
}
