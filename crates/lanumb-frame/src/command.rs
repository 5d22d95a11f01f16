//! UMB command codes used by this client.
//!
//! All of them are read-only queries. Every command is sent with
//! [`COMMAND_VERSION`].

/// Online data request for one channel.
pub const ONLINE_DATA: u8 = 0x23;

/// Device status request.
pub const STATUS: u8 = 0x26;

/// Elapsed time since the device started.
pub const ELAPSED_TIME: u8 = 0x28;

/// Device information (identification, description, versions, ...).
pub const DEVICE_INFO: u8 = 0x2D;

/// Online data request for several channels at once.
pub const MULTI_CHANNEL_DATA: u8 = 0x2F;

/// Command version sent with every request.
pub const COMMAND_VERSION: u8 = 0x10;

/// Returns a human-readable name for a command code.
pub fn command_name(code: u8) -> &'static str {
    match code {
        ONLINE_DATA => "ONLINE_DATA",
        STATUS => "STATUS",
        ELAPSED_TIME => "ELAPSED_TIME",
        DEVICE_INFO => "DEVICE_INFO",
        MULTI_CHANNEL_DATA => "MULTI_CHANNEL_DATA",
        _ => "UNKNOWN",
    }
}
