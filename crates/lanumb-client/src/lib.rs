//! Typed queries against UMB devices.
//!
//! This is the "just works" layer. Connect to a device, ask for channel
//! readings, status or elapsed time, and get typed values back:
//!
//! ```no_run
//! use lanumb_client::{connect, DEFAULT_RECEIVER};
//! use lanumb_transport::DEFAULT_PORT;
//!
//! let mut client = connect("10.0.1.26", DEFAULT_PORT)?;
//! if let Some(reading) = client.query_channel(100, DEFAULT_RECEIVER)? {
//!     println!("channel {}: {:?}", reading.channel, reading.value);
//! }
//! # Ok::<(), lanumb_client::ClientError>(())
//! ```
//!
//! Every query returns `Ok(None)` when the device did not answer within
//! the receive budget, so a missing reply is never mistaken for a zero.

pub mod client;
pub mod connector;
pub mod error;
pub mod info;
pub mod response;
pub mod status;
pub mod value;

pub use client::{ClientConfig, UmbClient, DEFAULT_RECEIVER, MAX_CHANNELS_PER_REQUEST};
pub use connector::{connect, connect_with_config};
pub use error::{ClientError, Result};
pub use info::{DeviceInfo, InfoSelector};
pub use response::{
    decode_device_info, decode_elapsed_time, decode_multi, decode_reading, decode_status, Reading,
};
pub use status::{describe_status, StatusCode};
pub use value::{decode_value, TypeTag, Value};
