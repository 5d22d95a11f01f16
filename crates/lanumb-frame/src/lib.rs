//! UMB protocol framing.
//!
//! Every UMB exchange is one frame each way:
//! - a fixed header carrying the receiver and sender addresses
//! - an STX/ETX delimited body with command code, command version and payload
//! - a CRC-16 over everything before it, then EOT
//!
//! Frames are validated field by field so a corrupted reply is reported
//! with the exact part of the frame that was wrong.

pub mod codec;
pub mod command;
pub mod crc;
pub mod error;
pub mod reader;

pub use codec::{
    decode_frame, encode_frame, Address, Frame, Header, FRAME_OVERHEAD, MAX_PAYLOAD,
};
pub use command::{
    command_name, COMMAND_VERSION, DEVICE_INFO, ELAPSED_TIME, MULTI_CHANNEL_DATA, ONLINE_DATA,
    STATUS,
};
pub use crc::{crc16, Crc16};
pub use error::{FrameError, MalformedReason, Result};
pub use reader::PayloadReader;
