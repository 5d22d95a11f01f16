//! Decoders for the payloads of validated replies.
//!
//! Each reply payload starts with the status of the command it answers.
//! A non-success status followed by nothing else means the device refused
//! the whole request, which is reported as [`ClientError::Rejected`].

use bytes::Bytes;
use lanumb_frame::{
    command_name, PayloadReader, DEVICE_INFO, ELAPSED_TIME, MULTI_CHANNEL_DATA, ONLINE_DATA,
    STATUS,
};
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::info::DeviceInfo;
use crate::status::StatusCode;
use crate::value::{decode_value, Value};

/// One channel's measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Status the device reported for this channel.
    pub status: StatusCode,
    pub channel: u16,
    /// `None` when the device reported an error for the channel and sent
    /// no value.
    pub value: Option<Value>,
}

/// Decode an online data reply: `status, channel (u16), type tag, value`.
pub fn decode_reading(payload: &[u8]) -> Result<Reading> {
    let mut reader = PayloadReader::new(payload);
    // The command status doubles as the channel status, so only peek at it.
    read_command_status(&mut reader.clone(), ONLINE_DATA)?;
    read_reading(&mut reader)
}

/// Decode a multi-channel reply: `status, count`, then `count` entries of
/// `sub-length` followed by that many bytes of one reading.
pub fn decode_multi(payload: &[u8]) -> Result<Vec<Reading>> {
    let mut reader = PayloadReader::new(payload);
    read_command_status(&mut reader, MULTI_CHANNEL_DATA)?;

    let count = reader.read_u8()?;
    let mut readings = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let len = reader.read_u8()?;
        let entry = reader.read_bytes(usize::from(len))?;
        readings.push(read_reading(&mut PayloadReader::new(entry))?);
    }

    if !reader.is_empty() {
        debug!(
            trailing = reader.remaining(),
            "ignoring bytes after last channel"
        );
    }
    Ok(readings)
}

/// Decode a status reply: `status, device status`.
pub fn decode_status(payload: &[u8]) -> Result<StatusCode> {
    let mut reader = PayloadReader::new(payload);
    read_command_status(&mut reader, STATUS)?;
    Ok(StatusCode::from(reader.read_u8()?))
}

/// Decode an elapsed-time reply: `status, seconds (u24)`.
pub fn decode_elapsed_time(payload: &[u8]) -> Result<u32> {
    let mut reader = PayloadReader::new(payload);
    read_command_status(&mut reader, ELAPSED_TIME)?;
    Ok(reader.read_u24_le()?)
}

/// Decode a device information reply without interpreting its data.
pub fn decode_device_info(payload: &[u8]) -> Result<DeviceInfo> {
    let mut reader = PayloadReader::new(payload);
    let status = read_command_status(&mut reader, DEVICE_INFO)?;
    Ok(DeviceInfo {
        status,
        data: Bytes::copy_from_slice(reader.rest()),
    })
}

fn read_command_status(reader: &mut PayloadReader<'_>, command: u8) -> Result<StatusCode> {
    let status = StatusCode::from(reader.read_u8()?);
    if !status.is_success() && reader.is_empty() {
        return Err(ClientError::Rejected {
            command: command_name(command),
            status,
        });
    }
    Ok(status)
}

fn read_reading(reader: &mut PayloadReader<'_>) -> Result<Reading> {
    let status = StatusCode::from(reader.read_u8()?);
    let channel = reader.read_u16_le()?;

    if !status.is_success() && reader.is_empty() {
        debug!(channel, %status, "channel reported no value");
        return Ok(Reading {
            status,
            channel,
            value: None,
        });
    }

    let value = decode_value(reader)?;
    Ok(Reading {
        status,
        channel,
        value: Some(value),
    })
}

#[cfg(test)]
mod tests {
    use lanumb_frame::{FrameError, MalformedReason};

    use super::*;

    #[test]
    fn single_reading() {
        let payload = [0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F];
        let reading = decode_reading(&payload).unwrap();

        assert_eq!(reading.status, StatusCode::Ok);
        assert_eq!(reading.channel, 100);
        assert_eq!(reading.value, Some(Value::F32(1.0)));
    }

    #[test]
    fn zero_is_a_value_not_an_absence() {
        let payload = [0x00, 0x64, 0x00, 0x10, 0x00];
        let reading = decode_reading(&payload).unwrap();
        assert_eq!(reading.value, Some(Value::U8(0)));
    }

    #[test]
    fn channel_error_without_value() {
        let payload = [0x24, 0x39, 0x30];
        let reading = decode_reading(&payload).unwrap();

        assert_eq!(reading.status, StatusCode::InvalidChannel);
        assert_eq!(reading.channel, 12345);
        assert_eq!(reading.value, None);
    }

    #[test]
    fn rejected_request() {
        let err = decode_reading(&[0x10]).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Rejected {
                command: "ONLINE_DATA",
                status: StatusCode::UnknownCommand
            }
        ));
    }

    #[test]
    fn multi_channel_preserves_order() {
        let payload = [
            0x00, 0x02, // status, count
            0x05, 0x00, 0x64, 0x00, 0x10, 0x05, // channel 100: u8 5
            0x05, 0x00, 0x6E, 0x00, 0x10, 0x07, // channel 110: u8 7
        ];
        let readings = decode_multi(&payload).unwrap();

        let values: Vec<f64> = readings
            .iter()
            .map(|r| r.value.map_or(f64::NAN, |v| v.as_f64()))
            .collect();
        assert_eq!(values, vec![5.0, 7.0]);
        assert_eq!(readings[0].channel, 100);
        assert_eq!(readings[1].channel, 110);
    }

    #[test]
    fn multi_channel_mixed_types_and_errors() {
        let mut payload = vec![0x00, 0x03];
        payload.extend_from_slice(&[0x08, 0x00, 0x64, 0x00, 0x16]);
        payload.extend_from_slice(&21.5f32.to_le_bytes());
        payload.extend_from_slice(&[0x03, 0x24, 0x65, 0x00]);
        payload.extend_from_slice(&[0x06, 0x00, 0x66, 0x00, 0x13, 0xF6, 0xFF]);

        let readings = decode_multi(&payload).unwrap();

        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].value, Some(Value::F32(21.5)));
        assert_eq!(readings[1].status, StatusCode::InvalidChannel);
        assert_eq!(readings[1].value, None);
        assert_eq!(readings[2].value, Some(Value::I16(-10)));
    }

    #[test]
    fn multi_channel_truncated_entry() {
        let payload = [0x00, 0x02, 0x05, 0x00, 0x64, 0x00, 0x10, 0x05, 0x05, 0x00];
        let err = decode_multi(&payload).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::Malformed(
                MalformedReason::TruncatedPayload { .. }
            ))
        ));
    }

    #[test]
    fn multi_channel_missing_entries() {
        let payload = [0x00, 0x03, 0x05, 0x00, 0x64, 0x00, 0x10, 0x05];
        let err = decode_multi(&payload).unwrap_err();
        assert!(matches!(
            err,
            ClientError::Frame(FrameError::Malformed(
                MalformedReason::TruncatedPayload { .. }
            ))
        ));
    }

    #[test]
    fn status_reply() {
        assert_eq!(decode_status(&[0x00, 0x00]).unwrap(), StatusCode::Ok);
        assert_eq!(
            decode_status(&[0x00, 0x29]).unwrap(),
            StatusCode::Undervoltage
        );
        assert_eq!(
            decode_status(&[0x00, 0xC8]).unwrap(),
            StatusCode::Unrecognized(200)
        );
    }

    #[test]
    fn elapsed_time_reply() {
        assert_eq!(decode_elapsed_time(&[0x00, 0x10, 0x0E, 0x00]).unwrap(), 3600);
        assert_eq!(
            decode_elapsed_time(&[0x00, 0xFF, 0xFF, 0xFF]).unwrap(),
            0xFF_FFFF
        );
    }

    #[test]
    fn elapsed_time_truncated() {
        let err = decode_elapsed_time(&[0x00, 0x10]).unwrap_err();
        assert!(matches!(err, ClientError::Frame(_)));
    }

    #[test]
    fn device_info_passes_data_through() {
        let info = decode_device_info(&[0x00, 0x15, 0x2A]).unwrap();
        assert_eq!(info.status, StatusCode::Ok);
        assert_eq!(info.data.as_ref(), &[0x15, 0x2A]);
    }
}
