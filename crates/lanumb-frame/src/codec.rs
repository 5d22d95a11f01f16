use bytes::{BufMut, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::command::COMMAND_VERSION;
use crate::crc::crc16;
use crate::error::{FrameError, MalformedReason, Result};

/// Start of header.
pub const SOH: u8 = 0x01;
/// Start of the command body.
pub const STX: u8 = 0x02;
/// End of the command body.
pub const ETX: u8 = 0x03;
/// End of frame.
pub const EOT: u8 = 0x04;
/// Protocol version 1.0.
pub const PROTOCOL_VERSION: u8 = 0x10;

/// Bytes outside the length-counted section: header (7), STX, ETX,
/// checksum (2) and EOT. A frame is `length + FRAME_OVERHEAD` bytes long.
pub const FRAME_OVERHEAD: usize = 12;

/// Largest payload the one-byte length field can describe, after the
/// command code and command version it also counts.
pub const MAX_PAYLOAD: usize = u8::MAX as usize - 2;

const LENGTH_OFFSET: usize = 6;
const STX_OFFSET: usize = 7;
const COMMAND_OFFSET: usize = 8;
const PAYLOAD_OFFSET: usize = 10;
/// Checksum (2) and EOT after the checksummed part.
const TRAILER_SIZE: usize = 3;

/// A bus address: device id plus device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub id: u8,
    pub class: u8,
}

impl Address {
    /// Identity this client uses as the sender of every request
    /// (id 1 in the master/PC class 0xF).
    pub const CLIENT: Address = Address {
        id: 0x01,
        class: 0xF0,
    };

    /// Device class requests are addressed to (weather station class 7).
    pub const DEVICE_CLASS: u8 = 0x70;

    /// Address of device `id` in the weather station class.
    pub const fn device(id: u8) -> Self {
        Self {
            id,
            class: Self::DEVICE_CLASS,
        }
    }
}

/// Routing part of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub to: Address,
    pub from: Address,
}

impl Header {
    /// Header of a request from this client to device `receiver`.
    pub const fn request(receiver: u8) -> Self {
        Self {
            to: Address::device(receiver),
            from: Address::CLIENT,
        }
    }

    /// The header a reply to this frame carries.
    pub const fn reversed(self) -> Self {
        Self {
            to: self.from,
            from: self.to,
        }
    }
}

/// One UMB frame, request or reply.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub header: Header,
    pub command: u8,
    pub command_version: u8,
    /// Payload between the command version and ETX.
    pub payload: Bytes,
}

impl Frame {
    /// Create a frame with the default command version.
    pub fn new(header: Header, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            header,
            command,
            command_version: COMMAND_VERSION,
            payload: payload.into(),
        }
    }

    /// Create a request from this client to device `receiver`.
    pub fn request(receiver: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self::new(Header::request(receiver), command, payload)
    }

    /// Value of the length field.
    pub fn length_field(&self) -> usize {
        2 + self.payload.len()
    }

    /// The total wire size of this frame.
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.length_field()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format (all integers little-endian):
/// ```text
/// offset  field       value
/// 0       SOH         0x01
/// 1       VER         0x10
/// 2..4    TO, class
/// 4..6    FROM, class
/// 6       LEN
/// 7       STX         0x02
/// 8       CMD
/// 9       CMD-VER
/// 10..    data
/// 8+LEN   ETX         0x03
/// 9+LEN   CRC (2B)
/// 11+LEN  EOT         0x04
/// ```
/// `LEN` counts CMD, CMD VER and the payload. The CRC covers SOH through ETX.
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) -> Result<()> {
    if frame.payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: frame.payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let start = dst.len();
    dst.reserve(frame.wire_size());
    dst.put_u8(SOH);
    dst.put_u8(PROTOCOL_VERSION);
    dst.put_u8(frame.header.to.id);
    dst.put_u8(frame.header.to.class);
    dst.put_u8(frame.header.from.id);
    dst.put_u8(frame.header.from.class);
    dst.put_u8(frame.length_field() as u8);
    dst.put_u8(STX);
    dst.put_u8(frame.command);
    dst.put_u8(frame.command_version);
    dst.put_slice(&frame.payload);
    dst.put_u8(ETX);

    let crc = crc16(&dst[start..]);
    dst.put_u16_le(crc);
    dst.put_u8(EOT);
    Ok(())
}

/// Validate a received reply and extract its frame.
///
/// `raw` is everything the transport collected for this exchange. If it
/// holds more than one frame, the leading frames are left over from
/// earlier exchanges and are dropped one by one, each by its own length
/// field; the most recent frame wins.
pub fn decode_frame(raw: &[u8], command: u8, command_version: u8) -> Result<Frame> {
    if raw.is_empty() {
        return Err(FrameError::NoDataReceived);
    }

    let mut frame = raw;
    let mut length = read_length(frame)?;
    while frame.len() > length + FRAME_OVERHEAD {
        let stale = length + FRAME_OVERHEAD;
        warn!(stale, "dropping stale frame ahead of reply");
        frame = &frame[stale..];
        length = read_length(frame)?;
    }

    let frame_len = length + FRAME_OVERHEAD;
    if frame.len() < frame_len {
        return Err(malformed(MalformedReason::Length));
    }

    let checked = frame_len - TRAILER_SIZE;
    let calculated = crc16(&frame[..checked]);
    let received = u16::from_le_bytes([frame[checked], frame[checked + 1]]);
    if calculated != received {
        return Err(malformed(MalformedReason::Checksum {
            calculated,
            received,
        }));
    }

    if frame[0] != SOH {
        return Err(malformed(MalformedReason::StartMarker));
    }
    if frame[1] != PROTOCOL_VERSION {
        return Err(malformed(MalformedReason::Version));
    }
    if frame[STX_OFFSET] != STX {
        return Err(malformed(MalformedReason::InnerStart));
    }
    if frame[COMMAND_OFFSET] != command {
        return Err(malformed(MalformedReason::Command));
    }
    if frame[COMMAND_OFFSET + 1] != command_version {
        return Err(malformed(MalformedReason::CommandVersion));
    }
    if frame[frame_len - 1] != EOT {
        return Err(malformed(MalformedReason::EndMarker));
    }

    trace!(command, length, "frame validated");

    Ok(Frame {
        header: Header {
            to: Address {
                id: frame[2],
                class: frame[3],
            },
            from: Address {
                id: frame[4],
                class: frame[5],
            },
        },
        command,
        command_version,
        payload: Bytes::copy_from_slice(&frame[PAYLOAD_OFFSET..COMMAND_OFFSET + length]),
    })
}

/// Read the length field and check that it points at ETX.
fn read_length(frame: &[u8]) -> Result<usize> {
    let length = frame
        .get(LENGTH_OFFSET)
        .map(|&len| usize::from(len))
        .ok_or(malformed(MalformedReason::Length))?;
    if length < 2 || frame.get(COMMAND_OFFSET + length) != Some(&ETX) {
        return Err(malformed(MalformedReason::Length));
    }
    Ok(length)
}

fn malformed(reason: MalformedReason) -> FrameError {
    FrameError::Malformed(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{ONLINE_DATA, STATUS};

    fn reply(command: u8, payload: &[u8]) -> BytesMut {
        let frame = Frame::new(
            Header::request(1).reversed(),
            command,
            Bytes::copy_from_slice(payload),
        );
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();
        buf
    }

    #[test]
    fn encodes_online_data_request_byte_exact() {
        let frame = Frame::request(1, ONLINE_DATA, 100u16.to_le_bytes().to_vec());
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();

        assert_eq!(
            buf.as_ref(),
            &[
                0x01, 0x10, 0x01, 0x70, 0x01, 0xF0, 0x04, 0x02, 0x23, 0x10, 0x64, 0x00, 0x03, 0x61,
                0xD9, 0x04
            ]
        );
        assert_eq!(buf.len(), frame.wire_size());
    }

    #[test]
    fn decodes_reference_reply() {
        let raw = [
            0x01, 0x10, 0x01, 0xF0, 0x01, 0x70, 0x0A, 0x02, 0x23, 0x10, 0x00, 0x64, 0x00, 0x16,
            0x00, 0x00, 0x80, 0x3F, 0x03, 0xDD, 0xAD, 0x04,
        ];

        let frame = decode_frame(&raw, ONLINE_DATA, COMMAND_VERSION).unwrap();

        assert_eq!(frame.header.to, Address::CLIENT);
        assert_eq!(frame.header.from, Address::device(1));
        assert_eq!(
            frame.payload.as_ref(),
            &[0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn encode_decode_roundtrip() {
        let payloads: [&[u8]; 4] = [b"", b"\x15", b"\x02\x64\x00\x6E\x00", &[0xAB; MAX_PAYLOAD]];
        for payload in payloads {
            let frame = Frame::request(7, 0x2F, Bytes::copy_from_slice(payload));
            let mut buf = BytesMut::new();
            encode_frame(&frame, &mut buf).unwrap();

            let decoded = decode_frame(&buf, 0x2F, COMMAND_VERSION).unwrap();
            assert_eq!(decoded, frame);
        }
    }

    #[test]
    fn oversized_payload_rejected() {
        let frame = Frame::request(1, ONLINE_DATA, vec![0u8; MAX_PAYLOAD + 1]);
        let mut buf = BytesMut::new();
        let err = encode_frame(&frame, &mut buf).unwrap_err();

        assert!(matches!(
            err,
            FrameError::PayloadTooLarge { size: 254, max: 253 }
        ));
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_input_is_no_data() {
        let err = decode_frame(&[], STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::NoDataReceived));
    }

    #[test]
    fn short_input_is_length_error() {
        let err = decode_frame(&[0x01, 0x10, 0x01], STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::Length)));
    }

    #[test]
    fn length_not_pointing_at_etx() {
        let mut raw = reply(STATUS, &[0x00, 0x00]);
        raw[LENGTH_OFFSET] += 1;

        let err = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::Length)));
    }

    #[test]
    fn length_below_command_bytes_rejected() {
        let raw = [0x01, 0x10, 0x01, 0xF0, 0x01, 0x70, 0x00, 0x02, 0x03, 0x00, 0x00, 0x04];
        let err = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::Length)));
    }

    #[test]
    fn truncated_frame_rejected() {
        let raw = reply(STATUS, &[0x00, 0x00]);
        let err = decode_frame(&raw[..raw.len() - 1], STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::Length)));
    }

    #[test]
    fn stale_frame_is_dropped() {
        let mut raw = reply(STATUS, &[0x00, 0x2A]);
        raw.extend_from_slice(&reply(STATUS, &[0x00, 0x00]));

        let frame = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x00, 0x00]);
    }

    #[test]
    fn shorter_stale_frame_is_dropped() {
        let mut raw = reply(STATUS, &[0x00, 0x00]);
        raw.extend_from_slice(&reply(
            ONLINE_DATA,
            &[0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F],
        ));

        let frame = decode_frame(&raw, ONLINE_DATA, COMMAND_VERSION).unwrap();
        assert_eq!(
            frame.payload.as_ref(),
            &[0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F]
        );
    }

    #[test]
    fn longer_stale_frame_is_dropped() {
        let mut raw = reply(ONLINE_DATA, &[0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F]);
        raw.extend_from_slice(&reply(ONLINE_DATA, &[0x00, 0x65, 0x00, 0x10, 0x07]));

        let frame = decode_frame(&raw, ONLINE_DATA, COMMAND_VERSION).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x00, 0x65, 0x00, 0x10, 0x07]);
    }

    #[test]
    fn several_stale_frames_are_dropped() {
        let mut raw = reply(ONLINE_DATA, &[0x00, 0x64, 0x00, 0x10, 0x01]);
        raw.extend_from_slice(&reply(STATUS, &[0x00, 0x28]));
        raw.extend_from_slice(&reply(STATUS, &[0x00, 0x00]));

        let frame = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap();
        assert_eq!(frame.payload.as_ref(), &[0x00, 0x00]);
    }

    #[test]
    fn partial_reply_after_stale_frame_rejected() {
        let mut raw = reply(STATUS, &[0x00, 0x00]);
        let fresh = reply(STATUS, &[0x00, 0x00]);
        raw.extend_from_slice(&fresh[..fresh.len() - 2]);

        let err = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::Length)));
    }

    #[test]
    fn single_bit_flips_fail_checksum() {
        let raw = reply(ONLINE_DATA, &[0x00, 0x64, 0x00, 0x16, 0x00, 0x00, 0x80, 0x3F]);
        let length = usize::from(raw[LENGTH_OFFSET]);
        let etx = COMMAND_OFFSET + length;

        // Everything except the length byte, ETX and EOT, which have
        // their own checks.
        let eot = raw.len() - 1;
        let positions = (0..raw.len()).filter(|&i| i != LENGTH_OFFSET && i != etx && i != eot);
        for index in positions {
            for bit in 0..8 {
                let mut tampered = raw.clone();
                tampered[index] ^= 1 << bit;
                let err = decode_frame(&tampered, ONLINE_DATA, COMMAND_VERSION).unwrap_err();
                assert!(
                    matches!(
                        err,
                        FrameError::Malformed(MalformedReason::Checksum { .. })
                    ),
                    "byte {index} bit {bit}: {err}"
                );
            }
        }
    }

    #[test]
    fn field_checks_after_checksum() {
        let cases = [
            (0usize, 0x02u8, MalformedReason::StartMarker),
            (1, 0x20, MalformedReason::Version),
            (STX_OFFSET, 0x00, MalformedReason::InnerStart),
            (COMMAND_OFFSET, 0x27, MalformedReason::Command),
            (COMMAND_OFFSET + 1, 0x11, MalformedReason::CommandVersion),
        ];

        for (index, value, expected) in cases {
            let mut raw = reply(STATUS, &[0x00, 0x00]);
            raw[index] = value;
            let end = raw.len() - TRAILER_SIZE;
            let crc = crc16(&raw[..end]).to_le_bytes();
            raw[end] = crc[0];
            raw[end + 1] = crc[1];

            let err = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap_err();
            assert!(
                matches!(err, FrameError::Malformed(reason) if reason == expected),
                "expected {expected:?}, got {err}"
            );
        }
    }

    #[test]
    fn missing_end_marker() {
        let mut raw = reply(STATUS, &[0x00, 0x00]);
        let last = raw.len() - 1;
        raw[last] = 0x00;

        let err = decode_frame(&raw, STATUS, COMMAND_VERSION).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(MalformedReason::EndMarker)));
    }

    #[test]
    fn header_is_reported_not_enforced() {
        let frame = Frame::new(
            Header {
                to: Address { id: 9, class: 0xF0 },
                from: Address { id: 3, class: 0x80 },
            },
            STATUS,
            vec![0x00, 0x00],
        );
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf).unwrap();

        let decoded = decode_frame(&buf, STATUS, COMMAND_VERSION).unwrap();
        assert_eq!(decoded.header, frame.header);
    }

    #[test]
    fn frame_wire_size() {
        let frame = Frame::request(1, STATUS, Bytes::new());
        assert_eq!(frame.wire_size(), 14);
    }
}
