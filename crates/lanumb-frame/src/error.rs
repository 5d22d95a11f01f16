use std::fmt;

/// Which part of a received frame broke the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// The length field does not point at an ETX, or the frame is shorter
    /// than its length field claims.
    Length,
    /// The received checksum does not match the computed one.
    Checksum { calculated: u16, received: u16 },
    /// Missing SOH at the start of the frame.
    StartMarker,
    /// Unsupported protocol version.
    Version,
    /// Missing STX before the command code.
    InnerStart,
    /// The reply answers a different command.
    Command,
    /// The reply carries a different command version.
    CommandVersion,
    /// Missing EOT at the end of the frame.
    EndMarker,
    /// A payload read ran past the end of the payload.
    TruncatedPayload { needed: usize, remaining: usize },
    /// A value's byte count does not match its type tag.
    ValueLength {
        tag: u8,
        expected: usize,
        actual: usize,
    },
}

impl fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Length => write!(f, "invalid payload length"),
            Self::Checksum {
                calculated,
                received,
            } => write!(
                f,
                "checksum mismatch (calculated 0x{calculated:04X}, received 0x{received:04X})"
            ),
            Self::StartMarker => write!(f, "missing start-of-frame marker"),
            Self::Version => write!(f, "wrong protocol version"),
            Self::InnerStart => write!(f, "missing STX marker"),
            Self::Command => write!(f, "wrong command code"),
            Self::CommandVersion => write!(f, "wrong command version"),
            Self::EndMarker => write!(f, "missing end-of-frame marker"),
            Self::TruncatedPayload { needed, remaining } => write!(
                f,
                "truncated payload (needed {needed} bytes, {remaining} remaining)"
            ),
            Self::ValueLength {
                tag,
                expected,
                actual,
            } => write!(
                f,
                "value of type 0x{tag:02X} needs {expected} bytes, got {actual}"
            ),
        }
    }
}

/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Nothing was received for this exchange. The caller may retry.
    #[error("no data received")]
    NoDataReceived,

    /// The received frame violates the wire format.
    #[error("malformed frame: {0}")]
    Malformed(MalformedReason),

    /// The payload does not fit into the one-byte length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
