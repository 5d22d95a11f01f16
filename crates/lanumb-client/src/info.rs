use bytes::Bytes;

use crate::status::StatusCode;

/// Sub-command of the device information request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoSelector {
    /// Device identification.
    Identification,
    /// Device description text.
    Description,
    /// Hardware and software version.
    Versions,
    /// Number of channels.
    ChannelCount,
    /// Any other sub-command, sent as-is.
    Raw(u8),
}

impl InfoSelector {
    pub fn code(self) -> u8 {
        match self {
            Self::Identification => 0x10,
            Self::Description => 0x11,
            Self::Versions => 0x12,
            Self::ChannelCount => 0x15,
            Self::Raw(code) => code,
        }
    }
}

/// Undecoded device information reply.
///
/// The layout depends on the selector and on the device; callers that need
/// a specific field parse `data` themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub status: StatusCode,
    /// Everything after the status byte.
    pub data: Bytes,
}
