use lanumb_frame::Header;

use crate::status::StatusCode;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] lanumb_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] lanumb_frame::FrameError),

    /// More channels than fit into one multi-channel request.
    #[error("too many channels in one request ({count}, max {max})")]
    TooManyChannels { count: usize, max: usize },

    /// The device answered with an error status and no data.
    #[error("device rejected {command}: {status}")]
    Rejected {
        command: &'static str,
        status: StatusCode,
    },

    /// The reply was not addressed as a reply to this request.
    #[error("unexpected reply addressing: expected {expected:?}, got {actual:?}")]
    UnexpectedAddress { expected: Header, actual: Header },
}

pub type Result<T> = std::result::Result<T, ClientError>;
