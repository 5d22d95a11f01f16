use bytes::{BufMut, Bytes, BytesMut};
use lanumb_frame::{
    command_name, decode_frame, encode_frame, Frame, FrameError, Header, COMMAND_VERSION,
    DEVICE_INFO, ELAPSED_TIME, MULTI_CHANNEL_DATA, ONLINE_DATA, STATUS,
};
use lanumb_transport::{ReceiveBudget, Transport};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::info::{DeviceInfo, InfoSelector};
use crate::response::{
    decode_device_info, decode_elapsed_time, decode_multi, decode_reading, decode_status, Reading,
};
use crate::status::StatusCode;

/// Device address used when a bus has a single device.
pub const DEFAULT_RECEIVER: u8 = 1;

/// Most channels a device accepts in one multi-channel request.
pub const MAX_CHANNELS_PER_REQUEST: usize = 20;

const INITIAL_BUFFER_CAPACITY: usize = 64;

/// Configuration for a [`UmbClient`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Limits for collecting each reply.
    pub receive: ReceiveBudget,
    /// Reject replies that are not addressed from the queried device to
    /// this client. Off by default: converters on shared buses do not
    /// always echo addresses faithfully.
    pub check_addressing: bool,
}

/// Query client for one UMB connection.
///
/// Exchanges are strictly one request, one reply; `&mut self` keeps two
/// of them from ever overlapping on the same bus.
pub struct UmbClient<T> {
    transport: T,
    config: ClientConfig,
    buf: BytesMut,
}

impl<T: Transport> UmbClient<T> {
    /// Create a client with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Send one request and collect the validated reply.
    ///
    /// Returns `Ok(None)` if the device did not answer.
    pub fn request(&mut self, receiver: u8, command: u8, payload: &[u8]) -> Result<Option<Frame>> {
        let request = Frame::request(receiver, command, Bytes::copy_from_slice(payload));
        self.buf.clear();
        encode_frame(&request, &mut self.buf)?;

        debug!(
            command = command_name(command),
            receiver,
            bytes = self.buf.len(),
            "sending request"
        );
        self.transport.send(&self.buf)?;

        let raw = self.transport.receive(&self.config.receive)?;
        let reply = match decode_frame(&raw, command, COMMAND_VERSION) {
            Ok(reply) => reply,
            Err(FrameError::NoDataReceived) => {
                warn!(command = command_name(command), receiver, "no reply received");
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };
        debug!(
            command = command_name(command),
            receiver,
            bytes = raw.len(),
            "reply received"
        );

        if self.config.check_addressing && !is_reply_to(&reply.header, &request.header) {
            return Err(ClientError::UnexpectedAddress {
                expected: request.header.reversed(),
                actual: reply.header,
            });
        }

        Ok(Some(reply))
    }

    /// Read the current value of one channel.
    pub fn query_channel(&mut self, channel: u16, receiver: u8) -> Result<Option<Reading>> {
        let Some(reply) = self.request(receiver, ONLINE_DATA, &channel.to_le_bytes())? else {
            return Ok(None);
        };
        decode_reading(&reply.payload).map(Some)
    }

    /// Read up to [`MAX_CHANNELS_PER_REQUEST`] channels in one request.
    ///
    /// Readings come back in request order. An empty channel list is
    /// answered locally without touching the transport.
    pub fn query_channels(
        &mut self,
        channels: &[u16],
        receiver: u8,
    ) -> Result<Option<Vec<Reading>>> {
        if channels.is_empty() {
            return Ok(Some(Vec::new()));
        }
        if channels.len() > MAX_CHANNELS_PER_REQUEST {
            return Err(ClientError::TooManyChannels {
                count: channels.len(),
                max: MAX_CHANNELS_PER_REQUEST,
            });
        }

        let mut payload = BytesMut::with_capacity(1 + 2 * channels.len());
        payload.put_u8(channels.len() as u8);
        for &channel in channels {
            payload.put_u16_le(channel);
        }

        let Some(reply) = self.request(receiver, MULTI_CHANNEL_DATA, &payload)? else {
            return Ok(None);
        };
        let readings = decode_multi(&reply.payload)?;
        if readings.len() != channels.len() {
            warn!(
                requested = channels.len(),
                received = readings.len(),
                "device returned a different number of channels"
            );
        }
        Ok(Some(readings))
    }

    /// Read any number of channels, split into as many requests as needed.
    ///
    /// Returns `Ok(None)` if any of the requests went unanswered.
    pub fn query_channels_chunked(
        &mut self,
        channels: &[u16],
        receiver: u8,
    ) -> Result<Option<Vec<Reading>>> {
        let mut readings = Vec::with_capacity(channels.len());
        for chunk in channels.chunks(MAX_CHANNELS_PER_REQUEST) {
            match self.query_channels(chunk, receiver)? {
                Some(part) => readings.extend(part),
                None => return Ok(None),
            }
        }
        Ok(Some(readings))
    }

    /// Read the device status.
    pub fn query_status(&mut self, receiver: u8) -> Result<Option<StatusCode>> {
        let Some(reply) = self.request(receiver, STATUS, &[])? else {
            return Ok(None);
        };
        decode_status(&reply.payload).map(Some)
    }

    /// Read the device's elapsed time in seconds.
    pub fn query_elapsed_time(&mut self, receiver: u8) -> Result<Option<u32>> {
        let Some(reply) = self.request(receiver, ELAPSED_TIME, &[])? else {
            return Ok(None);
        };
        decode_elapsed_time(&reply.payload).map(Some)
    }

    /// Read one block of device information.
    pub fn query_device_info(
        &mut self,
        selector: InfoSelector,
        receiver: u8,
    ) -> Result<Option<DeviceInfo>> {
        let Some(reply) = self.request(receiver, DEVICE_INFO, &[selector.code()])? else {
            return Ok(None);
        };
        decode_device_info(&reply.payload).map(Some)
    }

    /// Close the underlying transport.
    pub fn close(&mut self) -> Result<()> {
        self.transport.close()?;
        Ok(())
    }

    /// Current client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the client and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }
}

/// Whether `reply` comes from the device `request` was sent to and is
/// addressed back to its sender. The sender's class is device-defined, so
/// only its id is compared.
fn is_reply_to(reply: &Header, request: &Header) -> bool {
    reply.to == request.from && reply.from.id == request.to.id
}
