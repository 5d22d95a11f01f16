use std::io::{ErrorKind, Read};
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use crate::error::{Result, TransportError};

const READ_CHUNK_SIZE: usize = 1024;

/// Smallest possible UMB frame: header, command, version, ETX, CRC and EOT.
pub const MIN_FRAME_LEN: usize = 12;

/// Limits for one accumulating receive.
#[derive(Debug, Clone)]
pub struct ReceiveBudget {
    /// Timeout of each individual read. The receive ends after one full
    /// timeout without new data once `min_frame_len` bytes are buffered.
    pub read_timeout: Duration,
    /// Number of timed-out reads tolerated while fewer than
    /// `min_frame_len` bytes have arrived.
    pub max_idle_reads: u32,
    /// Byte count after which a quiet line ends the receive.
    pub min_frame_len: usize,
    /// Hard cap on buffered bytes.
    pub max_buffer: usize,
}

impl Default for ReceiveBudget {
    fn default() -> Self {
        Self {
            read_timeout: Duration::from_millis(100),
            max_idle_reads: 10,
            min_frame_len: MIN_FRAME_LEN,
            max_buffer: 4 * 1024,
        }
    }
}

/// A half-duplex byte transport to a UMB device.
///
/// One request is sent, then one reply is collected; implementations do
/// not need to support overlapping exchanges.
pub trait Transport {
    /// Send raw bytes to the device.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Collect whatever the device sends within `budget`.
    ///
    /// Returns an empty buffer when nothing arrived in time.
    fn receive(&mut self, budget: &ReceiveBudget) -> Result<Bytes>;

    /// Release the connection. Calling this more than once is a no-op.
    fn close(&mut self) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&mut self, data: &[u8]) -> Result<()> {
        (**self).send(data)
    }

    fn receive(&mut self, budget: &ReceiveBudget) -> Result<Bytes> {
        (**self).receive(budget)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Accumulate bytes from a reader whose reads time out.
///
/// The reader is expected to report a timeout as `WouldBlock` or
/// `TimedOut`, which is what std sockets do once a read timeout is set.
pub fn receive_from<R: Read>(reader: &mut R, budget: &ReceiveBudget) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    let mut idle_reads = 0u32;

    while idle_reads < budget.max_idle_reads {
        match reader.read(&mut chunk) {
            Ok(0) => {
                if buf.is_empty() {
                    return Err(TransportError::Disconnected);
                }
                break;
            }
            Ok(n) => {
                buf.extend_from_slice(&chunk[..n]);
                trace!(read = n, buffered = buf.len(), "received bytes");
                if buf.len() >= budget.max_buffer {
                    warn!(buffered = buf.len(), "receive buffer limit reached");
                    break;
                }
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) if is_timeout(&err) => {
                if buf.len() >= budget.min_frame_len {
                    break;
                }
                idle_reads += 1;
            }
            Err(err) => return Err(TransportError::Io(err)),
        }
    }

    Ok(buf.freeze())
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Hands out scripted read results, then times out forever.
    struct ScriptedReader {
        steps: Vec<std::io::Result<Vec<u8>>>,
        reads: usize,
    }

    impl ScriptedReader {
        fn new(steps: Vec<std::io::Result<Vec<u8>>>) -> Self {
            Self { steps, reads: 0 }
        }
    }

    impl Read for ScriptedReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.reads += 1;
            if self.steps.is_empty() {
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            match self.steps.remove(0) {
                Ok(bytes) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    Ok(bytes.len())
                }
                Err(err) => Err(err),
            }
        }
    }

    fn timeout() -> std::io::Result<Vec<u8>> {
        Err(std::io::Error::from(ErrorKind::TimedOut))
    }

    #[test]
    fn collects_split_reply_until_quiet() {
        let mut reader = ScriptedReader::new(vec![
            Ok(vec![0x01; 5]),
            timeout(),
            Ok(vec![0x02; 11]),
        ]);

        let data = receive_from(&mut reader, &ReceiveBudget::default()).unwrap();

        assert_eq!(data.len(), 16);
        assert_eq!(&data[..5], &[0x01; 5]);
        // Data, timeout, data, then the first quiet read ends the receive.
        assert_eq!(reader.reads, 4);
    }

    #[test]
    fn silent_device_returns_empty_after_idle_budget() {
        let mut reader = ScriptedReader::new(Vec::new());
        let budget = ReceiveBudget {
            max_idle_reads: 3,
            ..ReceiveBudget::default()
        };

        let data = receive_from(&mut reader, &budget).unwrap();

        assert!(data.is_empty());
        assert_eq!(reader.reads, 3);
    }

    #[test]
    fn short_reply_is_returned_once_idle_budget_is_spent() {
        let mut reader = ScriptedReader::new(vec![Ok(vec![0x01, 0x10, 0x01])]);
        let budget = ReceiveBudget {
            max_idle_reads: 2,
            ..ReceiveBudget::default()
        };

        let data = receive_from(&mut reader, &budget).unwrap();
        assert_eq!(data.as_ref(), &[0x01, 0x10, 0x01]);
    }

    #[test]
    fn interrupted_read_retries() {
        let mut reader = ScriptedReader::new(vec![
            Err(std::io::Error::from(ErrorKind::Interrupted)),
            Ok(vec![0xAA; 12]),
        ]);

        let data = receive_from(&mut reader, &ReceiveBudget::default()).unwrap();
        assert_eq!(data.len(), 12);
    }

    #[test]
    fn other_io_errors_propagate() {
        let mut reader = ScriptedReader::new(vec![Err(std::io::Error::from(
            ErrorKind::ConnectionReset,
        ))]);

        let err = receive_from(&mut reader, &ReceiveBudget::default()).unwrap_err();
        assert!(matches!(err, TransportError::Io(e) if e.kind() == ErrorKind::ConnectionReset));
    }

    #[test]
    fn eof_without_data_is_disconnect() {
        let mut reader = Cursor::new(Vec::<u8>::new());
        let err = receive_from(&mut reader, &ReceiveBudget::default()).unwrap_err();
        assert!(matches!(err, TransportError::Disconnected));
    }

    #[test]
    fn eof_after_data_returns_data() {
        let mut reader = Cursor::new(vec![0x04; 20]);
        let data = receive_from(&mut reader, &ReceiveBudget::default()).unwrap();
        assert_eq!(data.len(), 20);
    }

    #[test]
    fn buffer_cap_stops_accumulation() {
        let mut reader = ScriptedReader::new(vec![Ok(vec![0x55; 600]), Ok(vec![0x55; 600])]);
        let budget = ReceiveBudget {
            max_buffer: 1000,
            ..ReceiveBudget::default()
        };

        let data = receive_from(&mut reader, &budget).unwrap();
        assert_eq!(data.len(), 1200);
        assert_eq!(reader.reads, 2);
    }
}
