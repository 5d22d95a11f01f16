//! Stream transport for talking to UMB devices.
//!
//! UMB devices never terminate a reply with anything a reader could wait
//! for, so a receive is a series of short-timeout reads that ends once the
//! line goes quiet. This crate provides:
//! - the [`Transport`] trait the protocol client is written against
//! - [`ReceiveBudget`], the limits of one receive
//! - [`TcpTransport`], the LAN (TCP) implementation
//!
//! This is the lowest layer of lanumb. Everything else builds on top of it.

pub mod error;
pub mod tcp;
pub mod traits;

pub use error::{Result, TransportError};
pub use tcp::{TcpTransport, DEFAULT_CONNECT_TIMEOUT, DEFAULT_PORT};
pub use traits::{receive_from, ReceiveBudget, Transport};
