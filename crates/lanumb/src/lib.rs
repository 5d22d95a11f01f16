//! Client for Lufft UMB weather stations and sensors reached over LAN.
//!
//! # Crate Structure
//!
//! - [`transport`]: stream transport and the TCP implementation
//! - [`frame`]: UMB frame codec, checksum and payload reader
//! - [`client`]: typed queries (behind the `client` feature)

/// Re-export transport types.
pub mod transport {
    pub use lanumb_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use lanumb_frame::*;
}

/// Re-export client types (requires `client` feature).
#[cfg(feature = "client")]
pub mod client {
    pub use lanumb_client::*;
}
