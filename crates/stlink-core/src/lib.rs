//! # ST-Link Core Library
//!
//! USB transport for ST-Link in-circuit debug probes.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Discovery of attached ST-Link probes across known hardware variants
//! - Raw bulk pipe transport with read-size quantization
//! - Fixed 16-byte command framing with optional payload and response
//!
//! ## Supported Probes
//!
//! - ST-Link/V2
//! - ST-Link/V2-1
//!
//! ## Example
//!
//! ```rust,no_run
//! use stlink_core::{config::SessionConfig, protocol::ProbeSession};
//!
//! let mut session = ProbeSession::open_default(&SessionConfig::default())?;
//! println!("ST-Link {}", session.version());
//!
//! // GET_VERSION
//! let reply = session.xfer(&[0xf1], None, 6)?;
//! println!("{:02x?}", reply);
//! # Ok::<(), stlink_core::protocol::ProbeError>(())
//! ```

pub mod config;
pub mod protocol;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::SessionConfig;
    pub use crate::protocol::{
        DeviceVariant, ProbeError, ProbeSession, TransferError, TransferRequest, Transport,
        TransportState,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
