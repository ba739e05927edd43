//! ST-Link USB Protocol Transport
//!
//! Implements the command/response transport used to talk to ST-Link debug
//! probes over USB bulk pipes.
//!
//! Every transaction is a 16-byte command frame, an optional payload and an
//! optional response. Command contents are opaque at this layer.

mod error;
pub mod frame;
pub mod session;
pub mod transport;
pub mod usb;
pub mod variant;

pub use error::{ProbeError, TransferError, UsbError};
pub use frame::{CommandFrame, TransferRequest};
pub use session::ProbeSession;
pub use transport::{bounded_timeout, wire_read_size, Transport, TransportState};
pub use usb::{BulkPipe, ProbeInfo, RusbBus, RusbHandle, UsbBus};
pub use variant::{find_variant, DeviceVariant, STLINK_V2, STLINK_V2_1, VARIANTS};

/// Size of the command frame that prefixes every transaction
pub const COMMAND_SIZE: usize = 16;

/// Default timeout for a single bulk transfer in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 200;

/// Floor applied to transfer timeouts; libusb treats zero as "wait forever"
pub const MIN_TIMEOUT_MS: u64 = 1;

/// Smallest bulk read the probe accepts
pub const MIN_READ_SIZE: usize = 64;

/// Larger bulk reads must be a multiple of this
pub const READ_ALIGNMENT: usize = 4;
