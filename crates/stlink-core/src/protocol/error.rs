//! Protocol errors

use thiserror::Error;

/// Errors reported by a USB backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UsbError {
    /// Nothing attached matches the requested identification pair
    #[error("No matching USB device")]
    NotFound,

    /// Transfer did not complete within its timeout
    #[error("USB transfer timed out")]
    Timeout,

    /// Device went away
    #[error("USB device disconnected")]
    Disconnected,

    /// Any other host stack fault
    #[error("USB I/O error: {0}")]
    Io(String),
}

impl From<rusb::Error> for UsbError {
    fn from(err: rusb::Error) -> Self {
        match err {
            rusb::Error::NotFound => UsbError::NotFound,
            rusb::Error::Timeout => UsbError::Timeout,
            rusb::Error::NoDevice => UsbError::Disconnected,
            other => UsbError::Io(other.to_string()),
        }
    }
}

/// A failed bulk transfer, or an attempt to use a dead transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// Backend fault during a bulk transfer or open
    #[error("USB error: {0}")]
    Usb(#[from] UsbError),

    /// Pipe accepted fewer bytes than requested
    #[error("Error sending data: wrote {actual} of {expected} bytes")]
    ShortWrite {
        /// Bytes handed to the pipe
        expected: usize,
        /// Bytes the pipe reported as sent
        actual: usize,
    },

    /// Transport is dead
    #[error("Device not available")]
    NotAvailable,
}

/// Errors surfaced by discovery and framed transfers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// No registered variant could be opened
    #[error("No ST-Link probe found")]
    DeviceNotFound,

    /// Command does not fit in one frame
    #[error("Too many bytes in command: {size} (maximum is {max} bytes)")]
    CommandTooLarge {
        /// Length of the rejected command
        size: usize,
        /// Frame capacity
        max: usize,
    },

    /// Session settings were rejected before touching USB
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O failed or the transport is dead
    #[error("Transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl ProbeError {
    /// True for USB faults, short writes and I/O on a dead transport
    pub fn is_transfer(&self) -> bool {
        matches!(self, ProbeError::Transfer(_))
    }
}
