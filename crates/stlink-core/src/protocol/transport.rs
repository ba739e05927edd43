//! Bulk pipe transport
//!
//! A [`Transport`] owns one opened probe and moves raw bytes over the two
//! bulk pipes of its variant. The first I/O fault kills it for good: the
//! handle is dropped and every later call fails without touching hardware.

use std::time::Duration;

use super::{
    BulkPipe, DeviceVariant, ProbeError, TransferError, UsbBus, UsbError, MIN_READ_SIZE,
    MIN_TIMEOUT_MS, READ_ALIGNMENT,
};

/// Liveness of a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Handle held, ready for I/O
    Open,
    /// Handle released after an I/O fault; terminal
    Dead,
}

enum Link<H> {
    Open(H),
    Dead,
}

/// Number of bytes actually requested from the IN pipe for a logical read of `size`
pub fn wire_read_size(size: usize) -> usize {
    if size < MIN_READ_SIZE {
        MIN_READ_SIZE
    } else {
        size.next_multiple_of(READ_ALIGNMENT)
    }
}

/// Raise a zero timeout to [`MIN_TIMEOUT_MS`] so every transfer stays bounded
pub fn bounded_timeout(timeout: Duration) -> Duration {
    timeout.max(Duration::from_millis(MIN_TIMEOUT_MS))
}

/// Format bytes for trace output
fn hex_list(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("0x{:02x}", b))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Raw transport bound to one probe variant
pub struct Transport<H: BulkPipe> {
    link: Link<H>,
    variant: DeviceVariant,
}

impl<H: BulkPipe> Transport<H> {
    /// Open the probe described by `variant` on `bus`.
    ///
    /// Fails with [`ProbeError::DeviceNotFound`] when no matching device is
    /// attached. Any other fault while opening is reported as a transfer error.
    pub fn open<B>(bus: &B, variant: &DeviceVariant) -> Result<Self, ProbeError>
    where
        B: UsbBus<Handle = H>,
    {
        match bus.open(variant) {
            Ok(handle) => Ok(Self::from_handle(handle, *variant)),
            Err(UsbError::NotFound) => Err(ProbeError::DeviceNotFound),
            Err(e) => Err(TransferError::Usb(e).into()),
        }
    }

    /// Wrap an already opened handle
    pub fn from_handle(handle: H, variant: DeviceVariant) -> Self {
        Self {
            link: Link::Open(handle),
            variant,
        }
    }

    /// Variant this transport is bound to
    pub fn variant(&self) -> &DeviceVariant {
        &self.variant
    }

    /// Current liveness state
    pub fn state(&self) -> TransportState {
        match self.link {
            Link::Open(_) => TransportState::Open,
            Link::Dead => TransportState::Dead,
        }
    }

    /// Check whether the transport can still do I/O
    pub fn is_open(&self) -> bool {
        self.state() == TransportState::Open
    }

    /// Write all of `data` to the OUT pipe
    pub fn write(&mut self, data: &[u8], timeout: Duration) -> Result<(), ProbeError> {
        tracing::trace!("{}", hex_list(data));
        let timeout = bounded_timeout(timeout);
        let out_pipe = self.variant.out_pipe;
        let handle = self.handle()?;

        let count = match handle.write_bulk(out_pipe, data, timeout) {
            Ok(count) => count,
            Err(e) => return Err(self.kill(TransferError::Usb(e))),
        };
        tracing::trace!("count={}", count);

        if count != data.len() {
            return Err(self.kill(TransferError::ShortWrite {
                expected: data.len(),
                actual: count,
            }));
        }
        Ok(())
    }

    /// Read `size` bytes from the IN pipe.
    ///
    /// The wire request is padded per [`wire_read_size`]; padding is discarded.
    pub fn read(&mut self, size: usize, timeout: Duration) -> Result<Vec<u8>, ProbeError> {
        tracing::trace!("size={}", size);
        let timeout = bounded_timeout(timeout);
        let in_pipe = self.variant.in_pipe;
        let handle = self.handle()?;

        let mut buf = vec![0u8; wire_read_size(size)];
        let received = match handle.read_bulk(in_pipe, &mut buf, timeout) {
            Ok(received) => received,
            Err(e) => return Err(self.kill(TransferError::Usb(e))),
        };

        if received < size {
            tracing::debug!("Short read: requested {} bytes, got {}", size, received);
        }
        buf.truncate(received.min(size));
        tracing::trace!("{}", hex_list(&buf));
        Ok(buf)
    }

    fn handle(&mut self) -> Result<&mut H, TransferError> {
        match &mut self.link {
            Link::Open(handle) => Ok(handle),
            Link::Dead => Err(TransferError::NotAvailable),
        }
    }

    /// Move to Dead, dropping the handle, and hand back the error
    fn kill(&mut self, err: TransferError) -> ProbeError {
        tracing::warn!("ST-Link {} transport dead: {}", self.variant.name, err);
        self.link = Link::Dead;
        err.into()
    }
}
