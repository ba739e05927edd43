//! USB bulk pipe access
//!
//! [`UsbBus`] and [`BulkPipe`] are the seams between the transport and the
//! host USB stack. [`RusbBus`] implements them on top of libusb.

use rusb::{Context, Device, DeviceHandle, UsbContext};
use std::time::Duration;

use super::{find_variant, DeviceVariant, UsbError};
use crate::config::SessionConfig;

/// An opened device that can move bytes over bulk endpoints
pub trait BulkPipe {
    /// Send `data` to `endpoint`, returning the number of bytes transferred
    fn write_bulk(&mut self, endpoint: u8, data: &[u8], timeout: Duration)
        -> Result<usize, UsbError>;

    /// Receive into `buf` from `endpoint`, returning the number of bytes read
    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError>;
}

/// Something that can open a device handle for a probe variant
pub trait UsbBus {
    /// Handle type produced by a successful open
    type Handle: BulkPipe;

    /// Open the first attached device matching `variant`.
    ///
    /// Returns [`UsbError::NotFound`] when no such device is attached.
    fn open(&self, variant: &DeviceVariant) -> Result<Self::Handle, UsbError>;
}

/// An attached probe as seen during enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeInfo {
    /// Matching registry entry
    pub variant: DeviceVariant,
    /// USB bus number
    pub bus_number: u8,
    /// Device address on the bus
    pub address: u8,
    /// Serial number (if readable)
    pub serial_number: Option<String>,
}

/// libusb-backed bus
pub struct RusbBus {
    context: Context,
    interface: u8,
    detach_kernel_driver: bool,
}

impl RusbBus {
    /// Create a new libusb context configured from `config`
    pub fn new(config: &SessionConfig) -> Result<Self, UsbError> {
        Ok(Self {
            context: Context::new()?,
            interface: config.interface,
            detach_kernel_driver: config.detach_kernel_driver,
        })
    }

    /// List attached devices that match a known variant, in bus order
    pub fn list_probes(&self) -> Result<Vec<ProbeInfo>, UsbError> {
        let mut probes = Vec::new();
        for device in self.context.devices()?.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(
                        "Skipping device {:03}:{:03}: {}",
                        device.bus_number(),
                        device.address(),
                        e
                    );
                    continue;
                }
            };
            let Some(variant) = find_variant(descriptor.vendor_id(), descriptor.product_id())
            else {
                continue;
            };
            // Reading the serial needs the device opened; a busy probe still gets listed
            let serial_number = device
                .open()
                .and_then(|h| h.read_serial_number_string_ascii(&descriptor))
                .ok();
            probes.push(ProbeInfo {
                variant: *variant,
                bus_number: device.bus_number(),
                address: device.address(),
                serial_number,
            });
        }
        Ok(probes)
    }

    fn find_device(&self, variant: &DeviceVariant) -> Result<Option<Device<Context>>, UsbError> {
        for device in self.context.devices()?.iter() {
            let Ok(descriptor) = device.device_descriptor() else {
                continue;
            };
            if variant.matches(descriptor.vendor_id(), descriptor.product_id()) {
                return Ok(Some(device));
            }
        }
        Ok(None)
    }
}

/// Faults on a device that is present never read as "not found"
fn open_fault(err: rusb::Error) -> UsbError {
    UsbError::Io(err.to_string())
}

impl UsbBus for RusbBus {
    type Handle = RusbHandle;

    fn open(&self, variant: &DeviceVariant) -> Result<RusbHandle, UsbError> {
        let device = self.find_device(variant)?.ok_or(UsbError::NotFound)?;
        let handle = device.open().map_err(open_fault)?;

        if self.detach_kernel_driver {
            if let Err(e) = handle.set_auto_detach_kernel_driver(true) {
                tracing::debug!("Kernel driver auto-detach unavailable: {}", e);
            }
        }
        handle
            .claim_interface(self.interface)
            .map_err(open_fault)?;

        tracing::debug!(
            "Opened {} at {:03}:{:03}, claimed interface {}",
            variant,
            device.bus_number(),
            device.address(),
            self.interface
        );

        Ok(RusbHandle {
            handle,
            interface: self.interface,
        })
    }
}

/// An opened libusb device with its interface claimed.
///
/// The interface is released and the device closed when this is dropped.
pub struct RusbHandle {
    handle: DeviceHandle<Context>,
    interface: u8,
}

impl BulkPipe for RusbHandle {
    fn write_bulk(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        Ok(self.handle.write_bulk(endpoint, data, timeout)?)
    }

    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        Ok(self.handle.read_bulk(endpoint, buf, timeout)?)
    }
}

impl Drop for RusbHandle {
    fn drop(&mut self) {
        if let Err(e) = self.handle.release_interface(self.interface) {
            tracing::debug!("Failed to release interface {}: {}", self.interface, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_fault_is_not_not_found() {
        assert!(matches!(open_fault(rusb::Error::NotFound), UsbError::Io(_)));
        assert!(matches!(open_fault(rusb::Error::Access), UsbError::Io(_)));
    }

    #[test]
    fn test_list_probes() {
        // Only checks that enumeration doesn't panic; libusb may be unavailable
        let Ok(bus) = RusbBus::new(&SessionConfig::default()) else {
            return;
        };
        if let Ok(probes) = bus.list_probes() {
            for probe in &probes {
                println!(
                    "Found probe: {} at {:03}:{:03} - {:?}",
                    probe.variant, probe.bus_number, probe.address, probe.serial_number
                );
            }
        }
    }
}
