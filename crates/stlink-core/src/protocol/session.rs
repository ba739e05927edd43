//! Probe session
//!
//! Discovery picks the first registry variant that opens, and the session
//! then runs every framed transfer over that transport.

use std::time::Duration;

use super::{
    bounded_timeout, BulkPipe, DeviceVariant, ProbeError, RusbBus, RusbHandle, Transport, TransferRequest, UsbBus,
    VARIANTS,
};
use crate::config::SessionConfig;

/// A discovered probe ready for framed transfers
pub struct ProbeSession<H: BulkPipe = RusbHandle> {
    transport: Transport<H>,
    default_timeout: Duration,
}

impl ProbeSession<RusbHandle> {
    /// Discover a probe through libusb using `config`
    pub fn open_default(config: &SessionConfig) -> Result<Self, ProbeError> {
        config
            .validate()
            .map_err(|e| ProbeError::InvalidConfig(e.to_string()))?;
        let bus = RusbBus::new(config).map_err(|e| {
            tracing::warn!("Failed to initialise libusb: {}", e);
            ProbeError::DeviceNotFound
        })?;
        let mut session = Self::discover(&bus)?;
        session.default_timeout = config.timeout();
        Ok(session)
    }
}

impl<H: BulkPipe> ProbeSession<H> {
    /// Try every known variant in priority order
    pub fn discover<B>(bus: &B) -> Result<Self, ProbeError>
    where
        B: UsbBus<Handle = H>,
    {
        Self::discover_from(bus, VARIANTS)
    }

    /// Try `variants` in order; the first one that opens wins
    pub fn discover_from<B>(bus: &B, variants: &[DeviceVariant]) -> Result<Self, ProbeError>
    where
        B: UsbBus<Handle = H>,
    {
        let transport = variants
            .iter()
            .find_map(|variant| {
                tracing::debug!("Probing for ST-Link {}", variant);
                match Transport::open(bus, variant) {
                    Ok(transport) => Some(transport),
                    Err(ProbeError::DeviceNotFound) => None,
                    // A matching probe that fails to open falls through to the next variant
                    Err(e) => {
                        tracing::warn!("ST-Link {} present but failed to open: {}", variant, e);
                        None
                    }
                }
            })
            .ok_or(ProbeError::DeviceNotFound)?;

        tracing::info!("Connected to ST-Link {}", transport.variant());
        Ok(Self::new(transport))
    }

    /// Wrap an already opened transport
    pub fn new(transport: Transport<H>) -> Self {
        Self {
            transport,
            default_timeout: Duration::from_millis(super::DEFAULT_TIMEOUT_MS),
        }
    }

    /// Display name of the connected variant
    pub fn version(&self) -> &'static str {
        self.transport.variant().name
    }

    /// Connected variant
    pub fn variant(&self) -> &DeviceVariant {
        self.transport.variant()
    }

    /// False once a transfer error has killed the transport
    pub fn is_alive(&self) -> bool {
        self.transport.is_open()
    }

    /// Timeout used by [`ProbeSession::xfer`]
    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Change the [`ProbeSession::xfer`] timeout; zero is raised to the 1 ms floor
    pub fn set_default_timeout(&mut self, timeout: Duration) {
        self.default_timeout = bounded_timeout(timeout);
    }

    /// Underlying transport
    pub fn transport(&self) -> &Transport<H> {
        &self.transport
    }

    /// Run one command/data/response exchange.
    ///
    /// Returns `Some(response)` when a response length was requested.
    pub fn transfer(&mut self, request: &TransferRequest) -> Result<Option<Vec<u8>>, ProbeError> {
        let frame = request.frame()?;
        let timeout = request.transfer_timeout();

        self.transport.write(frame.as_bytes(), timeout)?;
        if !request.payload_bytes().is_empty() {
            self.transport.write(request.payload_bytes(), timeout)?;
        }
        match request.expected_response() {
            0 => Ok(None),
            length => self.transport.read(length, timeout).map(Some),
        }
    }

    /// Shorthand for [`ProbeSession::transfer`] with the session's default timeout
    pub fn xfer(
        &mut self,
        command: &[u8],
        payload: Option<&[u8]>,
        rx_length: usize,
    ) -> Result<Option<Vec<u8>>, ProbeError> {
        let request = TransferRequest::new(command)
            .payload(payload.unwrap_or_default())
            .response_length(rx_length)
            .timeout(self.default_timeout);
        self.transfer(&request)
    }
}
