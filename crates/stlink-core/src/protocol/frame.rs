//! Command frames and transfer requests

use std::time::Duration;

use super::{bounded_timeout, ProbeError, COMMAND_SIZE, DEFAULT_TIMEOUT_MS};

/// The fixed-size packet that starts every transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame([u8; COMMAND_SIZE]);

impl CommandFrame {
    /// Zero-pad `command` to a full frame
    pub fn new(command: &[u8]) -> Result<Self, ProbeError> {
        if command.len() > COMMAND_SIZE {
            return Err(ProbeError::CommandTooLarge {
                size: command.len(),
                max: COMMAND_SIZE,
            });
        }
        let mut frame = [0u8; COMMAND_SIZE];
        frame[..command.len()].copy_from_slice(command);
        Ok(Self(frame))
    }

    /// Raw frame bytes
    pub fn as_bytes(&self) -> &[u8; COMMAND_SIZE] {
        &self.0
    }
}

/// One command/data/response exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    command: Vec<u8>,
    payload: Vec<u8>,
    response_length: usize,
    timeout: Duration,
}

impl TransferRequest {
    /// Create a request that only sends `command`
    pub fn new(command: impl Into<Vec<u8>>) -> Self {
        Self {
            command: command.into(),
            payload: Vec::new(),
            response_length: 0,
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
        }
    }

    /// Data sent after the command frame
    pub fn payload(mut self, payload: impl Into<Vec<u8>>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Number of bytes to read back
    pub fn response_length(mut self, length: usize) -> Self {
        self.response_length = length;
        self
    }

    /// Per-transfer timeout; zero is raised to the 1 ms floor
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = bounded_timeout(timeout);
        self
    }

    /// Command bytes before padding
    pub fn command_bytes(&self) -> &[u8] {
        &self.command
    }

    /// Data sent after the frame
    pub fn payload_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Requested response length
    pub fn expected_response(&self) -> usize {
        self.response_length
    }

    /// Timeout applied to every write and read of this request
    pub fn transfer_timeout(&self) -> Duration {
        self.timeout
    }

    /// Build the padded command frame
    pub fn frame(&self) -> Result<CommandFrame, ProbeError> {
        CommandFrame::new(&self.command)
    }
}
