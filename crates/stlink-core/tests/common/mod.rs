//! In-memory USB backend that records every call

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use stlink_core::protocol::{BulkPipe, DeviceVariant, UsbBus, UsbError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsbCall {
    Open { vendor_id: u16, product_id: u16 },
    Write { endpoint: u8, data: Vec<u8> },
    Read { endpoint: u8, length: usize },
}

#[derive(Default)]
pub struct MockState {
    pub calls: Vec<UsbCall>,
    /// Timeout passed to each write and read, in call order
    pub timeouts: Vec<Duration>,
    /// Data returned by successive reads
    pub responses: VecDeque<Vec<u8>>,
    /// Writes that succeed before a scripted write fault applies
    pub skip_writes: usize,
    /// Next write fails with this error
    pub write_fault: Option<UsbError>,
    /// Next write reports this many bytes sent
    pub short_write: Option<usize>,
    /// Next read fails with this error
    pub read_fault: Option<UsbError>,
    /// Handles dropped so far
    pub released: usize,
}

impl MockState {
    pub fn io_calls(&self) -> Vec<UsbCall> {
        self.calls
            .iter()
            .filter(|c| !matches!(c, UsbCall::Open { .. }))
            .cloned()
            .collect()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                UsbCall::Write { data, .. } => Some(data.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct MockBus {
    /// Identification pairs of attached devices
    pub attached: Vec<(u16, u16)>,
    /// Attached devices that fail to open
    pub broken: Vec<(u16, u16)>,
    pub state: Rc<RefCell<MockState>>,
}

impl MockBus {
    pub fn with_devices(attached: &[(u16, u16)]) -> Self {
        Self {
            attached: attached.to_vec(),
            broken: Vec::new(),
            state: Rc::new(RefCell::new(MockState::default())),
        }
    }

    pub fn empty() -> Self {
        Self::with_devices(&[])
    }

    pub fn push_response(&self, data: Vec<u8>) {
        self.state.borrow_mut().responses.push_back(data);
    }
}

impl UsbBus for MockBus {
    type Handle = MockPipe;

    fn open(&self, variant: &DeviceVariant) -> Result<MockPipe, UsbError> {
        let id = (variant.vendor_id, variant.product_id);
        self.state.borrow_mut().calls.push(UsbCall::Open {
            vendor_id: id.0,
            product_id: id.1,
        });
        if self.broken.contains(&id) {
            return Err(UsbError::Io("Access denied".into()));
        }
        if !self.attached.contains(&id) {
            return Err(UsbError::NotFound);
        }
        Ok(MockPipe {
            state: Rc::clone(&self.state),
        })
    }
}

pub struct MockPipe {
    state: Rc<RefCell<MockState>>,
}

impl BulkPipe for MockPipe {
    fn write_bulk(
        &mut self,
        endpoint: u8,
        data: &[u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        let mut state = self.state.borrow_mut();
        state.timeouts.push(timeout);
        state.calls.push(UsbCall::Write {
            endpoint,
            data: data.to_vec(),
        });
        if state.skip_writes > 0 {
            state.skip_writes -= 1;
            return Ok(data.len());
        }
        if let Some(err) = state.write_fault.take() {
            return Err(err);
        }
        Ok(state.short_write.take().unwrap_or(data.len()))
    }

    fn read_bulk(
        &mut self,
        endpoint: u8,
        buf: &mut [u8],
        timeout: Duration,
    ) -> Result<usize, UsbError> {
        let mut state = self.state.borrow_mut();
        state.timeouts.push(timeout);
        state.calls.push(UsbCall::Read {
            endpoint,
            length: buf.len(),
        });
        if let Some(err) = state.read_fault.take() {
            return Err(err);
        }
        match state.responses.pop_front() {
            Some(data) => {
                let n = data.len().min(buf.len());
                buf[..n].copy_from_slice(&data[..n]);
                Ok(n)
            }
            None => {
                for (i, b) in buf.iter_mut().enumerate() {
                    *b = i as u8;
                }
                Ok(buf.len())
            }
        }
    }
}

impl Drop for MockPipe {
    fn drop(&mut self) {
        self.state.borrow_mut().released += 1;
    }
}

pub const TIMEOUT: Duration = Duration::from_millis(200);
