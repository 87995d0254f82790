//! LabJack U3 digital output driver.
//!
//! The preset buttons are wired to FIO0-FIO3 and the execute button to FIO4.
//! Lines are driven with the U3 `Feedback` extended command over the USB
//! bulk endpoints:
//!
//! ```text
//! byte 0     Checksum8 of bytes 1-5
//! byte 1     0xF8 (extended command)
//! byte 2     number of data words after byte 5
//! byte 3     0x00 (Feedback)
//! bytes 4-5  Checksum16 of bytes 6.. (LSB first)
//! byte 6     echo
//! bytes 7..  IOType, data... (padded to an even length)
//! ```
//!
//! The response carries the error code in byte 6 and the echo in byte 8.
//!
//! A failed USB write is reported against the line being driven. A bad or
//! missing response is a [`HardwareError::CommunicationError`] since the
//! write may or may not have reached the line, and a vanished device is
//! [`HardwareError::Disconnected`].
//!
//! USB transfers are synchronous and bounded by [`USB_TIMEOUT`]; they run
//! inline on the single control flow.

use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext};
use tracing::{debug, info};

use safecode_core::{Pin, PinLevel};

use crate::{HardwareError, Result, traits::PinDriver, types::DeviceInfo};

const DEVICE_NAME: &str = "LabJack U3";
const LABJACK_VENDOR_ID: u16 = 0x0CD5;
const U3_PRODUCT_ID: u16 = 0x0003;
const ENDPOINT_OUT: u8 = 0x01;
const ENDPOINT_IN: u8 = 0x82;

/// Upper bound on a single USB transfer.
pub const USB_TIMEOUT: Duration = Duration::from_millis(500);

const EXTENDED_COMMAND: u8 = 0xF8;
const FEEDBACK_COMMAND: u8 = 0x00;
const IOTYPE_BIT_STATE_WRITE: u8 = 11;
const IOTYPE_BIT_DIR_WRITE: u8 = 13;
const BIT_SET: u8 = 0x80;

/// Extended-command header checksum.
fn checksum8(bytes: &[u8]) -> u8 {
    let mut sum: u32 = bytes.iter().map(|b| u32::from(*b)).sum();
    sum = (sum & 0xFF) + (sum >> 8);
    sum = (sum & 0xFF) + (sum >> 8);
    (sum & 0xFF) as u8
}

/// Extended-command payload checksum.
fn checksum16(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, b| acc.wrapping_add(u16::from(*b)))
}

/// Build a `Feedback` command carrying the given IOType bytes.
pub fn feedback_packet(echo: u8, io: &[u8]) -> Vec<u8> {
    let mut packet = vec![0u8; 7];
    packet[1] = EXTENDED_COMMAND;
    packet[3] = FEEDBACK_COMMAND;
    packet[6] = echo;
    packet.extend_from_slice(io);
    if packet.len() % 2 != 0 {
        packet.push(0);
    }

    // Feedback packets stay far below 512 bytes
    packet[2] = ((packet.len() - 6) / 2) as u8;
    let [lsb, msb] = checksum16(&packet[6..]).to_le_bytes();
    packet[4] = lsb;
    packet[5] = msb;
    packet[0] = checksum8(&packet[1..6]);
    packet
}

/// Validate a `Feedback` response against the echo that was sent.
fn check_response(response: &[u8], echo: u8) -> Result<()> {
    if response.len() < 9 {
        return Err(HardwareError::communication(format!(
            "short response ({} bytes)",
            response.len()
        )));
    }
    if response[1] != EXTENDED_COMMAND || response[3] != FEEDBACK_COMMAND {
        return Err(HardwareError::communication(format!(
            "unexpected command bytes {:#04x}/{:#04x}",
            response[1], response[3]
        )));
    }
    if response[0] != checksum8(&response[1..6]) {
        return Err(HardwareError::communication("bad Checksum8"));
    }
    let expected = u16::from_le_bytes([response[4], response[5]]);
    if expected != checksum16(&response[6..]) {
        return Err(HardwareError::communication("bad Checksum16"));
    }
    if response[6] != 0 {
        return Err(HardwareError::communication(format!(
            "device error code {} in frame {}",
            response[6], response[7]
        )));
    }
    if response[8] != echo {
        return Err(HardwareError::communication(format!(
            "echo mismatch: sent {echo}, got {}",
            response[8]
        )));
    }
    Ok(())
}

/// Map a failed read to the error the caller sees.
fn read_error(error: rusb::Error) -> HardwareError {
    match error {
        rusb::Error::NoDevice => HardwareError::disconnected(DEVICE_NAME),
        other => HardwareError::communication(format!("USB read failed: {other}")),
    }
}

/// Map a failed write, using `otherwise` for anything but a vanished device.
fn write_error(
    error: rusb::Error,
    otherwise: impl FnOnce(String) -> HardwareError,
) -> HardwareError {
    match error {
        rusb::Error::NoDevice => HardwareError::disconnected(DEVICE_NAME),
        other => otherwise(format!("USB write failed: {other}")),
    }
}

/// LabJack U3 attached over USB.
pub struct LabJackU3 {
    handle: DeviceHandle<GlobalContext>,
    serial_number: Option<String>,
    echo: u8,
}

impl std::fmt::Debug for LabJackU3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabJackU3")
            .field("serial_number", &self.serial_number)
            .field("echo", &self.echo)
            .finish()
    }
}

impl LabJackU3 {
    /// Open the first U3 found on the bus.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`] if no U3 is attached
    /// or its interface cannot be claimed.
    pub fn open() -> Result<Self> {
        let mut handle = rusb::open_device_with_vid_pid(LABJACK_VENDOR_ID, U3_PRODUCT_ID)
            .ok_or_else(|| HardwareError::initialization_failed("No LabJack U3 found on USB"))?;

        // Not supported on every platform; claiming below reports real failures
        let _ = handle.set_auto_detach_kernel_driver(true);

        handle.claim_interface(0).map_err(|e| {
            HardwareError::initialization_failed(format!("Cannot claim U3 interface: {e}"))
        })?;

        // The serial is informational; a device that will not report it still works
        let serial_number = handle
            .device()
            .device_descriptor()
            .ok()
            .and_then(|descriptor| handle.read_serial_number_string_ascii(&descriptor).ok());

        info!(serial = ?serial_number, "Opened LabJack U3");
        Ok(Self {
            handle,
            serial_number,
            echo: 0,
        })
    }

    /// Send one `Feedback` command and validate the reply.
    ///
    /// `on_write` builds the error for a write that did not go out.
    fn feedback(
        &mut self,
        io: &[u8],
        on_write: impl FnOnce(String) -> HardwareError,
    ) -> Result<()> {
        self.echo = self.echo.wrapping_add(1);
        let packet = feedback_packet(self.echo, io);

        let written = match self.handle.write_bulk(ENDPOINT_OUT, &packet, USB_TIMEOUT) {
            Ok(written) => written,
            Err(e) => return Err(write_error(e, on_write)),
        };
        if written != packet.len() {
            return Err(on_write(format!(
                "short USB write ({written} of {})",
                packet.len()
            )));
        }

        let mut response = [0u8; 64];
        let read = self
            .handle
            .read_bulk(ENDPOINT_IN, &mut response, USB_TIMEOUT)
            .map_err(read_error)?;

        check_response(&response[..read], self.echo)
    }
}

impl PinDriver for LabJackU3 {
    async fn configure(&mut self) -> Result<()> {
        let mut io = Vec::with_capacity(Pin::ALL.len() * 2);
        for pin in Pin::ALL {
            io.extend_from_slice(&[IOTYPE_BIT_DIR_WRITE, BIT_SET | pin.index()]);
        }
        self.feedback(&io, |e| {
            HardwareError::initialization_failed(format!("Cannot set FIO directions: {e}"))
        })
        .map_err(|e| match e {
            HardwareError::CommunicationError { message } => {
                HardwareError::initialization_failed(format!("Cannot set FIO directions: {message}"))
            }
            other => other,
        })?;
        debug!("FIO0-FIO4 configured as outputs");
        Ok(())
    }

    async fn set_pin(&mut self, pin: Pin, level: PinLevel) -> Result<()> {
        let state = if level == PinLevel::Open { BIT_SET } else { 0 };
        self.feedback(&[IOTYPE_BIT_STATE_WRITE, state | pin.index()], |e| {
            HardwareError::pin_write(pin, level, e)
        })
    }

    async fn get_info(&self) -> Result<DeviceInfo> {
        let info = DeviceInfo::new(DEVICE_NAME, "U3");
        Ok(match &self.serial_number {
            Some(serial) => info.with_serial_number(serial.clone()),
            None => info,
        })
    }
}
