//! # Diagnostic Output Devices
//!
//! The kernel reports faults and bring-up progress through a
//! [`DiagnosticDevice`]: something that can be initialized and then accepts
//! bytes. The only implementation today is the 16550 UART behind
//! [`SerialPort`].
//!
//! ```rust
//! use kernel_devices::{DeviceWriter, DiagnosticDevice};
//! use kernel_err::KernelResult;
//! use core::fmt::Write;
//!
//! #[derive(Default)]
//! struct Buffer(Vec<u8>);
//!
//! impl DiagnosticDevice for Buffer {
//!     fn initialize(&mut self) -> KernelResult<()> { Ok(()) }
//!     fn write_byte(&mut self, byte: u8) { self.0.push(byte) }
//! }
//!
//! let mut dev = Buffer::default();
//! write!(DeviceWriter::new(&mut dev), "CPU #{}", 3).unwrap();
//! assert_eq!(dev.0, b"CPU #3");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

pub mod ports;
pub mod serial;

pub use serial::{FAULTY_SERIAL_PORT, SerialError, SerialPort};

use core::fmt;
use kernel_err::KernelResult;

/// Byte sink used for diagnostics.
pub trait DiagnosticDevice {
    /// Brings the device into a state where [`write_byte`](Self::write_byte) works.
    ///
    /// # Errors
    /// A device-specific error if the device does not respond.
    fn initialize(&mut self) -> KernelResult<()>;

    fn write_byte(&mut self, byte: u8);

    fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.write_byte(byte);
        }
    }
}

impl<D: DiagnosticDevice + ?Sized> DiagnosticDevice for &mut D {
    fn initialize(&mut self) -> KernelResult<()> {
        (**self).initialize()
    }

    fn write_byte(&mut self, byte: u8) {
        (**self).write_byte(byte);
    }

    fn write_str(&mut self, s: &str) {
        (**self).write_str(s);
    }
}

/// [`fmt::Write`] over a [`DiagnosticDevice`].
pub struct DeviceWriter<'a, D: ?Sized> {
    device: &'a mut D,
}

impl<'a, D: DiagnosticDevice + ?Sized> DeviceWriter<'a, D> {
    pub const fn new(device: &'a mut D) -> Self {
        Self { device }
    }
}

impl<D: DiagnosticDevice + ?Sized> fmt::Write for DeviceWriter<'_, D> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.device.write_str(s);
        Ok(())
    }
}
