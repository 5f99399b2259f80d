//! # 16550 UART

use crate::DiagnosticDevice;
use crate::ports::{Pio, PortIo};
use core::hint::spin_loop;
use kernel_err::{Error, KernelResult};
use kernel_info::memory::COM1_PORT;

/// The loopback self-test did not read back what it wrote.
pub const FAULTY_SERIAL_PORT: Error = Error::new("FaultySerialPort");

const DATA: u16 = 0;
const INTERRUPT_ENABLE: u16 = 1;
const FIFO_CONTROL: u16 = 2;
const LINE_CONTROL: u16 = 3;
const MODEM_CONTROL: u16 = 4;
const LINE_STATUS: u16 = 5;

/// Divisor latch access bit in the line control register.
const DLAB: u8 = 0x80;
/// 8 data bits, no parity, one stop bit.
const LINE_8N1: u8 = 0x03;
/// Enable and clear FIFOs, 14-byte threshold.
const FIFO_ENABLE: u8 = 0xC7;
/// DTR, RTS and OUT2.
const MODEM_READY: u8 = 0x0B;
/// RTS, OUT1, OUT2 and loopback.
const MODEM_LOOPBACK: u8 = 0x1E;
/// DTR, RTS, OUT1 and OUT2; normal operation.
const MODEM_NORMAL: u8 = 0x0F;
/// Transmitter holding register empty.
const TX_EMPTY: u8 = 0x20;

const LOOPBACK_PROBE: u8 = 0xAE;

/// 115200 / 3 = 38400 baud.
const DIVISOR: u16 = 3;

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum SerialError {
    #[error("FaultySerialPort")]
    Faulty,
}

impl From<SerialError> for Error {
    fn from(err: SerialError) -> Self {
        match err {
            SerialError::Faulty => FAULTY_SERIAL_PORT,
        }
    }
}

/// A 16550-compatible UART at a fixed I/O base.
#[derive(Debug)]
pub struct SerialPort<P = Pio> {
    base: u16,
    io: P,
}

impl SerialPort<Pio> {
    /// The first serial port.
    ///
    /// # Safety
    /// Must run with I/O privilege, and nothing else may drive COM1 while
    /// this value is in use.
    #[must_use]
    pub const unsafe fn com1() -> Self {
        Self { base: COM1_PORT, io: Pio }
    }
}

impl<P: PortIo> SerialPort<P> {
    /// # Safety
    /// `base` must be the I/O base of a 16550 reachable through `io`.
    pub const unsafe fn with_io(base: u16, io: P) -> Self {
        Self { base, io }
    }

    fn out(&mut self, register: u16, value: u8) {
        // SAFETY: `base` addresses a UART per the constructor contract.
        unsafe { self.io.write(self.base + register, value) }
    }

    fn input(&mut self, register: u16) -> u8 {
        // SAFETY: see `out`.
        unsafe { self.io.read(self.base + register) }
    }

    /// Programs the UART and runs the loopback self-test.
    ///
    /// # Errors
    /// [`SerialError::Faulty`] if the probe byte does not come back.
    pub fn init(&mut self) -> Result<(), SerialError> {
        let [divisor_lo, divisor_hi] = DIVISOR.to_le_bytes();

        self.out(INTERRUPT_ENABLE, 0x00);
        self.out(LINE_CONTROL, DLAB);
        self.out(DATA, divisor_lo);
        self.out(INTERRUPT_ENABLE, divisor_hi);
        self.out(LINE_CONTROL, LINE_8N1);
        self.out(FIFO_CONTROL, FIFO_ENABLE);
        self.out(MODEM_CONTROL, MODEM_READY);

        self.out(MODEM_CONTROL, MODEM_LOOPBACK);
        self.out(DATA, LOOPBACK_PROBE);
        if self.input(DATA) != LOOPBACK_PROBE {
            return Err(SerialError::Faulty);
        }

        self.out(MODEM_CONTROL, MODEM_NORMAL);
        Ok(())
    }

    /// Sends one byte, spinning until the transmitter is free.
    pub fn send(&mut self, byte: u8) {
        while self.input(LINE_STATUS) & TX_EMPTY == 0 {
            spin_loop();
        }
        self.out(DATA, byte);
    }

    pub const fn io(&self) -> &P {
        &self.io
    }
}

impl<P: PortIo> DiagnosticDevice for SerialPort<P> {
    fn initialize(&mut self) -> KernelResult<()> {
        self.init().map_err(Error::from)
    }

    fn write_byte(&mut self, byte: u8) {
        self.send(byte);
    }
}
