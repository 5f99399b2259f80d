//! # x86 I/O Port Access
//!
//! [`inb`]/[`outb`] wrap the `in`/`out` instructions. Drivers go through the
//! [`PortIo`] trait instead so they can be exercised against a fake bus.

/// Byte-wide access to the I/O port space.
pub trait PortIo {
    /// # Safety
    /// `port` must belong to a device that expects this write.
    unsafe fn write(&mut self, port: u16, value: u8);

    /// # Safety
    /// `port` must be a readable register of the intended device.
    unsafe fn read(&mut self, port: u16) -> u8;
}

/// The real port bus.
#[derive(Debug, Default, Copy, Clone)]
pub struct Pio;

impl PortIo for Pio {
    #[inline]
    unsafe fn write(&mut self, port: u16, value: u8) {
        unsafe { outb(port, value) }
    }

    #[inline]
    unsafe fn read(&mut self, port: u16) -> u8 {
        unsafe { inb(port) }
    }
}

/// Write one byte to an I/O port.
///
/// # Safety
/// Must run at CPL0 (or with I/O permission for `port`), and `port` must be
/// the intended device register; the wrong write can wedge the device.
#[inline]
pub unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val, options(nomem, nostack, preserves_flags));
    }
}

/// Read one byte from an I/O port.
///
/// # Safety
/// Same requirements as [`outb`]. `in` is not a memory fence.
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let mut v: u8;
    unsafe {
        core::arch::asm!("in al, dx", in("dx") port, out("al") v, options(nomem, nostack, preserves_flags));
    }
    v
}
