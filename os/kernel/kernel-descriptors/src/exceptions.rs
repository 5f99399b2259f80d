//! # Exception names and reporting

use kernel_devices::DiagnosticDevice;
use kernel_info::memory::EXCEPTION_VECTORS;

/// Name reported for reserved or unknown vectors.
pub const UNKNOWN_EXCEPTION: &str = "Unknown";

/// Human-readable names of the architectural exception vectors.
pub const EXCEPTION_NAMES: [&str; EXCEPTION_VECTORS] = [
    "Divide by zero",
    "Debug",
    "Non-maskable interrupt",
    "Breakpoint",
    "Overflow",
    "Bound range exceeded",
    "Invalid opcode",
    "Device not available",
    "Double fault",
    "Coprocessor Segment Overrun",
    "Invalid TSS",
    "Segment Not Present",
    "Stack-Segment Fault",
    "General Protection Fault",
    "Page Fault",
    UNKNOWN_EXCEPTION,
    "x87 Floating-Point Exception",
    "Alignment Check",
    "Machine Check",
    "SIMD Floating-Point Exception",
    "Virtualization Exception",
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
    UNKNOWN_EXCEPTION,
];

#[must_use]
pub fn exception_name(vector: usize) -> &'static str {
    EXCEPTION_NAMES.get(vector).copied().unwrap_or(UNKNOWN_EXCEPTION)
}

/// Writes `"PANIC: <name>\n"` for `vector`.
///
/// The device is initialized first; if that fails nothing is written, since a
/// device that failed its self-test may never accept a byte.
pub fn report_exception<D: DiagnosticDevice + ?Sized>(device: &mut D, vector: usize) {
    if device.initialize().is_err() {
        return;
    }
    device.write_str("PANIC: ");
    device.write_str(exception_name(vector));
    device.write_str("\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_err::{Error, KernelResult};

    #[derive(Default)]
    struct Recorder {
        out: String,
        inits: usize,
        broken: bool,
    }

    impl DiagnosticDevice for Recorder {
        fn initialize(&mut self) -> KernelResult<()> {
            self.inits += 1;
            if self.broken { Err(Error::new("FaultySerialPort")) } else { Ok(()) }
        }

        fn write_byte(&mut self, byte: u8) {
            self.out.push(char::from(byte));
        }
    }

    #[test]
    fn names_of_defined_vectors() {
        assert_eq!(exception_name(0), "Divide by zero");
        assert_eq!(exception_name(3), "Breakpoint");
        assert_eq!(exception_name(13), "General Protection Fault");
        assert_eq!(exception_name(14), "Page Fault");
        assert_eq!(exception_name(20), "Virtualization Exception");
    }

    #[test]
    fn reserved_and_out_of_range_vectors_are_unknown() {
        assert_eq!(exception_name(15), "Unknown");
        assert_eq!(exception_name(31), "Unknown");
        assert_eq!(exception_name(32), "Unknown");
        assert_eq!(exception_name(usize::MAX), "Unknown");
    }

    #[test]
    fn report_format() {
        let mut dev = Recorder::default();
        report_exception(&mut dev, 6);
        assert_eq!(dev.out, "PANIC: Invalid opcode\n");
        assert_eq!(dev.inits, 1);
    }

    #[test]
    fn broken_device_is_left_alone() {
        let mut dev = Recorder {
            broken: true,
            ..Recorder::default()
        };
        report_exception(&mut dev, 8);
        assert!(dev.out.is_empty());
    }
}
