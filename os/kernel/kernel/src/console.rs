//! COM1 shared by all cores.

use core::fmt::Write;
use kernel_devices::{DeviceWriter, DiagnosticDevice, SerialPort};
use kernel_err::KernelResult;
use kernel_sync::{SpinLock, SpinLockGuard};

pub struct Com1 {
    port: SerialPort,
    initialized: bool,
}

// SAFETY: COM1 is not claimed by anything else in the kernel.
static COM1: SpinLock<Com1> = SpinLock::new(Com1 {
    port: unsafe { SerialPort::com1() },
    initialized: false,
});

/// Per-core handle to COM1.
///
/// The UART is set up by whichever core initializes first; later calls are
/// no-ops. Each write holds the port lock, so a line from one core is never
/// split by another.
pub struct Console;

impl DiagnosticDevice for Console {
    fn initialize(&mut self) -> KernelResult<()> {
        COM1.with_lock(|com1| -> KernelResult<()> {
            if !com1.initialized {
                com1.port.init()?;
                com1.initialized = true;
            }
            Ok(())
        })
    }

    fn write_byte(&mut self, byte: u8) {
        COM1.with_lock(|com1| {
            if com1.initialized {
                com1.port.send(byte);
            }
        });
    }

    fn write_str(&mut self, s: &str) {
        COM1.with_lock(|com1| {
            if com1.initialized {
                s.bytes().for_each(|byte| com1.port.send(byte));
            }
        });
    }
}

/// COM1 for exception and panic reports.
///
/// Takes the shared port only if it is free. When the lock is held, possibly
/// by the faulting core itself with interrupts masked, a fresh port is set up
/// instead so the report never waits.
pub enum FatalConsole {
    Shared(SpinLockGuard<'static, Com1>),
    Fresh(SerialPort),
}

impl FatalConsole {
    pub fn acquire() -> Self {
        match COM1.try_lock() {
            Some(com1) => Self::Shared(com1),
            // SAFETY: the core is about to halt; sharing the UART with an
            // interrupted writer can only garble output.
            None => Self::Fresh(unsafe { SerialPort::com1() }),
        }
    }
}

impl DiagnosticDevice for FatalConsole {
    fn initialize(&mut self) -> KernelResult<()> {
        match self {
            Self::Shared(com1) if com1.initialized => Ok(()),
            Self::Shared(com1) => {
                com1.port.init()?;
                com1.initialized = true;
                Ok(())
            }
            Self::Fresh(port) => port.init().map_err(Into::into),
        }
    }

    fn write_byte(&mut self, byte: u8) {
        match self {
            Self::Shared(com1) => com1.port.send(byte),
            Self::Fresh(port) => port.send(byte),
        }
    }
}

/// Writes `"PANIC: <message>"` if the port can be brought up.
pub fn report_panic(info: &core::panic::PanicInfo) {
    let mut console = FatalConsole::acquire();
    if console.initialize().is_err() {
        return;
    }
    writeln!(DeviceWriter::new(&mut console), "PANIC: {}", info.message()).ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_console_never_waits_for_the_shared_port() {
        assert!(matches!(FatalConsole::acquire(), FatalConsole::Shared(_)));

        let _held = COM1.lock();
        assert!(matches!(FatalConsole::acquire(), FatalConsole::Fresh(_)));
    }
}
