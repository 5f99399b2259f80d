//! # QEMU Debug Console
//!
//! Host-visible output through QEMU's debug console port (`0x402`), captured
//! with `-debugcon stdio` or `-debugcon file:debug.log`.
//!
//! * [`QemuLogger`] is the kernel's `log` backend.
//! * [`qemu_trace!`] writes formatted text directly, without the log facade.
//!
//! With the `enabled` feature off, both compile down to no-ops and no port is
//! touched.
//!
//! ```rust,no_run
//! use kernel_qemu::QemuLogger;
//! use log::{LevelFilter, info};
//!
//! QemuLogger::new(LevelFilter::Debug).init().expect("logger installed once");
//! info!("Bring-up started");
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod logger;

pub use logger::{DEFAULT_LEVEL, LOG_LEVEL_KEY, QemuLogger, write_record};

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt::{self, Write};
    use kernel_devices::ports::outb;
    use kernel_info::memory::QEMU_DEBUG_PORT;

    #[allow(clippy::inline_always)]
    #[inline(always)]
    pub fn dbg_putc(c: u8) {
        // SAFETY: the debug console port has no side effects beyond output.
        unsafe { outb(QEMU_DEBUG_PORT, c) }
    }

    pub struct QemuSink;

    impl Write for QemuSink {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            s.bytes().for_each(dbg_putc);
            Ok(())
        }
    }

    #[inline]
    pub fn qemu_write(args: fmt::Arguments) {
        // Best effort; there is nowhere to report a failure to.
        let _ = QemuSink.write_fmt(args);
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod qemu_fmt {
    use core::fmt;

    pub struct QemuSink;

    impl fmt::Write for QemuSink {
        #[inline]
        fn write_str(&mut self, _: &str) -> fmt::Result {
            Ok(())
        }
    }

    #[inline]
    pub fn qemu_write(_: fmt::Arguments) {}
}

/// `format!`-style output to the debug console; no allocation.
#[macro_export]
macro_rules! qemu_trace {
    ($($arg:tt)*) => {{
        $crate::qemu_fmt::qemu_write(core::format_args!($($arg)*));
    }};
}
