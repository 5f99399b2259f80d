//! Exception entry stubs for vectors `0..32`.
//!
//! Every stub masks interrupts, realigns the stack and calls
//! [`exception_entry`] with its vector number. No state is saved: an
//! exception is always fatal, so the stub never returns.

use crate::console::FatalConsole;
use crate::cpu;
use core::arch::naked_asm;
use kernel_descriptors::{ExceptionHandlers, report_exception};

/// Reports the exception on COM1 and halts the core.
extern "C" fn exception_entry(vector: u32) -> ! {
    report_exception(&mut FatalConsole::acquire(), vector as usize);
    cpu::halt()
}

macro_rules! exception_stubs {
    ($($stub:ident = $vector:literal),* $(,)?) => {
        $(
            #[unsafe(naked)]
            extern "C" fn $stub() -> ! {
                naked_asm!(
                    "cli",
                    "and rsp, -16",
                    "mov edi, {vector}",
                    "call {entry}",
                    "ud2",
                    vector = const $vector,
                    entry = sym exception_entry,
                );
            }
        )*

        /// Stub addresses, indexed by vector.
        pub fn exception_handlers() -> ExceptionHandlers {
            [$($stub as usize as u64),*]
        }
    };
}

exception_stubs! {
    vector_00 = 0, vector_01 = 1, vector_02 = 2, vector_03 = 3,
    vector_04 = 4, vector_05 = 5, vector_06 = 6, vector_07 = 7,
    vector_08 = 8, vector_09 = 9, vector_10 = 10, vector_11 = 11,
    vector_12 = 12, vector_13 = 13, vector_14 = 14, vector_15 = 15,
    vector_16 = 16, vector_17 = 17, vector_18 = 18, vector_19 = 19,
    vector_20 = 20, vector_21 = 21, vector_22 = 22, vector_23 = 23,
    vector_24 = 24, vector_25 = 25, vector_26 = 26, vector_27 = 27,
    vector_28 = 28, vector_29 = 29, vector_30 = 30, vector_31 = 31,
}
