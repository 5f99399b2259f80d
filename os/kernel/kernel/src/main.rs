//! # Kernel Entry Point
//!
//! The boot loader maps the boot information block, the environment block
//! and this image into the top of the address space, then starts every core
//! at [`_start`] on its own stack. Each core identifies itself, the bootstrap
//! core installs the logger, and all of them run the bring-up state machine
//! from [`kernel_smp`] until they halt.

#![cfg_attr(not(test), no_std, no_main)]
#![cfg_attr(test, allow(dead_code, unused_imports))]
#![allow(unsafe_code)]

mod console;
mod cpu;
mod interrupts;
mod platform;

use crate::console::Console;
use crate::platform::X86_64;
use kernel_alloc::{BumpAllocator, ChainedAllocator};
use kernel_info::boot::BootInfo;
use kernel_info::environment::Environment;
use kernel_info::memory::{BOOT_INFO_SIZE, ENVIRONMENT_SIZE, MAX_MEMORY_REGIONS};
use kernel_qemu::{QemuLogger, qemu_trace};
use kernel_smp::{Processor, Role, SystemState};
use kernel_sync::SpinLock;
use log::warn;

unsafe extern "C" {
    /// Boot information page, placed by the linker at `BOOT_INFO_BASE`.
    #[allow(non_upper_case_globals)]
    static bootboot: [u8; BOOT_INFO_SIZE];

    /// Environment page, placed by the linker at `ENVIRONMENT_BASE`.
    #[allow(non_upper_case_globals)]
    static environment: [u8; ENVIRONMENT_SIZE];
}

/// Bring-up state shared by all cores.
static SYSTEM: SystemState = SystemState::new();

/// Physical memory, seeded by the bootstrap core from the boot memory map.
static MEMORY: SpinLock<ChainedAllocator<BumpAllocator, MAX_MEMORY_REGIONS>> =
    SpinLock::new(ChainedAllocator::new());

fn boot_info() -> BootInfo<'static> {
    // SAFETY: the boot loader maps this page read-only before entry.
    BootInfo::new(unsafe { &*core::ptr::addr_of!(bootboot) })
}

fn boot_environment() -> Environment<'static> {
    // SAFETY: as above.
    Environment::new(unsafe { &*core::ptr::addr_of!(environment) })
}

/// Entry point for every core.
#[cfg(not(test))]
#[unsafe(no_mangle)]
#[unsafe(link_section = ".text.boot")]
pub extern "C" fn _start() -> ! {
    #[cfg(feature = "qemu")]
    qemu_trace!("Kernel reporting to QEMU!\n");

    kernel_main()
}

fn kernel_main() -> ! {
    let boot = boot_info();
    let platform = X86_64;
    let processor = Processor::new(&platform, &SYSTEM, &boot);

    match processor.role() {
        Role::Bootstrap => {
            if let Err(err) = QemuLogger::from_environment(&boot_environment()).init() {
                qemu_trace!("Logger unavailable: {err}\n");
            }
            if boot.num_cores() == 0 {
                warn!("Boot block reports no cores");
            }

            // Application cores never touch the chain, so holding the guard
            // until halt blocks no one.
            let mut memory = MEMORY.lock();
            processor.run_to_halt(&boot, &mut *memory, &mut Console)
        }
        Role::Application => {
            let mut no_memory = ChainedAllocator::<BumpAllocator, 0>::new();
            processor.run_to_halt(&boot, &mut no_memory, &mut Console)
        }
    }
}

#[cfg(not(test))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    console::report_panic(info);
    cpu::halt()
}
