//! # Memory Layout and Fixed Resources

/// Virtual address the boot loader maps the boot information block to.
///
/// # Kernel Build
/// Sourced by the kernel's `build.rs` to define the `bootboot` symbol.
pub const BOOT_INFO_BASE: u64 = 0xffff_ffff_ffe0_0000;

/// Virtual address of the environment block, one page after the boot block.
pub const ENVIRONMENT_BASE: u64 = BOOT_INFO_BASE + BOOT_INFO_SIZE as u64;

/// Where the kernel executes (VMA), right after the environment page.
///
/// # Kernel Build
/// Sourced by the kernel's `build.rs` to configure the linker.
pub const KERNEL_BASE: u64 = ENVIRONMENT_BASE + ENVIRONMENT_SIZE as u64;

/// Size of the boot information page in bytes. The block itself may be
/// shorter; its size field says how much is valid.
pub const BOOT_INFO_SIZE: usize = 4096;

/// Per-core stack the boot loader sets up before entering the kernel.
///
/// # Kernel Build
/// Exported to the boot loader as the `initstack` symbol.
pub const INIT_STACK_SIZE: u64 = 16 * 1024;

/// Size of the environment block in bytes.
pub const ENVIRONMENT_SIZE: usize = 4096;

/// Maximum number of free regions seeded into the allocator chain.
pub const MAX_MEMORY_REGIONS: usize = 32;

/// Architecturally defined exception vectors (0..32).
pub const EXCEPTION_VECTORS: usize = 32;

/// Capacity of the interrupt descriptor table.
pub const IDT_ENTRIES: usize = 256;

/// I/O base of the first serial port (COM1).
pub const COM1_PORT: u16 = 0x3F8;

/// QEMU debug console (`-debugcon`) port.
pub const QEMU_DEBUG_PORT: u16 = 0x402;

const _: () = {
    assert!(BOOT_INFO_BASE.is_multiple_of(4096));
    assert!(KERNEL_BASE.is_multiple_of(4096));
    assert!(EXCEPTION_VECTORS <= IDT_ENTRIES);
    assert!(MAX_MEMORY_REGIONS > 0);
    assert!(INIT_STACK_SIZE.is_multiple_of(16));
};
