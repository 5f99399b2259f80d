//! Per-core x86-64 primitives.

use bitfield_struct::bitfield;
use core::arch::asm;

/// CPUID leaf `0x01`, EBX.
#[bitfield(u32)]
struct Leaf1Ebx {
    #[bits(24)]
    __: u32,
    /// Local APIC ID assigned at reset.
    initial_apic_id: u8,
}

/// Executes CPUID and returns EBX.
///
/// # Safety
/// CPUID must be available, which it is on every x86-64 core.
#[inline]
unsafe fn cpuid_ebx(leaf: u32) -> u32 {
    let ebx: u32;
    unsafe {
        asm!(
            "push rbx",
            "cpuid",
            "mov {ebx_out:e}, ebx",
            "pop rbx",
            ebx_out = lateout(reg) ebx,
            inlateout("eax") leaf => _,
            inlateout("ecx") 0u32 => _,
            lateout("edx") _,
            options(nomem, preserves_flags),
        );
    }
    ebx
}

/// Hardware ID of the calling core, as reported in the boot block.
pub fn apic_id() -> u16 {
    // SAFETY: leaf 1 exists on all x86-64 processors.
    let ebx = Leaf1Ebx::from_bits(unsafe { cpuid_ebx(0x01) });
    u16::from(ebx.initial_apic_id())
}

/// Spin-wait hint.
#[inline]
pub fn pause() {
    core::hint::spin_loop();
}

/// Stops the calling core for good.
pub fn halt() -> ! {
    loop {
        // SAFETY: masking interrupts and halting has no memory effects.
        unsafe { asm!("cli", "hlt", options(nomem, nostack)) };
    }
}
