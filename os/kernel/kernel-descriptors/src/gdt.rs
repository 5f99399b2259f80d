//! # Global Descriptor Table
//!
//! In long mode base and limit are ignored for code and data segments. What
//! still matters is the access byte (present, DPL, code/data, executable,
//! readable/writable) and the `L` flag of the code segment.
//!
//! ```text
//! byte  7        6            5        4..2      1..0
//!      +--------+-----+------+--------+---------+---------+
//!      |base_hi |flags|lim_hi| access | base_lo | limit_lo|
//!      +--------+-----+------+--------+---------+---------+
//! ```

use crate::pointer::DescriptorTablePointer;
use crate::selectors::SegmentSelector;
use bitfield_struct::bitfield;
use kernel_err::{Error, KernelResult};

/// The table has no present ring 0 code segment.
pub const MISSING_CODE_SEGMENT: Error = Error::new("MissingCodeSegment");

/// The table has no present ring 0 data segment.
pub const MISSING_DATA_SEGMENT: Error = Error::new("MissingDataSegment");

/// Access byte (descriptor byte 5).
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct Access {
    pub accessed: bool,
    /// Readable for code, writable for data.
    pub read_write: bool,
    /// Conforming for code, grows-down for data.
    pub direction_conforming: bool,
    pub executable: bool,
    /// Set for code/data segments, clear for system segments.
    pub code_or_data: bool,
    #[bits(2)]
    pub dpl: u8,
    pub present: bool,
}

impl Access {
    /// Present, ring 0, execute/read.
    pub const KERNEL_CODE: Self = Self::new()
        .with_present(true)
        .with_code_or_data(true)
        .with_executable(true)
        .with_read_write(true);

    /// Present, ring 0, read/write.
    pub const KERNEL_DATA: Self = Self::new()
        .with_present(true)
        .with_code_or_data(true)
        .with_read_write(true);

    const fn is_kernel_segment(self) -> bool {
        self.present() && self.code_or_data() && self.dpl() == 0
    }
}

/// Flags nibble (high nibble of descriptor byte 6).
#[bitfield(u8)]
#[derive(Eq, PartialEq)]
pub struct Flags {
    pub available: bool,
    /// 64-bit code segment.
    pub long_mode: bool,
    /// 32-bit protected mode segment; must be clear with `long_mode`.
    pub size_32: bool,
    /// Limit is in 4 KiB blocks.
    pub granularity: bool,
    #[bits(4)]
    __: u8,
}

/// One 8-byte code or data segment descriptor.
#[bitfield(u64)]
#[derive(Eq, PartialEq)]
pub struct SegmentDescriptor {
    pub limit_lo: u16,
    pub base_lo: u16,
    pub base_mid: u8,
    #[bits(8)]
    pub access: Access,
    #[bits(4)]
    pub limit_hi: u8,
    #[bits(4)]
    pub flags: Flags,
    pub base_hi: u8,
}

impl SegmentDescriptor {
    /// All zero; never present.
    pub const NULL: Self = Self::new();

    /// 64-bit ring 0 code segment.
    #[must_use]
    pub const fn kernel_code() -> Self {
        Self::new()
            .with_access(Access::KERNEL_CODE)
            .with_flags(Flags::new().with_long_mode(true))
    }

    /// Ring 0 data segment.
    #[must_use]
    pub const fn kernel_data() -> Self {
        Self::new().with_access(Access::KERNEL_DATA)
    }

    #[must_use]
    pub const fn is_kernel_code(self) -> bool {
        let access = self.access();
        access.is_kernel_segment() && access.executable()
    }

    #[must_use]
    pub const fn is_kernel_data(self) -> bool {
        let access = self.access();
        access.is_kernel_segment() && !access.executable() && access.read_write()
    }
}

/// Null descriptor followed by one code and one data segment.
#[repr(C, align(16))]
#[derive(Debug, Clone)]
pub struct Gdt {
    entries: [SegmentDescriptor; 3],
}

impl Default for Gdt {
    fn default() -> Self {
        Self::new()
    }
}

impl Gdt {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [
                SegmentDescriptor::NULL,
                SegmentDescriptor::kernel_code(),
                SegmentDescriptor::kernel_data(),
            ],
        }
    }

    #[must_use]
    pub const fn entries(&self) -> &[SegmentDescriptor] {
        &self.entries
    }

    /// Selector of the first ring 0 code segment.
    ///
    /// # Errors
    /// [`MISSING_CODE_SEGMENT`] if there is none.
    pub fn code_selector(&self) -> KernelResult<SegmentSelector> {
        self.find(SegmentDescriptor::is_kernel_code)
            .ok_or(MISSING_CODE_SEGMENT)
    }

    /// Selector of the first ring 0 data segment.
    ///
    /// # Errors
    /// [`MISSING_DATA_SEGMENT`] if there is none.
    pub fn data_selector(&self) -> KernelResult<SegmentSelector> {
        self.find(SegmentDescriptor::is_kernel_data)
            .ok_or(MISSING_DATA_SEGMENT)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn find(&self, matches: impl Fn(SegmentDescriptor) -> bool) -> Option<SegmentSelector> {
        self.entries
            .iter()
            .position(|&entry| matches(entry))
            .map(|index| SegmentSelector::kernel(index as u16))
    }

    /// Covers exactly the descriptors, not the alignment padding.
    #[must_use]
    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::to(&self.entries)
    }

    /// Loads the table, reloads the data segment registers, and reloads `CS`
    /// through a far return.
    ///
    /// # Errors
    /// Fails before touching the CPU if either segment is missing.
    ///
    /// # Safety
    /// Must run at CPL0 with interrupts disabled. The table must stay valid
    /// and unmodified for as long as any core uses it.
    pub unsafe fn load(&'static self) -> KernelResult<()> {
        let code = u64::from(self.code_selector()?.encode());
        let data = self.data_selector()?.encode();
        let ptr = self.pointer();

        unsafe {
            core::arch::asm!(
                "lgdt [{}]",
                in(reg) &raw const ptr,
                options(readonly, nostack, preserves_flags)
            );

            core::arch::asm!(
                "mov ds, {0:x}",
                "mov es, {0:x}",
                "mov fs, {0:x}",
                "mov gs, {0:x}",
                "mov ss, {0:x}",
                in(reg) data,
                options(nostack, preserves_flags)
            );

            // CS cannot be moved into; return "far" into the next instruction.
            core::arch::asm!(
                "push {cs}",
                "lea {tmp}, [rip + 2f]",
                "push {tmp}",
                "retfq",
                "2:",
                cs = in(reg) code,
                tmp = lateout(reg) _,
                options(preserves_flags)
            );
        }
        Ok(())
    }
}

const _: () = {
    assert!(size_of::<SegmentDescriptor>() == 8);
    assert!(size_of::<Gdt>() == 32);
};
