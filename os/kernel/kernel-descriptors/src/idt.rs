//! # Interrupt Descriptor Table
//!
//! ```text
//! bytes 0..2   offset[15:0]
//! bytes 2..4   code segment selector
//! byte  4      IST index (3 bits), rest reserved
//! byte  5      | P | DPL(2) | 0 | type(4) |
//! bytes 6..8   offset[31:16]
//! bytes 8..12  offset[63:32]
//! bytes 12..16 reserved
//! ```

use crate::pointer::DescriptorTablePointer;
use crate::selectors::SegmentSelector;
use bitfield_struct::bitfield;
use core::ops::Index;
use kernel_info::memory::IDT_ENTRIES;

/// Bytes 4 and 5 of a gate.
#[bitfield(u16)]
#[derive(Eq, PartialEq)]
pub struct GateAttributes {
    /// Interrupt stack table index; 0 keeps the current stack.
    #[bits(3)]
    pub ist: u8,
    #[bits(5)]
    __: u8,
    #[bits(4)]
    pub gate_type: u8,
    /// Must be clear for interrupt and trap gates.
    pub storage: bool,
    #[bits(2)]
    pub dpl: u8,
    pub present: bool,
}

/// Gate kinds used by this kernel.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[repr(u8)]
pub enum GateType {
    /// Clears `IF` on entry.
    Interrupt = 0xE,
    /// Leaves `IF` unchanged.
    Trap = 0xF,
}

/// One 16-byte gate.
#[repr(C)]
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct GateDescriptor {
    offset_lo: u16,
    selector: u16,
    attributes: u16,
    offset_mid: u16,
    offset_hi: u32,
    reserved: u32,
}

impl GateDescriptor {
    /// Not present; the CPU raises #NP (escalating to #DF) when it is hit.
    pub const MISSING: Self = Self {
        offset_lo: 0,
        selector: 0,
        attributes: GateAttributes::new().into_bits(),
        offset_mid: 0,
        offset_hi: 0,
        reserved: 0,
    };

    /// Present, ring 0 gate to `handler` running in `code`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(handler: u64, code: SegmentSelector, gate_type: GateType) -> Self {
        Self {
            offset_lo: handler as u16,
            selector: code.encode(),
            attributes: GateAttributes::new()
                .with_gate_type(gate_type as u8)
                .with_dpl(0)
                .with_present(true)
                .into_bits(),
            offset_mid: (handler >> 16) as u16,
            offset_hi: (handler >> 32) as u32,
            reserved: 0,
        }
    }

    #[must_use]
    #[allow(clippy::cast_lossless)]
    pub const fn handler_address(&self) -> u64 {
        ((self.offset_hi as u64) << 32) | ((self.offset_mid as u64) << 16) | (self.offset_lo as u64)
    }

    #[must_use]
    pub const fn selector(&self) -> SegmentSelector {
        SegmentSelector::from_bits(self.selector)
    }

    #[must_use]
    pub const fn attributes(&self) -> GateAttributes {
        GateAttributes::from_bits(self.attributes)
    }

    #[must_use]
    pub const fn is_present(&self) -> bool {
        self.attributes().present()
    }
}

/// The full 256-vector table.
#[repr(C, align(16))]
pub struct Idt {
    entries: [GateDescriptor; IDT_ENTRIES],
}

impl Default for Idt {
    fn default() -> Self {
        Self::new()
    }
}

impl Idt {
    /// A table with every gate missing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [GateDescriptor::MISSING; IDT_ENTRIES],
        }
    }

    /// Fills `table` with missing gates without building a 4 KiB temporary.
    ///
    /// # Safety
    /// `table` must be valid for writes and aligned for `Idt`.
    pub unsafe fn init_in_place(table: *mut Self) {
        let entries = unsafe { &raw mut (*table).entries }.cast::<GateDescriptor>();
        for vector in 0..IDT_ENTRIES {
            unsafe { entries.add(vector).write(GateDescriptor::MISSING) };
        }
    }

    /// Installs `gate` at `vector`.
    ///
    /// # Panics
    /// If `vector` is not below 256.
    pub fn set(&mut self, vector: usize, gate: GateDescriptor) {
        self.entries[vector] = gate;
    }

    /// Points vectors `0..handlers.len()` at `handlers` through trap gates.
    pub fn install_exception_handlers(&mut self, handlers: &[u64], code: SegmentSelector) {
        for (vector, &handler) in handlers.iter().enumerate().take(IDT_ENTRIES) {
            self.set(vector, GateDescriptor::new(handler, code, GateType::Trap));
        }
    }

    pub fn present_vectors(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, gate)| gate.is_present())
            .map(|(vector, _)| vector)
    }

    #[must_use]
    pub fn pointer(&self) -> DescriptorTablePointer {
        DescriptorTablePointer::to(&self.entries)
    }

    /// Loads the table with `lidt`. No segment reload is needed.
    ///
    /// # Safety
    /// Must run at CPL0. Every present gate must point at valid handler code
    /// in a loaded code segment, and the table must outlive its use.
    pub unsafe fn load(&'static self) {
        let ptr = self.pointer();
        unsafe {
            core::arch::asm!(
                "lidt [{}]",
                in(reg) &raw const ptr,
                options(readonly, nostack, preserves_flags)
            );
        }
    }
}

impl Index<usize> for Idt {
    type Output = GateDescriptor;

    fn index(&self, vector: usize) -> &Self::Output {
        &self.entries[vector]
    }
}

const _: () = {
    assert!(size_of::<GateDescriptor>() == 16);
    assert!(size_of::<Idt>() == 4096);
    assert!(align_of::<Idt>() == 16);
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_bytes_match_the_hardware_layout() {
        let gate = GateDescriptor::new(0xFFFF_FFFF_FFE0_2345, SegmentSelector::kernel(1), GateType::Trap);
        // SAFETY: GateDescriptor is repr(C) plain data of exactly 16 bytes.
        let bytes: [u8; 16] = unsafe { core::mem::transmute(gate) };
        assert_eq!(
            bytes,
            [
                0x45, 0x23, // offset[15:0]
                0x08, 0x00, // selector
                0x00, 0x8F, // IST, P|DPL|type
                0xE0, 0xFF, // offset[31:16]
                0xFF, 0xFF, 0xFF, 0xFF, // offset[63:32]
                0, 0, 0, 0
            ]
        );
        assert_eq!(gate.handler_address(), 0xFFFF_FFFF_FFE0_2345);
        assert!(gate.is_present());
    }

    #[test]
    fn interrupt_gate_type() {
        let gate = GateDescriptor::new(0x1000, SegmentSelector::kernel(1), GateType::Interrupt);
        assert_eq!(gate.attributes().gate_type(), 0xE);
        assert_eq!(gate.attributes().dpl(), 0);
        assert_eq!(gate.selector().index(), 1);
    }

    #[test]
    fn new_table_has_nothing_present() {
        let idt = Idt::new();
        assert_eq!(idt.present_vectors().count(), 0);
        assert!(!idt[255].is_present());
        assert_eq!(idt.pointer().limit(), 4095);
    }

    #[test]
    fn exception_handlers_become_trap_gates() {
        let mut idt = Box::new(Idt::new());
        let handlers: Vec<u64> = (0..32).map(|v| 0x20_0000 + v * 0x10).collect();
        idt.install_exception_handlers(&handlers, SegmentSelector::kernel(1));

        assert_eq!(idt.present_vectors().collect::<Vec<_>>(), (0..32).collect::<Vec<_>>());
        assert_eq!(idt[14].handler_address(), 0x20_00E0);
        assert_eq!(idt[14].attributes().gate_type(), GateType::Trap as u8);
        assert!(!idt[32].is_present());
    }
}
