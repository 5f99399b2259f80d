//! # Segment selectors
//!
//! ```text
//!  15            3 2  1  0
//! +----------------+--+----+
//! |   Index[12:0]  |TI| RPL|
//! +----------------+--+----+  (TI=0 → GDT, TI=1 → LDT; RPL=0..3)
//! ```

use bitfield_struct::bitfield;

#[bitfield(u16)]
#[derive(Eq, PartialEq)]
pub struct SegmentSelector {
    /// Requested privilege level.
    #[bits(2)]
    pub rpl: u8,
    /// Table indicator; `false` selects the GDT.
    pub ldt: bool,
    #[bits(13)]
    pub index: u16,
}

impl SegmentSelector {
    /// Ring 0 selector for GDT entry `index`.
    #[inline]
    #[must_use]
    pub const fn kernel(index: u16) -> Self {
        Self::new().with_index(index).with_ldt(false).with_rpl(0)
    }

    /// The value loaded into a segment register.
    #[inline]
    #[must_use]
    pub const fn encode(self) -> u16 {
        self.into_bits()
    }
}

const _: () = {
    assert!(SegmentSelector::kernel(1).encode() == 0x08);
    assert!(SegmentSelector::kernel(2).encode() == 0x10);
};
