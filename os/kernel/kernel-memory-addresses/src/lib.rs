//! # Physical Address Types
//!
//! Strongly typed wrappers for the raw physical addresses handed out by the
//! early-boot allocators, plus the alignment arithmetic they rely on.
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`PhysicalAddress`] | A 64-bit physical (and, before paging changes, identity-mapped) address. |
//! | [`AddressRange`] | A half-open `[start, start + len)` span of physical memory. |
//!
//! ## Alignment
//!
//! [`align_up`] and [`align_down`] round to a multiple of an arbitrary non-zero
//! alignment. Alignments are powers of two in practice, but the arithmetic is
//! modulo-based and does not depend on that.
//!
//! ```rust
//! # use kernel_memory_addresses::*;
//! assert_eq!(align_up(0x1001, 0x1000), Some(0x2000));
//! assert_eq!(align_down(0x1fff, 0x1000), 0x1000);
//! assert_eq!(align_up(10, 3), Some(12));
//!
//! let a = AddressRange::new(PhysicalAddress::new(0x1000), 0x1000);
//! let b = AddressRange::new(PhysicalAddress::new(0x1800), 0x1000);
//! assert!(a.overlaps(&b));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod address_range;
mod align;
mod physical_address;

pub use address_range::AddressRange;
pub use align::{align_down, align_up, is_aligned};
pub use physical_address::PhysicalAddress;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_arithmetic_and_alignment_compose() {
        let base = PhysicalAddress::new(0x10_0001);
        let aligned = base.align_up(16).expect("no overflow");
        assert_eq!(aligned.as_u64(), 0x10_0010);
        assert!(aligned.is_aligned(16));
        assert_eq!((aligned + 0x10).as_u64(), 0x10_0020);
        assert_eq!(aligned.offset_from(PhysicalAddress::new(0x10_0000)), 0x10);
    }

    #[test]
    fn range_contains_its_addresses() {
        let r = AddressRange::new(PhysicalAddress::new(0x1000), 0x100);
        assert!(r.contains(PhysicalAddress::new(0x1000)));
        assert!(r.contains(PhysicalAddress::new(0x10ff)));
        assert!(!r.contains(PhysicalAddress::new(0x1100)));
        assert_eq!(r.end().as_u64(), 0x1100);
    }
}
