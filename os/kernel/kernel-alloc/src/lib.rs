//! # Early-Boot Physical Memory Allocation
//!
//! Allocation before paging and before any heap exists. Every free region from
//! the boot memory map gets its own [`BumpAllocator`]; the regions are then
//! composed into a fixed-capacity [`ChainedAllocator`] that tries them in the
//! order they were added.
//!
//! ```text
//! ChainedAllocator<BumpAllocator, N>
//! ┌──────────────┬──────────────┬─────┬─────────┐
//! │ region 0     │ region 1     │ ... │ (empty) │
//! │ [base, len)  │ [base, len)  │     │         │
//! │ watermark ─► │ watermark ─► │     │         │
//! └──────────────┴──────────────┴─────┴─────────┘
//!   tried first    tried next when region 0 is out of memory
//! ```
//!
//! ## Guarantees
//!
//! * A bump allocator's watermark only grows, never past the region end, and a
//!   failed allocation leaves it untouched.
//! * No two members of a chain overlap; this is checked when a member is added.
//! * Memory is never freed.
//!
//! ```rust
//! use kernel_alloc::{Allocator, BumpAllocator, ChainedAllocator, OUT_OF_MEMORY};
//! use kernel_memory_addresses::PhysicalAddress;
//!
//! let mut chain = ChainedAllocator::<BumpAllocator, 2>::new();
//! chain.add_allocator(BumpAllocator::new(PhysicalAddress::new(0x1000), 1024)).unwrap();
//! chain.add_allocator(BumpAllocator::new(PhysicalAddress::new(0x8000), 1024)).unwrap();
//!
//! assert_eq!(chain.allocate(1024, 8).unwrap().as_u64(), 0x1000);
//! assert_eq!(chain.allocate(1024, 8).unwrap().as_u64(), 0x8000);
//! assert_eq!(chain.allocate(1024, 8), Err(OUT_OF_MEMORY));
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

mod bump;
mod chained;

pub use bump::BumpAllocator;
pub use chained::{ChainedAllocator, NULL_GUARD};

use kernel_err::{Error, KernelResult};
use kernel_memory_addresses::{AddressRange, PhysicalAddress};

/// The allocator ran out of memory.
pub const OUT_OF_MEMORY: Error = Error::new("OutOfMemory");

/// Two allocators claim the same physical addresses.
pub const OVERLAPPED_MEMORY: Error = Error::new("OverlappedMemory");

/// An alignment of zero was requested.
pub const INVALID_ALIGNMENT: Error = Error::new("InvalidAlignment");

/// A source of physical memory.
pub trait Allocator {
    /// Reserves `size` bytes starting at a multiple of `alignment`.
    ///
    /// # Errors
    /// * [`OUT_OF_MEMORY`] if the request does not fit.
    /// * [`INVALID_ALIGNMENT`] if `alignment` is zero.
    fn allocate(&self, size: u64, alignment: u64) -> KernelResult<PhysicalAddress>;

    /// Bytes not yet handed out. Advisory only; may be stale under contention.
    fn available_memory(&self) -> u64;
}

/// An allocator that serves exactly one contiguous address range.
pub trait RegionAllocator: Allocator {
    fn region(&self) -> AddressRange;
}

impl<A: Allocator + ?Sized> Allocator for &A {
    #[inline]
    fn allocate(&self, size: u64, alignment: u64) -> KernelResult<PhysicalAddress> {
        (**self).allocate(size, alignment)
    }

    #[inline]
    fn available_memory(&self) -> u64 {
        (**self).available_memory()
    }
}

/// Reserves room for one `T`, sized and aligned for it.
///
/// # Errors
/// Propagates the allocator's failure.
pub fn allocate_for<T>(allocator: &(impl Allocator + ?Sized)) -> KernelResult<PhysicalAddress> {
    allocator.allocate(size_of::<T>() as u64, align_of::<T>() as u64)
}
