use crate::{Allocator, INVALID_ALIGNMENT, OUT_OF_MEMORY, RegionAllocator};
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use kernel_err::KernelResult;
use kernel_info::boot::MemoryRegion;
use kernel_memory_addresses::{AddressRange, PhysicalAddress, align_up};
use kernel_sync::SpinLock;

/// Watermark allocator over one contiguous region.
///
/// Allocation advances `watermark` (an offset from `base`) past the returned
/// block. The lock only covers the compute-then-commit of the watermark;
/// [`available_memory`](Allocator::available_memory) reads it without locking.
pub struct BumpAllocator {
    base: PhysicalAddress,
    len: u64,
    watermark: AtomicU64,
    lock: SpinLock<()>,
}

impl BumpAllocator {
    #[must_use]
    pub const fn new(base: PhysicalAddress, len: u64) -> Self {
        Self {
            base,
            len,
            watermark: AtomicU64::new(0),
            lock: SpinLock::new(()),
        }
    }

    #[must_use]
    pub const fn from_region(region: &MemoryRegion) -> Self {
        Self::new(region.base(), region.size())
    }

    /// Offset of the next free byte from the region base.
    #[must_use]
    pub fn watermark(&self) -> u64 {
        self.watermark.load(Ordering::Acquire)
    }
}

impl Allocator for BumpAllocator {
    fn allocate(&self, size: u64, alignment: u64) -> KernelResult<PhysicalAddress> {
        if alignment == 0 {
            return Err(INVALID_ALIGNMENT);
        }

        let _guard = self.lock.lock();
        let watermark = self.watermark.load(Ordering::Relaxed);

        // The address itself is aligned, not just the offset into the region.
        let next = self
            .base
            .checked_add(watermark)
            .and_then(|addr| addr.align_up(alignment))
            .ok_or(OUT_OF_MEMORY)?;
        let end = next
            .offset_from(self.base)
            .checked_add(size)
            .filter(|&end| end <= self.len)
            .ok_or(OUT_OF_MEMORY)?;

        self.watermark.store(end, Ordering::Release);
        Ok(next)
    }

    fn available_memory(&self) -> u64 {
        self.len.saturating_sub(self.watermark.load(Ordering::Relaxed))
    }
}

impl RegionAllocator for BumpAllocator {
    fn region(&self) -> AddressRange {
        AddressRange::new(self.base, self.len)
    }
}

impl From<MemoryRegion> for BumpAllocator {
    fn from(region: MemoryRegion) -> Self {
        Self::from_region(&region)
    }
}

impl fmt::Debug for BumpAllocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BumpAllocator")
            .field("region", &self.region())
            .field("watermark", &self.watermark())
            .finish()
    }
}
