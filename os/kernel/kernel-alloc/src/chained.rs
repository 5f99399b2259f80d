use crate::{Allocator, BumpAllocator, INVALID_ALIGNMENT, OUT_OF_MEMORY, OVERLAPPED_MEMORY, RegionAllocator};
use kernel_err::KernelResult;
use kernel_info::boot::MemoryRegion;
use kernel_memory_addresses::PhysicalAddress;
use log::{debug, trace};

/// Free memory below this address is never seeded, so no allocation is null.
pub const NULL_GUARD: u64 = 0x1000;

/// Drops the part of `region` below [`NULL_GUARD`].
fn above_null_guard(region: &MemoryRegion) -> MemoryRegion {
    let base = region.base().as_u64();
    if base >= NULL_GUARD {
        return *region;
    }
    let skipped = NULL_GUARD - base;
    MemoryRegion::new(
        PhysicalAddress::new(NULL_GUARD),
        region.size().saturating_sub(skipped),
        region.kind(),
    )
}

/// Fixed-capacity chain of disjoint region allocators.
///
/// Members are tried in insertion order. A member that is out of memory hands
/// the request to the next one; any other failure ends the scan.
#[derive(Debug)]
pub struct ChainedAllocator<A, const N: usize> {
    members: [Option<A>; N],
    len: usize,
}

impl<A: RegionAllocator, const N: usize> ChainedAllocator<A, N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            members: [const { None }; N],
            len: 0,
        }
    }

    /// Appends `candidate` and returns the new member count.
    ///
    /// # Errors
    /// * [`OUT_OF_MEMORY`] if all `N` slots are taken.
    /// * [`OVERLAPPED_MEMORY`] if `candidate` shares an address with a member.
    pub fn add_allocator(&mut self, candidate: A) -> KernelResult<usize> {
        if self.len == N {
            return Err(OUT_OF_MEMORY);
        }

        let range = candidate.region();
        if self.members().any(|member| member.region().overlaps(&range)) {
            debug!("Rejecting allocator for {range:?}: overlaps an existing region");
            return Err(OVERLAPPED_MEMORY);
        }

        debug!("Adding allocator #{} for {range:?}", self.len);
        self.members[self.len] = Some(candidate);
        self.len += 1;
        Ok(self.len)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&A> {
        self.members.get(index)?.as_ref()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Members in insertion order.
    pub fn members(&self) -> impl Iterator<Item = &A> {
        self.members[..self.len].iter().flatten()
    }
}

impl<const N: usize> ChainedAllocator<BumpAllocator, N> {
    /// Adds one bump allocator per non-empty free region.
    ///
    /// The first page of physical memory is left out of any region that
    /// covers it. Returns the member count afterwards.
    ///
    /// # Errors
    /// Stops at and returns the first rejected region's error.
    pub fn add_free_regions(
        &mut self,
        regions: impl IntoIterator<Item = MemoryRegion>,
    ) -> KernelResult<usize> {
        for region in regions {
            let usable = above_null_guard(&region);
            if !usable.is_free() || usable.size() == 0 {
                trace!("Skipping {region:?}");
                continue;
            }
            self.add_allocator(BumpAllocator::from_region(&usable))?;
        }
        Ok(self.len)
    }
}

impl<A: RegionAllocator, const N: usize> Default for ChainedAllocator<A, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: RegionAllocator, const N: usize> Allocator for ChainedAllocator<A, N> {
    fn allocate(&self, size: u64, alignment: u64) -> KernelResult<PhysicalAddress> {
        if alignment == 0 {
            return Err(INVALID_ALIGNMENT);
        }

        for member in self.members() {
            match member.allocate(size, alignment) {
                Ok(addr) => return Ok(addr),
                Err(err) if err == OUT_OF_MEMORY => {}
                Err(err) => return Err(err),
            }
        }
        Err(OUT_OF_MEMORY)
    }

    fn available_memory(&self) -> u64 {
        self.members().map(|member| member.available_memory()).sum()
    }
}
