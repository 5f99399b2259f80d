//! # Boot Information Block

use core::fmt;
use kernel_memory_addresses::{AddressRange, PhysicalAddress};

/// Offset of the 32-bit total block size.
pub const SIZE_OFFSET: usize = 0x04;

/// Offset of the 16-bit core count.
pub const NUM_CORES_OFFSET: usize = 0x0A;

/// Offset of the 16-bit bootstrap core ID.
pub const BSP_ID_OFFSET: usize = 0x0C;

/// Offset of the first memory map entry.
pub const MEMORY_MAP_OFFSET: usize = 0x80;

/// Size of one memory map entry.
pub const MEMORY_ENTRY_SIZE: usize = 16;

/// Bits of the size field that carry the region type.
const TAG_MASK: u64 = 0xF;

/// Type of a memory map region.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum MemoryRegionKind {
    Used,
    Free,
    Acpi,
    Mmio,
}

impl MemoryRegionKind {
    /// Decodes the 4-bit tag. Unknown values are treated as [`Used`](Self::Used)
    /// so that nothing allocates from them.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Self {
        match tag {
            1 => Self::Free,
            2 => Self::Acpi,
            3 => Self::Mmio,
            _ => Self::Used,
        }
    }
}

/// A decoded memory map entry.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct MemoryRegion {
    base: PhysicalAddress,
    size: u64,
    kind: MemoryRegionKind,
}

impl MemoryRegion {
    /// Decodes a raw entry from its base pointer and tagged size field.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn decode(ptr: u64, tagged_size: u64) -> Self {
        Self {
            base: PhysicalAddress::new(ptr),
            size: tagged_size & !TAG_MASK,
            kind: MemoryRegionKind::from_tag((tagged_size & TAG_MASK) as u8),
        }
    }

    #[must_use]
    pub const fn new(base: PhysicalAddress, size: u64, kind: MemoryRegionKind) -> Self {
        Self {
            base,
            size: size & !TAG_MASK,
            kind,
        }
    }

    #[must_use]
    pub const fn base(&self) -> PhysicalAddress {
        self.base
    }

    #[must_use]
    pub const fn size(&self) -> u64 {
        self.size
    }

    #[must_use]
    pub const fn kind(&self) -> MemoryRegionKind {
        self.kind
    }

    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.kind, MemoryRegionKind::Free)
    }

    #[must_use]
    pub const fn range(&self) -> AddressRange {
        AddressRange::new(self.base, self.size)
    }
}

impl fmt::Debug for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.kind, self.range())
    }
}

/// View over the boot information block.
///
/// The block is owned by the boot loader and only ever read. Fields beyond the
/// end of the supplied bytes read as zero, and entries past the end are `None`.
#[derive(Copy, Clone)]
pub struct BootInfo<'a> {
    bytes: &'a [u8],
}

impl<'a> BootInfo<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Total declared size of the block in bytes.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.read::<4>(SIZE_OFFSET).map_or(0, u32::from_le_bytes)
    }

    #[must_use]
    pub fn num_cores(&self) -> u16 {
        self.read::<2>(NUM_CORES_OFFSET).map_or(0, u16::from_le_bytes)
    }

    /// Hardware ID of the designated bootstrap core.
    #[must_use]
    pub fn bootstrap_cpu(&self) -> u16 {
        self.read::<2>(BSP_ID_OFFSET).map_or(0, u16::from_le_bytes)
    }

    /// Number of memory map entries declared by the block size.
    #[must_use]
    pub fn memory_map_len(&self) -> usize {
        (self.size() as usize).saturating_sub(MEMORY_MAP_OFFSET) / MEMORY_ENTRY_SIZE
    }

    /// Decodes the entry at `index`.
    #[must_use]
    pub fn memory_region(&self, index: usize) -> Option<MemoryRegion> {
        if index >= self.memory_map_len() {
            return None;
        }

        let offset = MEMORY_MAP_OFFSET + index * MEMORY_ENTRY_SIZE;
        let ptr = u64::from_le_bytes(self.read::<8>(offset)?);
        let tagged_size = u64::from_le_bytes(self.read::<8>(offset + 8)?);
        Some(MemoryRegion::decode(ptr, tagged_size))
    }

    /// All decodable entries in map order.
    pub fn memory_regions(&self) -> impl Iterator<Item = MemoryRegion> + use<'a> {
        let info = *self;
        (0..info.memory_map_len()).map_while(move |i| info.memory_region(i))
    }

    /// Entries tagged [`MemoryRegionKind::Free`].
    pub fn free_regions(&self) -> impl Iterator<Item = MemoryRegion> + use<'a> {
        self.memory_regions().filter(MemoryRegion::is_free)
    }

    fn read<const N: usize>(&self, offset: usize) -> Option<[u8; N]> {
        self.bytes.get(offset..offset + N)?.try_into().ok()
    }
}

impl fmt::Debug for BootInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootInfo")
            .field("size", &self.size())
            .field("num_cores", &self.num_cores())
            .field("bootstrap_cpu", &self.bootstrap_cpu())
            .field("memory_map_len", &self.memory_map_len())
            .finish()
    }
}
