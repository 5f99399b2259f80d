/// Operand of `lgdt`/`lidt`: table size minus one, then the base address.
#[repr(C, packed)]
#[derive(Copy, Clone)]
pub struct DescriptorTablePointer {
    limit: u16,
    base: u64,
}

impl DescriptorTablePointer {
    /// Pointer covering `T` located at `table`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to<T>(table: &T) -> Self {
        Self {
            limit: (size_of::<T>() - 1) as u16,
            base: core::ptr::from_ref(table) as u64,
        }
    }

    #[must_use]
    pub const fn limit(&self) -> u16 {
        self.limit
    }

    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }
}

impl core::fmt::Debug for DescriptorTablePointer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (limit, base) = (self.limit, self.base);
        write!(f, "DescriptorTablePointer {{ base: {base:#x}, limit: {limit:#x} }}")
    }
}

const _: () = assert!(size_of::<DescriptorTablePointer>() == 10);
