use crate::gdt::Gdt;
use crate::idt::Idt;
use core::fmt;
use kernel_alloc::{Allocator, allocate_for};
use kernel_err::{Error, KernelResult};
use kernel_info::memory::EXCEPTION_VECTORS;
use log::debug;

/// The allocator returned address zero for a table.
pub const NULL_ALLOCATION: Error = Error::new("NullAllocation");

/// Entry point addresses for vectors `0..32`.
pub type ExceptionHandlers = [u64; EXCEPTION_VECTORS];

/// A GDT and IDT living in never-freed allocator memory.
///
/// Built once by the bootstrap core and shared with every other core, which
/// load the same tables.
#[derive(Copy, Clone)]
pub struct DescriptorTables {
    gdt: &'static Gdt,
    idt: &'static Idt,
}

impl DescriptorTables {
    /// Allocates and fills both tables.
    ///
    /// # Errors
    /// * The allocator's error if either table does not fit.
    /// * [`NULL_ALLOCATION`] if a table would be placed at address zero.
    /// * [`MISSING_CODE_SEGMENT`](crate::MISSING_CODE_SEGMENT) or
    ///   [`MISSING_DATA_SEGMENT`](crate::MISSING_DATA_SEGMENT) if the GDT is
    ///   unusable.
    ///
    /// # Safety
    /// Addresses returned by `allocator` must be identity-mapped, writable,
    /// unused by anything else, and never reclaimed.
    pub unsafe fn build(
        allocator: &(impl Allocator + ?Sized),
        handlers: &ExceptionHandlers,
    ) -> KernelResult<Self> {
        let gdt_ptr = allocate_for::<Gdt>(allocator)?.as_mut_ptr::<Gdt>();
        if gdt_ptr.is_null() {
            return Err(NULL_ALLOCATION);
        }
        // SAFETY: fresh memory sized and aligned for a Gdt, per the contract.
        let gdt: &'static Gdt = unsafe {
            gdt_ptr.write(Gdt::new());
            &*gdt_ptr
        };
        let code = gdt.code_selector()?;
        gdt.data_selector()?;

        let idt_ptr = allocate_for::<Idt>(allocator)?.as_mut_ptr::<Idt>();
        if idt_ptr.is_null() {
            return Err(NULL_ALLOCATION);
        }
        // SAFETY: as above.
        let idt: &'static mut Idt = unsafe {
            Idt::init_in_place(idt_ptr);
            &mut *idt_ptr
        };
        idt.install_exception_handlers(handlers, code);

        debug!("Built GDT at {gdt_ptr:p} and IDT at {idt_ptr:p}");
        Ok(Self { gdt, idt })
    }

    #[must_use]
    pub const fn gdt(&self) -> &'static Gdt {
        self.gdt
    }

    #[must_use]
    pub const fn idt(&self) -> &'static Idt {
        self.idt
    }

    /// Loads both tables on the calling core.
    ///
    /// # Errors
    /// Propagates [`Gdt::load`] failures; the IDT is then not loaded.
    ///
    /// # Safety
    /// Must run at CPL0 with interrupts disabled.
    pub unsafe fn load(&self) -> KernelResult<()> {
        unsafe {
            self.gdt.load()?;
            self.idt.load();
        }
        Ok(())
    }
}

impl fmt::Debug for DescriptorTables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DescriptorTables")
            .field("gdt", &self.gdt.pointer())
            .field("idt", &self.idt.pointer())
            .finish()
    }
}
