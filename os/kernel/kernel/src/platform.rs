use crate::{cpu, interrupts};
use kernel_alloc::Allocator;
use kernel_descriptors::DescriptorTables;
use kernel_err::{Error, KernelResult};
use kernel_smp::Platform;
use kernel_sync::SyncOnceCell;
use log::debug;

/// Raised when an application core finds no tables to load.
pub const TABLES_NOT_BUILT: Error = Error::new("TablesNotBuilt");

/// Descriptor tables built by the bootstrap core, loaded by every core.
static TABLES: SyncOnceCell<DescriptorTables> = SyncOnceCell::new();

/// Bare-metal x86-64 with identity-mapped physical memory.
pub struct X86_64;

impl Platform for X86_64 {
    fn current_cpu_id(&self) -> u16 {
        cpu::apic_id()
    }

    fn initialize(&self, allocator: &dyn Allocator) -> KernelResult<()> {
        let handlers = interrupts::exception_handlers();
        // SAFETY: the boot loader identity-maps all physical memory and the
        // allocator only hands out free regions above the null page, which
        // are never reclaimed. A null address is rejected by `build`.
        let tables = unsafe { DescriptorTables::build(allocator, &handlers) }?;
        let tables = TABLES.set(tables).map_err(|_| Error::UNSUPPORTED)?;
        debug!("Loading {tables:?}");

        // SAFETY: CPL0, interrupts masked since entry.
        unsafe { tables.load() }
    }

    fn initialize_local(&self) -> KernelResult<()> {
        let tables = TABLES.get().ok_or(TABLES_NOT_BUILT)?;
        // SAFETY: as above.
        unsafe { tables.load() }
    }

    fn pause(&self) {
        cpu::pause();
    }

    fn halt(&self) -> ! {
        cpu::halt()
    }
}
