use kernel_alloc::{Allocator, BumpAllocator, ChainedAllocator, OUT_OF_MEMORY, OVERLAPPED_MEMORY, allocate_for};
use kernel_descriptors::{DescriptorTables, ExceptionHandlers, Gdt, Idt};
use kernel_devices::DiagnosticDevice;
use kernel_err::{Error, KernelResult};
use kernel_info::boot::BootInfo;
use kernel_memory_addresses::{AddressRange, PhysicalAddress};
use kernel_smp::{Platform, Processor, ProcessorState, Role, SystemState};
use kernel_sync::SyncOnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

const TABLES_NOT_BUILT: Error = Error::new("TablesNotBuilt");

fn boot_block(cores: u16, bsp: u16, entries: &[(u64, u64)]) -> Vec<u8> {
    let size = 0x80 + entries.len() * 16;
    let mut bytes = vec![0u8; size];
    bytes[0x04..0x08].copy_from_slice(&u32::try_from(size).unwrap().to_le_bytes());
    bytes[0x0A..0x0C].copy_from_slice(&cores.to_le_bytes());
    bytes[0x0C..0x0E].copy_from_slice(&bsp.to_le_bytes());
    for (i, (ptr, size)) in entries.iter().enumerate() {
        let off = 0x80 + i * 16;
        bytes[off..off + 8].copy_from_slice(&ptr.to_le_bytes());
        bytes[off + 8..off + 16].copy_from_slice(&size.to_le_bytes());
    }
    bytes
}

#[derive(Default)]
struct Console {
    out: String,
}

impl DiagnosticDevice for Console {
    fn initialize(&mut self) -> KernelResult<()> {
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) {
        self.out.push(char::from(byte));
    }
}

/// A console whose device never comes up.
#[derive(Default)]
struct DeadConsole {
    attempts: usize,
    written: usize,
}

impl DiagnosticDevice for DeadConsole {
    fn initialize(&mut self) -> KernelResult<()> {
        self.attempts += 1;
        Err(Error::new("FaultySerialPort"))
    }

    fn write_byte(&mut self, _byte: u8) {
        self.written += 1;
    }
}

/// Platform state shared by all simulated cores.
#[derive(Default)]
struct Machine {
    /// Addresses of the GDT and IDT reserved by the bootstrap core.
    tables: SyncOnceCell<(PhysicalAddress, PhysicalAddress)>,
    local_inits: AtomicUsize,
    pauses: AtomicUsize,
}

/// One simulated core. Only reserves the table memory, so it works with
/// addresses that do not exist on the host.
struct Core {
    id: u16,
    machine: Arc<Machine>,
}

impl Platform for Core {
    fn current_cpu_id(&self) -> u16 {
        self.id
    }

    fn initialize(&self, allocator: &dyn Allocator) -> KernelResult<()> {
        let gdt = allocate_for::<Gdt>(allocator)?;
        let idt = allocate_for::<Idt>(allocator)?;
        self.machine.tables.set((gdt, idt)).map_err(|_| Error::UNSUPPORTED)?;
        Ok(())
    }

    fn initialize_local(&self) -> KernelResult<()> {
        self.machine.tables.get().ok_or(TABLES_NOT_BUILT)?;
        self.machine.local_inits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn pause(&self) {
        self.machine.pauses.fetch_add(1, Ordering::Relaxed);
        thread::yield_now();
    }

    fn halt(&self) -> ! {
        panic!("CPU #{} halted", self.id)
    }
}

fn spawn_application_core(
    id: u16,
    machine: &Arc<Machine>,
    system: &Arc<SystemState>,
    block: &Arc<Vec<u8>>,
) -> thread::JoinHandle<(KernelResult<()>, ProcessorState, String)> {
    let machine = Arc::clone(machine);
    let system = Arc::clone(system);
    let block = Arc::clone(block);
    thread::spawn(move || {
        let core = Core { id, machine };
        let boot = BootInfo::new(&block);
        let mut processor = Processor::new(&core, &system, &boot);
        assert_eq!(processor.role(), Role::Application);
        let mut chain = ChainedAllocator::<BumpAllocator, 1>::new();
        let mut console = Console::default();
        let result = processor.run(&boot, &mut chain, &mut console);
        (result, processor.state(), console.out)
    })
}

#[test]
fn two_cpus_with_one_megabyte_free() {
    let block = Arc::new(boot_block(2, 0, &[(0x10_0000, 0x10_0000 | 1)]));
    let machine = Arc::new(Machine::default());
    let system = Arc::new(SystemState::new());

    let ap = spawn_application_core(1, &machine, &system, &block);

    let core = Core {
        id: 0,
        machine: Arc::clone(&machine),
    };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    let mut console = Console::default();
    let mut bsp = Processor::new(&core, &system, &boot);
    assert_eq!(bsp.role(), Role::Bootstrap);
    assert_eq!(bsp.state(), ProcessorState::Unstarted);

    assert_eq!(bsp.run(&boot, &mut chain, &mut console), Ok(()));
    assert_eq!(bsp.state(), ProcessorState::Halted);
    assert_eq!(console.out, "CPU #0 ready (2 CPUs)\n");
    assert!(system.is_ready());
    assert_eq!(system.cpu_count(), 2);

    let (gdt, idt) = *machine.tables.get().unwrap();
    let free = AddressRange::new(PhysicalAddress::new(0x10_0000), 0x10_0000);
    assert!(free.contains(gdt) && free.contains(idt));
    assert_eq!(chain.len(), 1);
    assert!(chain.available_memory() <= 0x10_0000 - 4096 - 32);

    let (result, state, out) = ap.join().unwrap();
    assert_eq!(result, Ok(()));
    assert_eq!(state, ProcessorState::Halted);
    assert_eq!(out, "CPU #1 ready (2 CPUs)\n");
    assert_eq!(machine.local_inits.load(Ordering::SeqCst), 1);
}

#[test]
fn many_application_cores_wait_for_the_bootstrap_core() {
    let block = Arc::new(boot_block(4, 2, &[(0x10_0000, 0x10_0000 | 1)]));
    let machine = Arc::new(Machine::default());
    let system = Arc::new(SystemState::new());

    let aps: Vec<_> = [0u16, 1, 3]
        .into_iter()
        .map(|id| spawn_application_core(id, &machine, &system, &block))
        .collect();

    while machine.pauses.load(Ordering::Relaxed) == 0 {
        thread::yield_now();
    }
    assert_eq!(machine.local_inits.load(Ordering::SeqCst), 0);

    let core = Core {
        id: 2,
        machine: Arc::clone(&machine),
    };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    Processor::new(&core, &system, &boot)
        .run(&boot, &mut chain, &mut Console::default())
        .unwrap();

    for ap in aps {
        let (result, _, out) = ap.join().unwrap();
        assert_eq!(result, Ok(()));
        assert!(out.ends_with("ready (4 CPUs)\n"), "{out}");
    }
    assert_eq!(machine.local_inits.load(Ordering::SeqCst), 3);
}

#[test]
fn no_free_memory_fails_the_bootstrap_core() {
    let block = Arc::new(boot_block(2, 0, &[(0, 0x9_F000), (0xFEE0_0000, 0x1000 | 3)]));
    let machine = Arc::new(Machine::default());
    let system = Arc::new(SystemState::new());

    let ap = spawn_application_core(1, &machine, &system, &block);

    let core = Core {
        id: 0,
        machine: Arc::clone(&machine),
    };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    let mut console = Console::default();
    let mut bsp = Processor::new(&core, &system, &boot);

    assert_eq!(bsp.run(&boot, &mut chain, &mut console), Err(OUT_OF_MEMORY));
    assert_eq!(bsp.state(), ProcessorState::Halted);
    assert_eq!(console.out, "Bring-up failed on CPU #0: OutOfMemory\n");
    assert!(!system.is_ready());

    // The application core keeps spinning; it is never joined.
    let seen = machine.pauses.load(Ordering::Relaxed);
    thread::sleep(Duration::from_millis(20));
    assert!(machine.pauses.load(Ordering::Relaxed) > seen);
    assert!(!ap.is_finished());
    assert_eq!(machine.local_inits.load(Ordering::SeqCst), 0);
}

#[test]
fn overlapping_boot_regions_are_reported() {
    let block = boot_block(1, 0, &[(0x10_0000, 0x10_0000 | 1), (0x18_0000, 0x1000 | 1)]);
    let machine = Arc::new(Machine::default());
    let system = SystemState::new();

    let core = Core { id: 0, machine };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    let mut console = Console::default();

    let result = Processor::new(&core, &system, &boot).run(&boot, &mut chain, &mut console);
    assert_eq!(result, Err(OVERLAPPED_MEMORY));
    assert_eq!(console.out, "Bring-up failed on CPU #0: OverlappedMemory\n");
    assert!(!system.is_ready());
}

#[test]
fn bring_up_continues_without_a_diagnostic_device() {
    let block = Arc::new(boot_block(2, 0, &[(0x10_0000, 0x10_0000 | 1)]));
    let machine = Arc::new(Machine::default());
    let system = Arc::new(SystemState::new());

    let ap = spawn_application_core(1, &machine, &system, &block);

    let core = Core {
        id: 0,
        machine: Arc::clone(&machine),
    };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    let mut console = DeadConsole::default();
    let mut bsp = Processor::new(&core, &system, &boot);

    assert_eq!(bsp.run(&boot, &mut chain, &mut console), Ok(()));
    assert_eq!(bsp.state(), ProcessorState::Halted);
    assert_eq!(console.attempts, 1);
    assert_eq!(console.written, 0);
    assert!(system.is_ready());
    assert!(machine.tables.is_set());

    let (result, _, out) = ap.join().unwrap();
    assert_eq!(result, Ok(()));
    assert_eq!(out, "CPU #1 ready (2 CPUs)\n");
}

/// Builds real tables in host memory and shares them like the kernel does.
struct TableCore {
    id: u16,
    tables: Arc<SyncOnceCell<DescriptorTables>>,
}

impl Platform for TableCore {
    fn current_cpu_id(&self) -> u16 {
        self.id
    }

    fn initialize(&self, allocator: &dyn Allocator) -> KernelResult<()> {
        let handlers: ExceptionHandlers = core::array::from_fn(|v| 0x1000 + v as u64 * 16);
        let tables = unsafe { DescriptorTables::build(allocator, &handlers) }?;
        self.tables.set(tables).map_err(|_| Error::UNSUPPORTED)?;
        Ok(())
    }

    fn initialize_local(&self) -> KernelResult<()> {
        let tables = self.tables.get().ok_or(TABLES_NOT_BUILT)?;
        tables.gdt().code_selector()?;
        Ok(())
    }

    fn pause(&self) {
        thread::yield_now();
    }

    fn halt(&self) -> ! {
        panic!("halted")
    }
}

#[test]
fn bootstrap_builds_real_tables_for_application_cores() {
    let memory: &'static mut [u8] = Box::leak(vec![0u8; 0x10_000].into_boxed_slice());
    let base = memory.as_ptr() as u64;
    let block = Arc::new(boot_block(2, 0, &[((base + 0xF) & !0xF, 0xF000 | 1)]));
    let tables = Arc::new(SyncOnceCell::new());
    let system = Arc::new(SystemState::new());

    let ap = {
        let (block, tables, system) = (Arc::clone(&block), Arc::clone(&tables), Arc::clone(&system));
        thread::spawn(move || {
            let core = TableCore { id: 1, tables };
            let boot = BootInfo::new(&block);
            let mut chain = ChainedAllocator::<BumpAllocator, 1>::new();
            let mut console = Console::default();
            Processor::new(&core, &system, &boot).run(&boot, &mut chain, &mut console).map(|()| console.out)
        })
    };

    let core = TableCore {
        id: 0,
        tables: Arc::clone(&tables),
    };
    let boot = BootInfo::new(&block);
    let mut chain = ChainedAllocator::<BumpAllocator, 32>::new();
    let mut console = Console::default();
    Processor::new(&core, &system, &boot)
        .run(&boot, &mut chain, &mut console)
        .unwrap();

    let built = tables.get().unwrap();
    assert_eq!(built.idt().present_vectors().count(), 32);
    assert_eq!(ap.join().unwrap(), Ok(String::from("CPU #1 ready (2 CPUs)\n")));
}
