use kernel_alloc::Allocator;
use kernel_err::KernelResult;

/// CPU- and machine-specific operations used during bring-up.
pub trait Platform {
    /// Hardware ID of the calling core.
    fn current_cpu_id(&self) -> u16;

    /// One-time initialization on the bootstrap core; allocates what it
    /// needs from `allocator` and loads it on the calling core.
    ///
    /// # Errors
    /// Allocation or table construction failures.
    fn initialize(&self, allocator: &dyn Allocator) -> KernelResult<()>;

    /// Per-core initialization on an application core, reusing what
    /// [`initialize`](Self::initialize) built.
    ///
    /// # Errors
    /// If the shared state is not available.
    fn initialize_local(&self) -> KernelResult<()>;

    /// Yields the core inside a busy-wait.
    fn pause(&self);

    /// Stops the calling core for good.
    fn halt(&self) -> !;
}
