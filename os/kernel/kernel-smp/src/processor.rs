use crate::{Platform, SystemState};
use core::fmt::Write;
use kernel_alloc::{Allocator, BumpAllocator, ChainedAllocator};
use kernel_devices::{DeviceWriter, DiagnosticDevice};
use kernel_err::KernelResult;
use kernel_info::boot::BootInfo;
use log::{error, info, warn};

/// What a core does during bring-up. Decided once, at entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Role {
    Bootstrap,
    Application,
}

impl Role {
    #[must_use]
    pub const fn identify(cpu_id: u16, bootstrap_id: u16) -> Self {
        if cpu_id == bootstrap_id {
            Self::Bootstrap
        } else {
            Self::Application
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProcessorState {
    Unstarted,
    RunningBootstrap,
    RunningApplication,
    Halted,
}

/// One core's pass through bring-up.
pub struct Processor<'a, P: ?Sized> {
    id: u16,
    role: Role,
    state: ProcessorState,
    platform: &'a P,
    system: &'a SystemState,
}

impl<'a, P: Platform + ?Sized> Processor<'a, P> {
    /// Identifies the calling core against the boot block.
    pub fn new(platform: &'a P, system: &'a SystemState, boot: &BootInfo<'_>) -> Self {
        let id = platform.current_cpu_id();
        Self {
            id,
            role: Role::identify(id, boot.bootstrap_cpu()),
            state: ProcessorState::Unstarted,
            platform,
            system,
        }
    }

    #[must_use]
    pub const fn id(&self) -> u16 {
        self.id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub const fn state(&self) -> ProcessorState {
        self.state
    }

    /// Runs this core's path and reports the outcome on `device`.
    ///
    /// Failures are reported, not retried; the core ends up
    /// [`Halted`](ProcessorState::Halted) either way. On the bootstrap core a
    /// failure means readiness is never published.
    ///
    /// # Errors
    /// The first error of the core's path, after it has been reported.
    pub fn run<const N: usize>(
        &mut self,
        boot: &BootInfo<'_>,
        chain: &mut ChainedAllocator<BumpAllocator, N>,
        device: &mut impl DiagnosticDevice,
    ) -> KernelResult<()> {
        let device_ready = match device.initialize() {
            Ok(()) => true,
            Err(err) => {
                warn!("CPU #{}: diagnostic device unavailable: {err}", self.id);
                false
            }
        };

        let result = match self.role {
            Role::Bootstrap => self.bootstrap(boot, chain),
            Role::Application => self.application(),
        };
        self.state = ProcessorState::Halted;

        if device_ready {
            let mut out = DeviceWriter::new(device);
            // DeviceWriter is infallible.
            match result {
                Ok(()) => writeln!(out, "CPU #{} ready ({} CPUs)", self.id, self.system.cpu_count()).ok(),
                Err(err) => writeln!(out, "Bring-up failed on CPU #{}: {err}", self.id).ok(),
            };
        }
        if let Err(err) = result {
            error!("Bring-up failed on CPU #{}: {err}", self.id);
        }
        result
    }

    /// [`run`](Self::run), then halt.
    pub fn run_to_halt<const N: usize>(
        mut self,
        boot: &BootInfo<'_>,
        chain: &mut ChainedAllocator<BumpAllocator, N>,
        device: &mut impl DiagnosticDevice,
    ) -> ! {
        let _ = self.run(boot, chain, device);
        self.platform.halt()
    }

    fn bootstrap<const N: usize>(
        &mut self,
        boot: &BootInfo<'_>,
        chain: &mut ChainedAllocator<BumpAllocator, N>,
    ) -> KernelResult<()> {
        self.state = ProcessorState::RunningBootstrap;
        info!("CPU #{} is the bootstrap processor of {}", self.id, boot.num_cores());

        let members = chain.add_free_regions(boot.free_regions())?;
        info!("Seeded {members} allocator(s) with {} KiB", chain.available_memory() / 1024);

        self.platform.initialize(&*chain)?;
        self.system.publish(boot.num_cores());
        info!("Platform ready");
        Ok(())
    }

    fn application(&mut self) -> KernelResult<()> {
        self.state = ProcessorState::RunningApplication;
        self.system.wait(|| self.platform.pause());
        self.platform.initialize_local()?;
        info!("CPU #{} ready", self.id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_decided_by_id() {
        assert_eq!(Role::identify(0, 0), Role::Bootstrap);
        assert_eq!(Role::identify(3, 0), Role::Application);
        assert_eq!(Role::identify(2, 2), Role::Bootstrap);
    }
}
