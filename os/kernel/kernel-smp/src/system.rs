use core::sync::atomic::{AtomicU16, Ordering};
use kernel_sync::ReadinessFlag;

/// State shared by all cores during bring-up.
#[derive(Debug, Default)]
pub struct SystemState {
    ready: ReadinessFlag,
    cpu_count: AtomicU16,
}

impl SystemState {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: ReadinessFlag::new(),
            cpu_count: AtomicU16::new(0),
        }
    }

    /// Records the number of cores and raises readiness. Bootstrap core only.
    pub fn publish(&self, cpu_count: u16) {
        self.cpu_count.store(cpu_count, Ordering::Relaxed);
        self.ready.publish();
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.is_ready()
    }

    /// Spins until [`publish`](Self::publish) has run.
    pub fn wait(&self, pause: impl FnMut()) {
        self.ready.wait(pause);
    }

    /// Number of cores; zero until published.
    #[must_use]
    pub fn cpu_count(&self) -> u16 {
        if self.is_ready() {
            self.cpu_count.load(Ordering::Relaxed)
        } else {
            0
        }
    }
}
