use core::sync::atomic::{AtomicBool, Ordering};

/// One-shot, process-wide "platform is ready" signal.
///
/// Exactly one writer raises the flag with [`publish`](Self::publish); any
/// number of readers poll it. Both sides use sequentially consistent ordering,
/// so everything the writer did before publishing is visible to a reader that
/// observes the flag.
#[derive(Debug)]
pub struct ReadinessFlag {
    ready: AtomicBool,
}

impl ReadinessFlag {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ready: AtomicBool::new(false),
        }
    }

    /// Raises the flag.
    #[inline]
    pub fn publish(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Polls until the flag is raised, calling `pause` between polls.
    ///
    /// Never returns if the writer never publishes.
    #[inline]
    pub fn wait(&self, mut pause: impl FnMut()) {
        while !self.is_ready() {
            pause();
        }
    }
}

impl Default for ReadinessFlag {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_lowered() {
        let flag = ReadinessFlag::new();
        assert!(!flag.is_ready());
        flag.publish();
        assert!(flag.is_ready());
    }

    #[test]
    fn wait_returns_immediately_when_ready() {
        let flag = ReadinessFlag::new();
        flag.publish();
        let mut polls = 0;
        flag.wait(|| polls += 1);
        assert_eq!(polls, 0);
    }
}
