use crate::qemu_fmt::QemuSink;
use core::fmt;
use kernel_err::{Error, KernelResult};
use kernel_info::environment::Environment;
use kernel_sync::{SpinLock, SyncOnceCell};
use log::{LevelFilter, Log, Metadata, Record};

static LOGGER: SyncOnceCell<QemuLogger> = SyncOnceCell::new();

/// Environment key selecting the log level.
pub const LOG_LEVEL_KEY: &str = "loglevel";

pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Info;

/// `log` backend for the QEMU debug console.
///
/// Records are written as `"[LEVEL] target: message\n"`. A spin lock keeps
/// lines from different cores from interleaving.
pub struct QemuLogger {
    max_level: LevelFilter,
    lock: SpinLock<()>,
}

impl QemuLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self {
            max_level,
            lock: SpinLock::new(()),
        }
    }

    /// Level from the `loglevel` environment key. Missing or unparsable
    /// values fall back to [`DEFAULT_LEVEL`].
    #[must_use]
    pub fn from_environment(env: &Environment<'_>) -> Self {
        let level = env
            .get(LOG_LEVEL_KEY)
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_LEVEL);
        Self::new(level)
    }

    /// Installs the logger. Call once, on the bootstrap core, before
    /// anything logs.
    ///
    /// # Errors
    /// [`Error::UNSUPPORTED`] if a logger is already installed.
    pub fn init(self) -> KernelResult<()> {
        let level = self.max_level;
        let logger = LOGGER.set(self).map_err(|_| Error::UNSUPPORTED)?;
        log::set_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }
}

impl Log for QemuLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let _guard = self.lock.lock();
        let _ = write_record(&mut QemuSink, record);
    }

    fn flush(&self) {}
}

/// Formats one record the way [`QemuLogger`] emits it.
///
/// # Errors
/// Propagates the writer's error.
pub fn write_record(out: &mut impl fmt::Write, record: &Record) -> fmt::Result {
    writeln!(out, "[{}] {}: {}", record.level(), record.target(), record.args())
}
