use crate::qemu_trace;
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// Mirrors log records to the UEFI console and the QEMU debug console.
pub struct LessonLogger {
    max_level: LevelFilter,
}

impl LessonLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Installs the logger. Call once, before the first log record.
    ///
    /// # Errors
    /// Fails if a logger is already installed.
    #[allow(static_mut_refs)]
    pub fn init(self) -> Result<(), SetLoggerError> {
        static mut LOGGER: Option<LessonLogger> = None;

        // SAFETY: lessons are single threaded and call this once before logging.
        let logger: &'static Self = unsafe { LOGGER.insert(self) };
        log::set_logger(logger)?;
        log::set_max_level(logger.max_level);
        Ok(())
    }
}

impl Log for LessonLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        qemu_trace!(
            "[{}] {}: {}\n",
            record.level(),
            record.target(),
            record.args()
        );
        uefi::println!(
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}
