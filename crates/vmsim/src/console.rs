//! Defines the console logger that writes log records to stderr.

use std::io::{self, Stderr, Write};

use log::{LevelFilter, SetLoggerError};
use spin::{Mutex, Once};

pub struct Console {
    level: LevelFilter,
    stderr: Mutex<Stderr>,
}

static DEFAULT: Once<Console> = Once::new();

impl Console {
    /// Installs the console as the global logger, showing records up to `level`.
    pub fn init(level: LevelFilter) -> Result<&'static Self, SetLoggerError> {
        let console = DEFAULT.call_once(|| Console {
            level,
            stderr: Mutex::new(io::stderr()),
        });
        console.install()?;
        Ok(console)
    }

    fn install(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.level);
        Ok(())
    }

    /// Maps the number of `-v` flags to a level filter.
    pub fn level_for(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

impl log::Log for Console {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Nowhere left to report a failed write to stderr.
        let _ = write_log_entry_to(&mut *self.stderr.lock(), record);
    }

    fn flush(&self) {
        let _ = self.stderr.lock().flush();
    }
}

fn write_log_entry_to(writer: &mut impl Write, record: &log::Record) -> io::Result<()> {
    #[cfg(any(debug_assertions, feature = "detailed-logging"))]
    return writeln!(
        writer,
        "[{} {}:{} {}] {}",
        record.level(),
        record.file().unwrap_or("unknown"),
        record.line().unwrap_or(0),
        record.target(),
        record.args()
    );
    #[cfg(not(any(debug_assertions, feature = "detailed-logging")))]
    return writeln!(writer, "[{:5}] {}", record.level(), record.args());
}
