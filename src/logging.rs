//! `log` backend that writes through the kernel's console.

use core::fmt;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

pub struct ConsoleLogger {
    print: fn(fmt::Arguments),
}

impl ConsoleLogger {
    /// `print` must not itself log.
    pub const fn new(print: fn(fmt::Arguments)) -> Self {
        Self { print }
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        (self.print)(format_args!(
            "\x1b[{}m[{:>5}] {}\x1b[0m\n",
            level_color(record.level()),
            record.level(),
            record.args()
        ));
    }

    fn flush(&self) {}
}

fn level_color(level: Level) -> u8 {
    match level {
        Level::Error => 31,
        Level::Warn => 93,
        Level::Info => 34,
        Level::Debug => 32,
        Level::Trace => 90,
    }
}

pub fn init(logger: &'static ConsoleLogger, level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Level chosen by the `LOG` build variable, off when unset.
pub fn level_from_env() -> LevelFilter {
    parse_level(option_env!("LOG"))
}

fn parse_level(var: Option<&str>) -> LevelFilter {
    match var {
        Some("ERROR") => LevelFilter::Error,
        Some("WARN") => LevelFilter::Warn,
        Some("INFO") => LevelFilter::Info,
        Some("DEBUG") => LevelFilter::Debug,
        Some("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names() {
        assert_eq!(parse_level(Some("WARN")), LevelFilter::Warn);
        assert_eq!(parse_level(Some("TRACE")), LevelFilter::Trace);
        assert_eq!(parse_level(Some("warn")), LevelFilter::Off);
        assert_eq!(parse_level(None), LevelFilter::Off);
    }

    #[test]
    fn colors_by_level() {
        assert_eq!(level_color(Level::Error), 31);
        assert_eq!(level_color(Level::Trace), 90);
    }
}
