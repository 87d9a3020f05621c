//! Logging module.
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::SystemTime;

use chrono::prelude::*;
use colored::*;

use crate::conf::BlazeConf;

pub use log::{Level, Log, Metadata, Record, SetLoggerError};

struct Logger {
    level: Level,
    file: Option<Mutex<File>>,
}

impl Logger {
    fn format(record: &Record) -> String {
        let line = format!(
            "{:<5} {} {}",
            record.level(),
            record.target().bold(),
            record.args(),
        );
        let line = match record.level() {
            Level::Error => line.red(),
            Level::Warn => line.yellow(),
            Level::Info => line.normal(),
            Level::Debug => line.dimmed(),
            Level::Trace => line.cyan().dimmed(),
        };
        let now: DateTime<Utc> = DateTime::from(SystemTime::now());
        format!(
            "{} {}",
            now.to_rfc3339_opts(SecondsFormat::Millis, true).white(),
            line
        )
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format(record);
        // write errors are ignored
        let _ = match self.file {
            Some(ref file) => {
                let mut file = file.lock().unwrap_or_else(|err| err.into_inner());
                writeln!(file, "{line}")
            }
            None => writeln!(io::stdout(), "{line}"),
        };
    }

    fn flush(&self) {
        if let Some(ref file) = self.file {
            let mut file = file.lock().unwrap_or_else(|err| err.into_inner());
            let _ = file.flush();
        }
    }
}

/// Initialize the global logger, it can be done only once per process.
pub fn init(level: &str, file: Option<PathBuf>) -> anyhow::Result<()> {
    let file = match file {
        Some(path) => Some(Mutex::new(File::create(path)?)),
        None => None,
    };
    let level = Level::from_str(level).map_err(|err| anyhow::anyhow!("{err}"))?;
    let logger = Logger { level, file };

    log::set_boxed_logger(Box::new(logger)).map_err(|err| anyhow::anyhow!("{err}"))?;
    log::set_max_level(level.to_level_filter());
    Ok(())
}

/// Initialize the global logger with the `log-level` and `log-file`
/// of a configuration.
pub fn init_from(conf: &BlazeConf) -> anyhow::Result<()> {
    init(&conf.log_level, conf.log_file.as_ref().map(PathBuf::from))
}

/// Truncate a long string (like a bolt11 invoice) before logging it.
pub fn short(value: &str) -> String {
    const PREFIX: usize = 24;
    match value.char_indices().nth(PREFIX) {
        Some((idx, _)) => format!("{}...", &value[..idx]),
        None => value.to_owned(),
    }
}
