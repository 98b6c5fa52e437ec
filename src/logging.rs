//! Run log setup.
//!
//! A convert run logs to a fresh timestamped file, one `LEVEL message` line
//! per event. The reconciler logs plain messages to stdout.

use chrono::{Local, NaiveDateTime};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::Level;

const LOG_PREFIX: &str = "convert_adoc_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("failed to create log file {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(#[from] tracing::subscriber::SetGlobalDefaultError),
}

pub fn log_file_name(now: NaiveDateTime) -> String {
    format!("{LOG_PREFIX}{}.log", now.format(TIMESTAMP_FORMAT))
}

/// Route all events to a new log file in `dir`, replacing any file of the
/// same name. Returns the log path.
pub fn init_file_logging(dir: &Path) -> Result<PathBuf, LoggingError> {
    let path = dir.join(log_file_name(Local::now().naive_local()));
    let create_err = |source| LoggingError::Create {
        path: path.clone(),
        source,
    };
    fs::create_dir_all(dir).map_err(create_err)?;
    let file = File::create(&path).map_err(create_err)?;

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(path)
}

/// Plain progress messages on stdout.
pub fn init_console_logging() -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_level(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_log_file_name() {
        let at = NaiveDate::from_ymd_opt(2023, 6, 5)
            .and_then(|date| date.and_hms_opt(21, 55, 19))
            .unwrap();
        assert_eq!(log_file_name(at), "convert_adoc_2023-06-05_21-55-19.log");
    }
}
