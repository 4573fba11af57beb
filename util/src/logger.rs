//! Generic logger utility functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use log::{self, info};
use fern;
use colored::{ColoredString, Colorize};
use thiserror::Error;

// Internal imports
use crate::session;

// Re-exports
pub use log::LevelFilter;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors associated with initialising the logger.
#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Expected a log level of at least `INFO`, found `{0}`")]
    InvalidMinLogLevel(log::LevelFilter),

    #[error("Error initialising the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("An error occured while setting up the logger: {0}")]
    FernInitError(log::SetLoggerError)
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Initialise the logger for this execution.
/// 
/// Coloured output is written to stdout, and uncoloured output to the
/// session's log file.
///
/// # Notes
/// 
/// - `min_level` must be at least `log::Level::Info`, warnings of rejected
///   control ticks must never be filtered out.
/// 
/// # Safety
/// 
/// - This function must only be called once to prevent corrupting logs.
pub fn logger_init(
    min_level: self::LevelFilter, 
    session: &session::Session
) -> Result<(), LoggerInitError> {

    if min_level < log::Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level))
    }

    let log_file = fern::log_file(session.log_file_path.clone())
        .map_err(LoggerInitError::LogFileInitError)?;

    let stdout_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {}",
                prefix(record, level_to_coloured(record.level())),
                message
            ))
        })
        .chain(std::io::stdout());

    let file_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {}",
                prefix(record, level_to_str(record.level())),
                message
            ))
        })
        .chain(log_file);

    fern::Dispatch::new()
        .level(min_level)
        .level_for("zmq", LevelFilter::Info)
        .chain(stdout_dispatch)
        .chain(file_dispatch)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;
    
    info!("Logging initialised");
    info!("    Session epoch: {}", session::get_epoch());
    info!("    Log level: {:?}", min_level);
    info!("    Log file path: {:?}", session.log_file_path);

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Build the line prefix, including the target for debug and trace records.
fn prefix<L: std::fmt::Display>(record: &log::Record, level: L) -> String {
    if record.level() > log::Level::Info {
        format!(
            "[{:10.6} {}] {}:",
            session::get_elapsed_seconds(),
            level,
            record.target()
        )
    }
    else {
        format!(
            "[{:10.6} {}]",
            session::get_elapsed_seconds(),
            level
        )
    }
}

/// Get the string representation of a log level
fn level_to_str(level: log::Level) -> &'static str {
    match level {
        log::Level::Trace => "TRC",
        log::Level::Debug => "DBG",
        log::Level::Info  => "INF",
        log::Level::Warn  => "WRN",
        log::Level::Error => "ERR"
    }
}

/// Get the coloured terminal representation of a log level
fn level_to_coloured(level: log::Level) -> ColoredString {
    let s = level_to_str(level);

    match level {
        log::Level::Trace => s.dimmed().italic(),
        log::Level::Debug => s.dimmed(),
        log::Level::Info  => s.normal(),
        log::Level::Warn  => s.yellow(),
        log::Level::Error => s.red().bold()
    }
}
