//! # logsplit
//!
//! logsplit is a small leveled file logger. Every record goes to a main log
//! file, records at [`Level::Error`] and above are mirrored to a companion
//! `.err` file, and either file is rotated once it reaches a size threshold
//! (10 MiB unless configured otherwise). A rotated file is renamed to
//! `<path>_<unix seconds>.bak` and a fresh file is opened in its place.
//!
//! Records look like
//!
//! ```text
//! [2025-04-01 19:55:02.117][server.rs:42][server::accept][ERROR]connection reset
//! ```
//!
//! The logger is synchronous and single-writer: every call performs its
//! stat, write and (occasionally) rename on the calling thread. Wrap it in a
//! `Mutex` to share it.
//!
//! ## Example
//!
//! ```rust
//! use logsplit::{log_error, log_info, FileLogger, Role};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!    let dir = tempfile::tempdir()?;
//!    let mut logger = FileLogger::new("info", "app.log", dir.path())?;
//!
//!    log_info!(logger, "server listening on port {}", 8080);
//!    log_error!(logger, "failed to bind admin port {}", 9090);
//!
//!    // Only the error record is mirrored.
//!    let mirrored = std::fs::read_to_string(logger.path(Role::Error))?;
//!    assert_eq!(mirrored.lines().count(), 1);
//!    Ok(())
//! }
//! ```
//!
//! [`FileLoggerBuilder`] configures the threshold, file modes, time zone,
//! level filter, routing and backup naming. [`FileLoggerBuilder::legacy`]
//! selects the exact-match filter, error-file-only routing and
//! timestamp-only backup names of earlier versions of this logger.
//!
//! Rotations and dropped records are reported as `tracing` events under the
//! [`DIAGNOSTICS_TARGET`] target. When a [`FileLogger`] is itself the writer
//! behind a `tracing` subscriber, turn that target off in the subscriber's
//! filter so those events are not written back into the file being rotated.

mod caller;
mod clock;
mod error;
mod level;
mod logger;
mod rotation;

pub use {
    caller::{CallSite, CallerInfo, FixedResolver, FrameResolver, SourceResolver},
    clock::{Clock, SystemClock, TimeZone},
    error::{LoggerError, Result},
    level::{Level, LevelFilter},
    logger::{FileLogger, FileLoggerBuilder, Logger, Routing},
    rotation::{
        backup_path, list_backups, should_rotate, BackupNaming, Role, RotationSize, DEFAULT_FILE_MODE,
        DEFAULT_MAX_SIZE, DEFAULT_ROTATED_FILE_MODE, DIAGNOSTICS_TARGET,
    },
};

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        use $crate::Logger as _;
        $logger.log_at($crate::call_site!(), $level, format_args!($($arg)+))
    }};
}

/// Log at [`Level::Debug`], recording the caller's file, line and function.
#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::Level::Debug, $($arg)+)
    };
}

/// Log at [`Level::Info`], recording the caller's file, line and function.
#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::Level::Info, $($arg)+)
    };
}

/// Log at [`Level::Warning`], recording the caller's file, line and function.
#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::Level::Warning, $($arg)+)
    };
}

/// Log at [`Level::Error`], recording the caller's file, line and function.
#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::Level::Error, $($arg)+)
    };
}

/// Log at [`Level::Fatal`], recording the caller's file, line and function.
/// Does not stop the process.
#[macro_export]
macro_rules! log_fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::__log!($logger, $crate::Level::Fatal, $($arg)+)
    };
}
