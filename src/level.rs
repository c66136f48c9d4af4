use {
    crate::error::LoggerError,
    std::{fmt, str::FromStr},
};

/// Severity of a log record, ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
    Fatal,
}

impl Level {
    /// All levels in ascending order of severity.
    pub const ALL: [Level; 5] = [Level::Debug, Level::Info, Level::Warning, Level::Error, Level::Fatal];

    /// Resolve a level from configuration text.
    ///
    /// Matching is case-insensitive against `debug`, `info`, `error` and
    /// `fata`. Anything else, including `warn` and `fatal`, resolves to
    /// [`Level::Debug`]. Use [`str::parse`] when unknown input should be
    /// rejected instead.
    pub fn parse(text: &str) -> Level {
        match text.to_lowercase().as_str() {
            "debug" => Level::Debug,
            "info" => Level::Info,
            "error" => Level::Error,
            "fata" => Level::Fatal,
            _ => Level::Debug,
        }
    }

    /// The label written into each record.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warning => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Whether records at this level are mirrored to the error file.
    pub fn is_error(&self) -> bool {
        *self >= Level::Error
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warning),
            "error" => Ok(Level::Error),
            "fatal" | "fata" => Ok(Level::Fatal),
            _ => Err(LoggerError::UnknownLevel(s.to_string())),
        }
    }
}

/// Decides which records pass the configured minimum level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LevelFilter {
    /// Emit records at or above the minimum level.
    #[default]
    AtLeast,
    /// Suppress only records at exactly the minimum level and emit every
    /// other level, including less severe ones. Matches the behavior of
    /// loggers built before the threshold filter existed.
    SuppressExact,
}

impl LevelFilter {
    /// Whether a record at `level` is emitted when the minimum is `min`.
    pub fn allows(&self, min: Level, level: Level) -> bool {
        match self {
            LevelFilter::AtLeast => level >= min,
            LevelFilter::SuppressExact => level != min,
        }
    }
}
