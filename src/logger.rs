use {
    crate::{
        caller::{CallSite, FrameResolver, SourceResolver},
        clock::{Clock, SystemClock, TimeZone},
        error::{LoggerError, Result},
        level::{Level, LevelFilter},
        rotation::{
            list_backups, BackupNaming, Role, RotationSize, Sink, DEFAULT_FILE_MODE, DEFAULT_MAX_SIZE,
            DEFAULT_ROTATED_FILE_MODE, DIAGNOSTICS_TARGET,
        },
    },
    chrono::{DateTime, FixedOffset, Utc},
    std::{
        fmt, io,
        panic::Location,
        path::{Path, PathBuf},
    },
};

/// Decides which files a record is written to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Routing {
    /// Every emitted record goes to the main file. Records at
    /// [`Level::Error`] and above are also written to the error file.
    #[default]
    Split,
    /// Every emitted record goes to the error file, and records at
    /// [`Level::Error`] and above are written there a second time. The main
    /// file is opened but never written. Matches the layout produced by
    /// loggers built before the split routing existed, including that only
    /// the second write of an error record checks the error file's size, so
    /// Debug, Info and Warning traffic alone never rotates it.
    Legacy,
}

/// Common interface of leveled loggers.
pub trait Logger {
    /// Log a record at `level` on behalf of `site`.
    fn log_at(&mut self, site: CallSite, level: Level, args: fmt::Arguments<'_>);

    /// Flush and close the underlying output.
    fn close(self) -> Result<()>
    where
        Self: Sized;

    #[track_caller]
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        self.log_at(Location::caller().into(), Level::Debug, args);
    }

    #[track_caller]
    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.log_at(Location::caller().into(), Level::Info, args);
    }

    #[track_caller]
    fn warn(&mut self, args: fmt::Arguments<'_>) {
        self.log_at(Location::caller().into(), Level::Warning, args);
    }

    #[track_caller]
    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.log_at(Location::caller().into(), Level::Error, args);
    }

    /// Log at [`Level::Fatal`]. This is only a severity label; the process
    /// keeps running.
    #[track_caller]
    fn fatal(&mut self, args: fmt::Arguments<'_>) {
        self.log_at(Location::caller().into(), Level::Fatal, args);
    }
}

/// A leveled logger writing to `{directory}/{file_name}` and mirroring
/// error records to `{directory}/{file_name}.err`.
///
/// Both files are rotated independently once they reach the size
/// threshold. The logger takes `&mut self` for every write and does no
/// locking of its own; wrap it in a `Mutex` to share it between threads.
pub struct FileLogger {
    min_level: Level,
    filter: LevelFilter,
    routing: Routing,
    main: Sink,
    error: Sink,
    time_zone: FixedOffset,
    resolver: Box<dyn FrameResolver>,
    clock: Box<dyn Clock>,
}

impl FileLogger {
    /// Open a logger with default settings.
    ///
    /// `min_level` is parsed leniently with [`Level::parse`]. Fails with
    /// [`LoggerError::OpenFailed`](crate::LoggerError::OpenFailed) when
    /// either file cannot be opened, e.g. because `directory` is missing.
    pub fn new<F: AsRef<Path>, D: AsRef<Path>>(min_level: &str, file_name: F, directory: D) -> Result<FileLogger> {
        FileLoggerBuilder::new(directory, file_name)
            .min_level_str(min_level)
            .build()
    }

    /// Start configuring a logger.
    pub fn builder<D: AsRef<Path>, F: AsRef<Path>>(directory: D, file_name: F) -> FileLoggerBuilder {
        FileLoggerBuilder::new(directory, file_name)
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }

    /// Path of the active file for `role`.
    pub fn path(&self, role: Role) -> &Path {
        self.sink(role).path()
    }

    /// Rotated backups of the file for `role`, sorted by file name.
    pub fn backups(&self, role: Role) -> Result<Vec<PathBuf>> {
        let path = self.path(role);
        let directory = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        list_backups(directory, &filename)
    }

    /// Log a record, dropping any failure.
    ///
    /// Rotation and write failures are reported through `tracing` and never
    /// reach the caller.
    #[track_caller]
    pub fn log(&mut self, level: Level, args: fmt::Arguments<'_>) {
        Logger::log_at(self, Location::caller().into(), level, args);
    }

    /// Log a record and report rotation or write failures.
    #[track_caller]
    pub fn try_log(&mut self, level: Level, args: fmt::Arguments<'_>) -> Result<()> {
        self.try_log_at(Location::caller().into(), level, args)
    }

    /// Log a record on behalf of `site` and report rotation or write
    /// failures.
    ///
    /// Each file is attempted even when the other one failed; the first
    /// failure is returned.
    pub fn try_log_at(&mut self, site: CallSite, level: Level, args: fmt::Arguments<'_>) -> Result<()> {
        if !self.filter.allows(self.min_level, level) {
            return Ok(());
        }

        let now = self.clock.now();
        let record = self.format_record(now, &site, level, args);

        let record = record.as_bytes();
        let first = match self.routing {
            Routing::Split => self.main.append(record, now),
            Routing::Legacy => self.error.write(record),
        };
        let mirror = if level.is_error() {
            self.error.append(record, now)
        } else {
            Ok(())
        };
        first.and(mirror)
    }

    /// `[YYYY-MM-DD HH:MM:SS.mmm][file:line][function][LEVEL]message\n`
    fn format_record(&self, now: DateTime<Utc>, site: &CallSite, level: Level, args: fmt::Arguments<'_>) -> String {
        let timestamp = now.with_timezone(&self.time_zone).format("%Y-%m-%d %H:%M:%S%.3f");
        let caller = self.resolver.resolve(site);
        format!("[{timestamp}]{caller}[{level}]{args}\n")
    }

    fn sink(&self, role: Role) -> &Sink {
        match role {
            Role::Main => &self.main,
            Role::Error => &self.error,
        }
    }
}

impl Logger for FileLogger {
    fn log_at(&mut self, site: CallSite, level: Level, args: fmt::Arguments<'_>) {
        if let Err(err) = self.try_log_at(site, level, args) {
            tracing::warn!(target: DIAGNOSTICS_TARGET, error = %err, "failed to write log record");
        }
    }

    fn close(mut self) -> Result<()> {
        for sink in [&mut self.main, &mut self.error] {
            sink.flush().map_err(|source| LoggerError::WriteFailed {
                path: sink.path().to_path_buf(),
                source,
            })?;
        }
        Ok(())
    }
}

impl io::Write for FileLogger {
    /// Append raw bytes to the main file, rotating it first if due.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let now = self.clock.now();
        self.main
            .append(buf, now)
            .map_err(|err| io::Error::other(err.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.main.flush()?;
        self.error.flush()
    }
}

/// Provides a fluent interface for configuring [`FileLogger`] instances.
///
/// # Default Configuration
///
/// * Minimum level [`Level::Debug`] with the [`LevelFilter::AtLeast`] filter
/// * [`Routing::Split`]
/// * Rotation at 10 MiB with [`BackupNaming::Unique`] backup names
/// * New files created with mode 0644, files recreated by rotation with 0664
/// * Local time zone, system clock, [`SourceResolver`]
///
/// # Examples
///
/// ```rust
/// use logsplit::{FileLoggerBuilder, Level, RotationSize, TimeZone};
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// let mut logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
///     .min_level(Level::Info)
///     .max_size(RotationSize::MB(1))
///     .time_zone(TimeZone::UTC)
///     .build()
///     .unwrap();
/// logsplit::log_info!(logger, "listening on port {}", 8080);
/// ```
///
/// Settings matching loggers built before the threshold filter, split
/// routing and unique backup names:
///
/// ```rust
/// use logsplit::FileLoggerBuilder;
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// let logger = FileLoggerBuilder::new(dir.path(), Path::new("app.log"))
///     .min_level_str("info")
///     .legacy()
///     .build()
///     .unwrap();
/// ```
pub struct FileLoggerBuilder {
    directory: PathBuf,
    file_name: PathBuf,
    min_level: Level,
    filter: LevelFilter,
    routing: Routing,
    max_size: RotationSize,
    naming: BackupNaming,
    file_mode: Option<u32>,
    rotated_file_mode: Option<u32>,
    time_zone: TimeZone,
    resolver: Box<dyn FrameResolver>,
    clock: Box<dyn Clock>,
}

impl FileLoggerBuilder {
    /// Create a new builder.
    /// # Arguments
    /// * `directory` - The directory holding the log files. It must exist.
    /// * `file_name` - The name of the main log file.
    pub fn new<D: AsRef<Path>, F: AsRef<Path>>(directory: D, file_name: F) -> Self {
        FileLoggerBuilder {
            directory: directory.as_ref().to_path_buf(),
            file_name: file_name.as_ref().to_path_buf(),
            min_level: Level::Debug,
            filter: LevelFilter::default(),
            routing: Routing::default(),
            max_size: DEFAULT_MAX_SIZE,
            naming: BackupNaming::default(),
            file_mode: Some(DEFAULT_FILE_MODE),
            rotated_file_mode: Some(DEFAULT_ROTATED_FILE_MODE),
            time_zone: TimeZone::Local,
            resolver: Box::new(SourceResolver),
            clock: Box::new(SystemClock),
        }
    }

    /// Set the minimum level.
    pub fn min_level(self, min_level: Level) -> Self {
        Self { min_level, ..self }
    }

    /// Set the minimum level from configuration text, see [`Level::parse`].
    pub fn min_level_str(self, min_level: &str) -> Self {
        self.min_level(Level::parse(min_level))
    }

    /// Set how the minimum level filters records.
    pub fn level_filter(self, filter: LevelFilter) -> Self {
        Self { filter, ..self }
    }

    /// Set which files records are written to.
    pub fn routing(self, routing: Routing) -> Self {
        Self { routing, ..self }
    }

    /// Set the size at which either file is rotated.
    pub fn max_size(self, max_size: RotationSize) -> Self {
        Self { max_size, ..self }
    }

    /// Set how rotated files are named.
    pub fn backup_naming(self, naming: BackupNaming) -> Self {
        Self { naming, ..self }
    }

    /// Set the permissions of files created when the logger is built (Unix
    /// only). Existing files keep their permissions.
    pub fn file_mode(self, mode: u32) -> Self {
        Self {
            file_mode: Some(mode),
            ..self
        }
    }

    /// Set the permissions of files recreated by a rotation (Unix only).
    pub fn rotated_file_mode(self, mode: u32) -> Self {
        Self {
            rotated_file_mode: Some(mode),
            ..self
        }
    }

    /// Set the time zone of record timestamps.
    pub fn time_zone(self, time_zone: TimeZone) -> Self {
        Self { time_zone, ..self }
    }

    /// Set how call sites are turned into caller details.
    pub fn frame_resolver(self, resolver: impl FrameResolver + 'static) -> Self {
        Self {
            resolver: Box::new(resolver),
            ..self
        }
    }

    /// Set the source of the current time.
    pub fn clock(self, clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            ..self
        }
    }

    /// Use the exact-match filter, legacy routing and timestamp-only backup
    /// names.
    pub fn legacy(self) -> Self {
        self.level_filter(LevelFilter::SuppressExact)
            .routing(Routing::Legacy)
            .backup_naming(BackupNaming::Timestamp)
    }

    /// Open both files and build the logger.
    pub fn build(self) -> Result<FileLogger> {
        let main_path = self.directory.join(&self.file_name);
        let error_path = PathBuf::from(format!("{}.err", main_path.to_string_lossy()));
        let max_size = self.max_size.bytes();

        let main = Sink::open(
            Role::Main,
            main_path,
            max_size,
            self.file_mode,
            self.rotated_file_mode,
            self.naming,
        )?;
        let error = Sink::open(
            Role::Error,
            error_path,
            max_size,
            self.file_mode,
            self.rotated_file_mode,
            self.naming,
        )?;

        Ok(FileLogger {
            min_level: self.min_level,
            filter: self.filter,
            routing: self.routing,
            main,
            error,
            time_zone: self.time_zone.offset(),
            resolver: self.resolver,
            clock: self.clock,
        })
    }
}
