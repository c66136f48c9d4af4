use {
    crate::error::{LoggerError, Result},
    chrono::{DateTime, Utc},
    regex::Regex,
    std::{
        fmt, fs,
        io::{self, Write as _},
        path::{Path, PathBuf},
    },
};

#[cfg(unix)]
use std::{fs::Permissions, os::unix::fs::PermissionsExt};

/// Target of the events this crate emits about its own files. Filter it out
/// when the logger itself backs a `tracing` writer, or rotation events are
/// written into the file being rotated.
pub const DIAGNOSTICS_TARGET: &str = "logsplit";

/// Rotation threshold used when none is configured: 10 MiB.
pub const DEFAULT_MAX_SIZE: RotationSize = RotationSize::MB(10);

/// Permissions of log files created at construction (rw-r--r--).
pub const DEFAULT_FILE_MODE: u32 = 0o644;

/// Permissions of log files recreated by a rotation (rw-rw-r--).
pub const DEFAULT_ROTATED_FILE_MODE: u32 = 0o664;

/// Defines size thresholds for rotating log files in various units.
///
/// # Examples
/// ```
/// use logsplit::{FileLoggerBuilder, RotationSize};
/// use std::path::Path;
///
/// let dir = tempfile::tempdir().unwrap();
/// // Rotate when a file reaches 100 MB
/// let logger = FileLoggerBuilder::new(dir.path(), Path::new("large.log"))
///     .max_size(RotationSize::MB(100))
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationSize {
    /// Raw byte count
    Bytes(u64),
    /// Kilobytes (1 KB = 1024 bytes)
    KB(u64),
    /// Megabytes (1 MB = 1024 KB = 1,048,576 bytes)
    MB(u64),
    /// Gigabytes (1 GB = 1024 MB = 1,073,741,824 bytes)
    GB(u64),
}

impl RotationSize {
    /// Get the threshold in bytes.
    pub fn bytes(&self) -> u64 {
        match self {
            RotationSize::Bytes(b) => *b,
            RotationSize::KB(kb) => kb.saturating_mul(1 << 10),
            RotationSize::MB(mb) => mb.saturating_mul(1 << 20),
            RotationSize::GB(gb) => gb.saturating_mul(1 << 30),
        }
    }
}

/// Whether a file of `size` bytes has reached the rotation threshold.
pub fn should_rotate(size: u64, threshold: u64) -> bool {
    size >= threshold
}

/// How rotated files are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackupNaming {
    /// `<path>_<unix seconds>.bak`, with a counter before `.bak` when that
    /// name is already taken (`<path>_<unix seconds>.1.bak`, ...).
    #[default]
    Unique,
    /// Always `<path>_<unix seconds>.bak`. A second rotation within the same
    /// second replaces the first backup.
    Timestamp,
}

/// Compute the backup path for `path` rotated at `now`.
pub fn backup_path(path: &Path, now: DateTime<Utc>, naming: BackupNaming) -> PathBuf {
    let stem = format!("{}_{}", path.to_string_lossy(), now.timestamp());
    let candidate = PathBuf::from(format!("{stem}.bak"));
    match naming {
        BackupNaming::Timestamp => candidate,
        BackupNaming::Unique => {
            let mut candidate = candidate;
            let mut counter = 1u32;
            while candidate.exists() {
                candidate = PathBuf::from(format!("{stem}.{counter}.bak"));
                counter += 1;
            }
            candidate
        }
    }
}

/// List the backups of `filename` in `directory`, sorted by file name.
pub fn list_backups(directory: &Path, filename: &str) -> Result<Vec<PathBuf>> {
    let file_pattern = Regex::new(&format!(r"^{}_\d+(\.\d+)?\.bak$", regex::escape(filename)))
        .map_err(|err| LoggerError::InternalError(err.to_string()))?;

    let files = fs::read_dir(directory).map_err(|err| LoggerError::InternalError(err.to_string()))?;

    let mut backups = Vec::new();
    for file in files.flatten() {
        let is_file = file.file_type().map(|t| t.is_file()).unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(file_name) = file.file_name().to_str() {
            if file_pattern.is_match(file_name) {
                backups.push(file.path());
            }
        }
    }

    backups.sort();
    Ok(backups)
}

/// Which of the two files a sink writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// `{directory}/{file_name}`
    Main,
    /// `{directory}/{file_name}.err`
    Error,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Main => f.write_str("main"),
            Role::Error => f.write_str("error"),
        }
    }
}

/// One role's active log file together with its rotation settings.
pub(crate) struct Sink {
    role: Role,
    path: PathBuf,
    file: fs::File,
    max_size: u64,
    rotated_file_mode: Option<u32>,
    naming: BackupNaming,
}

impl Sink {
    pub(crate) fn open(
        role: Role,
        path: PathBuf,
        max_size: u64,
        file_mode: Option<u32>,
        rotated_file_mode: Option<u32>,
        naming: BackupNaming,
    ) -> Result<Self> {
        let file = open_log_file(&path, file_mode)?;
        Ok(Sink {
            role,
            path,
            file,
            max_size,
            rotated_file_mode,
            naming,
        })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Stat the open file. A failed stat never triggers a rotation.
    pub(crate) fn needs_rotation(&self) -> bool {
        match self.file.metadata() {
            Ok(metadata) => should_rotate(metadata.len(), self.max_size),
            Err(_) => false,
        }
    }

    /// Move the current file aside and continue in a fresh one at the same
    /// path. Returns the backup path, or `None` when the file had already
    /// been removed from the path and there was nothing to move.
    ///
    /// The old handle is only replaced once the new file is open. If the
    /// new file cannot be opened the backup is moved back and the old handle
    /// stays in use.
    pub(crate) fn rotate(&mut self, now: DateTime<Utc>) -> Result<Option<PathBuf>> {
        let backup = backup_path(&self.path, now, self.naming);

        // 1. Flush whatever is pending on the current handle
        let _ = self.file.flush();

        // 2. Rename the current log file. A file deleted or moved away from
        //    under the logger only needs a fresh file at the path.
        let moved = match fs::rename(&self.path, &backup) {
            Ok(()) => true,
            Err(err) if err.kind() == io::ErrorKind::NotFound => false,
            Err(source) => {
                return Err(LoggerError::RenameFailed {
                    from: self.path.clone(),
                    to: backup,
                    source,
                })
            }
        };

        // 3. Create a new log file at the original path
        let new_file = match open_log_file(&self.path, self.rotated_file_mode) {
            Ok(file) => file,
            Err(err) => {
                if moved {
                    if let Err(restore_err) = fs::rename(&backup, &self.path) {
                        tracing::warn!(
                            target: DIAGNOSTICS_TARGET,
                            role = %self.role,
                            backup = %backup.display(),
                            error = %restore_err,
                            "failed to restore log file after rotation failure"
                        );
                    }
                }
                return Err(LoggerError::RotateFailed {
                    path: self.path.clone(),
                    source: match err {
                        LoggerError::OpenFailed { source, .. } => source,
                        other => io::Error::other(other.to_string()),
                    },
                });
            }
        };

        // 4. Only swap the handle after successful file creation
        self.file = new_file;
        if moved {
            tracing::debug!(target: DIAGNOSTICS_TARGET, role = %self.role, backup = %backup.display(), "rotated log file");
            Ok(Some(backup))
        } else {
            tracing::debug!(target: DIAGNOSTICS_TARGET, role = %self.role, path = %self.path.display(), "recreated missing log file");
            Ok(None)
        }
    }

    /// Rotate if due, then append `buf`.
    ///
    /// A failed rotation does not cost the record: it is written through the
    /// handle still in use, and the rotation error is returned afterwards.
    pub(crate) fn append(&mut self, buf: &[u8], now: DateTime<Utc>) -> Result<()> {
        let rotated = if self.needs_rotation() {
            self.rotate(now).map(|_| ())
        } else {
            Ok(())
        };
        self.write(buf)?;
        rotated
    }

    /// Append `buf` without checking the size threshold.
    pub(crate) fn write(&mut self, buf: &[u8]) -> Result<()> {
        self.file.write_all(buf).map_err(|source| LoggerError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Open `path` for appending, creating it if needed. `mode` is applied only
/// when the file did not exist before.
fn open_log_file(path: &Path, mode: Option<u32>) -> Result<fs::File> {
    let existed = path.exists();
    let file = fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|source| LoggerError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;

    if !existed {
        if let Some(mode) = mode {
            set_permissions(path, mode)?;
        }
    }
    Ok(file)
}

fn set_permissions(path: &Path, mode: u32) -> Result<()> {
    #[cfg(unix)]
    {
        fs::set_permissions(path, Permissions::from_mode(mode)).map_err(|source| {
            LoggerError::SetPermissionsFailed {
                path: path.to_path_buf(),
                source,
            }
        })?
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        chrono::TimeZone as _,
        std::io::{Read as _, Write as _},
    };

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn sink(path: PathBuf, max_size: u64, naming: BackupNaming) -> Sink {
        Sink::open(
            Role::Main,
            path,
            max_size,
            Some(DEFAULT_FILE_MODE),
            Some(DEFAULT_ROTATED_FILE_MODE),
            naming,
        )
        .unwrap()
    }

    fn read(path: &Path) -> String {
        let mut content = String::new();
        fs::File::open(path).unwrap().read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_rotation_size_bytes() {
        assert_eq!(RotationSize::Bytes(10).bytes(), 10);
        assert_eq!(RotationSize::KB(2).bytes(), 2048);
        assert_eq!(DEFAULT_MAX_SIZE.bytes(), 10 * 1024 * 1024);
        assert_eq!(RotationSize::GB(1).bytes(), 1 << 30);
        assert_eq!(RotationSize::GB(u64::MAX).bytes(), u64::MAX);
        assert_eq!(RotationSize::KB(u64::MAX / 2).bytes(), u64::MAX);
    }

    #[test]
    fn test_should_rotate_at_threshold() {
        assert!(!should_rotate(0, 10));
        assert!(!should_rotate(9, 10));
        assert!(should_rotate(10, 10));
        assert!(should_rotate(11, 10));
    }

    #[test]
    fn test_backup_path_timestamp() {
        let path = Path::new("/var/log/app.log");
        assert_eq!(
            backup_path(path, at(1_700_000_000), BackupNaming::Timestamp),
            PathBuf::from("/var/log/app.log_1700000000.bak")
        );
    }

    #[test]
    fn test_backup_path_unique_skips_taken_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let first = backup_path(&path, at(100), BackupNaming::Unique);
        assert_eq!(first, dir.path().join("app.log_100.bak"));
        fs::write(&first, "x").unwrap();
        let second = backup_path(&path, at(100), BackupNaming::Unique);
        assert_eq!(second, dir.path().join("app.log_100.1.bak"));
        fs::write(&second, "x").unwrap();
        assert_eq!(
            backup_path(&path, at(100), BackupNaming::Unique),
            dir.path().join("app.log_100.2.bak")
        );
    }

    #[test]
    fn test_rotate_moves_contents_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 8, BackupNaming::Unique);

        sink.append(b"0123456789", at(5)).unwrap();
        assert!(sink.needs_rotation());
        sink.append(b"next", at(5)).unwrap();

        let backup = dir.path().join("app.log_5.bak");
        assert_eq!(read(&backup), "0123456789");
        assert_eq!(read(&path), "next");
        assert!(!sink.needs_rotation());
    }

    #[test]
    fn test_no_rotation_below_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 100, BackupNaming::Unique);
        sink.append(b"a", at(1)).unwrap();
        sink.append(b"b", at(1)).unwrap();
        assert_eq!(read(&path), "ab");
        assert!(list_backups(dir.path(), "app.log").unwrap().is_empty());
    }

    #[test]
    fn test_rotate_failure_keeps_old_handle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 1, BackupNaming::Timestamp);
        sink.append(b"a", at(1)).unwrap();

        // A directory in place of the backup makes the rename fail.
        fs::create_dir(dir.path().join("app.log_2.bak")).unwrap();
        fs::write(dir.path().join("app.log_2.bak").join("keep"), "x").unwrap();
        let err = sink.rotate(at(2)).unwrap_err();
        assert!(matches!(err, LoggerError::RenameFailed { .. }));

        sink.file.write_all(b"b").unwrap();
        assert_eq!(read(&path), "ab");

        // The record still lands even though the rotation keeps failing.
        let err = sink.append(b"c", at(2)).unwrap_err();
        assert!(matches!(err, LoggerError::RenameFailed { .. }));
        assert_eq!(read(&path), "abc");
    }

    #[test]
    fn test_rotate_recreates_removed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 1, BackupNaming::Unique);
        sink.append(b"a", at(1)).unwrap();

        fs::remove_file(&path).unwrap();
        sink.append(b"b", at(2)).unwrap();

        assert_eq!(read(&path), "b");
        assert!(list_backups(dir.path(), "app.log").unwrap().is_empty());
        assert!(sink.rotate(at(3)).unwrap().is_some());
    }

    #[test]
    fn test_write_skips_rotation_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 1, BackupNaming::Unique);
        sink.write(b"a").unwrap();
        sink.write(b"b").unwrap();
        assert_eq!(read(&path), "ab");
        assert!(list_backups(dir.path(), "app.log").unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = sink(path.clone(), 1, BackupNaming::Unique);
        let mode = |p: &Path| fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&path), 0o644);

        sink.append(b"a", at(1)).unwrap();
        sink.rotate(at(1)).unwrap();
        assert_eq!(mode(&path), 0o664);
    }

    #[test]
    fn test_existing_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        fs::write(&path, "old\n").unwrap();
        let mut sink = sink(path.clone(), 100, BackupNaming::Unique);
        sink.append(b"new\n", at(1)).unwrap();
        assert_eq!(read(&path), "old\nnew\n");
    }

    #[test]
    fn test_list_backups_matches_only_own_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "app.log",
            "app.log_100.bak",
            "app.log_100.1.bak",
            "app.log_99.bak",
            "app.log.err_100.bak",
            "app.log_abc.bak",
            "appXlog_100.bak",
        ] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let names: Vec<String> = list_backups(dir.path(), "app.log")
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["app.log_100.1.bak", "app.log_100.bak", "app.log_99.bak"]);

        let err_names = list_backups(dir.path(), "app.log.err").unwrap();
        assert_eq!(err_names, [dir.path().join("app.log.err_100.bak")]);
    }
}
