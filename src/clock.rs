use chrono::{DateTime, FixedOffset, Local, Utc};

/// Specifies the time zone used for record timestamps.
///
/// Backup file names carry Unix seconds and are not affected by this
/// setting.
///
/// # Examples
/// ```
/// use logsplit::TimeZone;
/// use chrono::FixedOffset;
///
/// // Use UTC time for global deployments
/// let utc = TimeZone::UTC;
///
/// // Use local system time zone (changes with system settings)
/// let local = TimeZone::Local;
///
/// // Use a fixed offset for a specific region (e.g., UTC+8 for China)
/// let china = TimeZone::Fix(FixedOffset::east_opt(8 * 3600).unwrap());
/// ```
#[derive(Debug, Clone)]
pub enum TimeZone {
    /// Use UTC time zone.
    UTC,
    /// Use the system's local time zone.
    Local,
    /// Use a fixed time zone offset.
    Fix(FixedOffset),
}

impl TimeZone {
    pub(crate) fn offset(&self) -> FixedOffset {
        match self {
            TimeZone::UTC => Utc::now().fixed_offset().offset().to_owned(),
            TimeZone::Local => Local::now().offset().to_owned(),
            TimeZone::Fix(fixed_offset) => *fixed_offset,
        }
    }
}

/// Source of the current time for record timestamps and backup names.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> Clock for F
where
    F: Fn() -> DateTime<Utc> + Send + Sync,
{
    fn now(&self) -> DateTime<Utc> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::TimeZone as _};

    #[test]
    fn test_fixed_offset() {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(TimeZone::Fix(offset).offset(), offset);
        assert_eq!(TimeZone::UTC.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_closure_clock() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let clock = move || at;
        assert_eq!(Clock::now(&clock), at);
    }
}
