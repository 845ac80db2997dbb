//! Month-to-date reporting period.
//!
//! The period is derived from a single "today" date supplied by the caller,
//! never from the system clock, so reports are reproducible.

use chrono::{DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone, Utc};

/// The days of the current month up to and including `today`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    today: NaiveDate,
}

impl ReportingPeriod {
    pub const fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// The reference date the period ends on.
    pub const fn today(&self) -> NaiveDate {
        self.today
    }

    /// Number of days elapsed in the month, including today.
    ///
    /// This is the calendar matrix width.
    pub fn days_elapsed(&self) -> u32 {
        self.today.day()
    }

    /// First day of the month.
    pub fn start(&self) -> NaiveDate {
        self.today - Days::new(u64::from(self.today.day0()))
    }

    /// Dates for each matrix column, day 1 through today.
    pub fn day_labels(&self) -> Vec<NaiveDate> {
        self.start()
            .iter_days()
            .take(self.days_elapsed() as usize)
            .collect()
    }

    /// Human-readable month title, e.g. `October 2026`.
    pub fn title(&self) -> String {
        self.today.format("%B %Y").to_string()
    }

    /// Half-open UTC window `[start, end)` covering the period in `tz`.
    ///
    /// Starts at local midnight on the 1st and ends at local midnight after
    /// today.
    pub fn window_utc<Tz: TimeZone>(&self, tz: &Tz) -> (DateTime<Utc>, DateTime<Utc>) {
        let tomorrow = self.today.succ_opt().unwrap_or(NaiveDate::MAX);
        (
            local_midnight_to_utc(tz, self.start()),
            local_midnight_to_utc(tz, tomorrow),
        )
    }

    /// Whether `instant` falls inside the period in `tz`.
    pub fn contains<Tz: TimeZone>(&self, tz: &Tz, instant: DateTime<Utc>) -> bool {
        let (start, end) = self.window_utc(tz);
        instant >= start && instant < end
    }
}

/// Converts a local date at midnight to UTC.
/// Handles DST ambiguity by picking the earlier time.
pub fn local_midnight_to_utc<Tz: TimeZone>(tz: &Tz, local_date: NaiveDate) -> DateTime<Utc> {
    let midnight = local_date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            // DST spring-forward gap at midnight: 1am local is the first valid instant
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am).earliest().map_or_else(
                || Utc.from_utc_datetime(&midnight),
                |dt| dt.with_timezone(&Utc),
            )
        }
    }
}
