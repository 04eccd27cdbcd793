//! Calendar week windows aligned to a configurable first day of week.
//!
//! Windows are half-open `[start, end)` intervals in epoch milliseconds, with
//! `start` at local midnight. Day stepping uses calendar dates, never raw
//! millisecond arithmetic, so windows stay aligned across DST transitions.

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use serde::Serialize;

/// Days in one calendar week.
const WEEK_DAYS: u64 = 7;

/// Probe step used when local midnight falls inside a DST gap.
const GAP_PROBE_MINUTES: i64 = 15;
const GAP_PROBE_STEPS: i64 = 16;

/// Half-open `[start, end)` week interval in epoch milliseconds.
///
/// Only [`WeekCalendar`] constructs these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct WeekRange {
    start_millis: i64,
    end_millis: i64,
}

impl WeekRange {
    pub fn start_millis(&self) -> i64 {
        self.start_millis
    }

    pub fn end_millis(&self) -> i64 {
        self.end_millis
    }

    pub fn start(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.start_millis).unwrap_or_default()
    }

    pub fn end(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.end_millis).unwrap_or_default()
    }

    /// True when `millis` lies in `[start, end)`.
    pub fn contains(&self, millis: i64) -> bool {
        self.start_millis <= millis && millis < self.end_millis
    }

    pub fn duration(&self) -> Duration {
        Duration::milliseconds(self.end_millis - self.start_millis)
    }
}

/// Maps instants to week windows for one timezone and first day of week.
///
/// Both are injected so the computation never reads process-wide locale state.
#[derive(Debug, Clone)]
pub struct WeekCalendar<Tz: TimeZone> {
    tz: Tz,
    first_day: Weekday,
}

impl<Tz: TimeZone> WeekCalendar<Tz> {
    pub fn new(tz: Tz, first_day: Weekday) -> Self {
        Self { tz, first_day }
    }

    pub fn timezone(&self) -> &Tz {
        &self.tz
    }

    pub fn first_day(&self) -> Weekday {
        self.first_day
    }

    /// The week window containing `instant`.
    ///
    /// Truncates to the local date, walks back one calendar day at a time until
    /// the configured first day, and resolves that date's midnight. `end` is
    /// the midnight seven calendar days later, which makes consecutive weeks
    /// contiguous even when a DST shift falls inside one of them.
    pub fn week_containing(&self, instant: DateTime<Utc>) -> WeekRange {
        let mut day = instant.with_timezone(&self.tz).date_naive();
        while day.weekday() != self.first_day {
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }

        let start = self.local_midnight(day);
        let end = day
            .checked_add_days(Days::new(WEEK_DAYS))
            .map(|next| self.local_midnight(next))
            .unwrap_or_else(|| start.clone() + Duration::days(WEEK_DAYS as i64));

        WeekRange {
            start_millis: start.timestamp_millis(),
            end_millis: end.timestamp_millis(),
        }
    }

    /// Week containing the current system time.
    pub fn current_week(&self) -> WeekRange {
        self.current_week_at(Utc::now())
    }

    pub fn current_week_at(&self, now: DateTime<Utc>) -> WeekRange {
        self.week_containing(now)
    }

    /// Week immediately preceding the current one.
    pub fn previous_week(&self) -> WeekRange {
        self.previous_week_at(Utc::now())
    }

    /// Anchors one calendar week before the current window's start and
    /// re-derives the window, so the same normalization applies.
    pub fn previous_week_at(&self, now: DateTime<Utc>) -> WeekRange {
        let current = self.current_week_at(now);
        let start_day = current.start().with_timezone(&self.tz).date_naive();
        let anchor = start_day
            .checked_sub_days(Days::new(WEEK_DAYS))
            .map(|day| self.local_midnight(day).with_timezone(&Utc))
            .unwrap_or_else(|| current.start() - Duration::weeks(1));
        self.week_containing(anchor)
    }

    /// Local midnight of `day`. Ambiguous midnights take the earlier instant;
    /// a midnight inside a DST gap takes the first valid instant after it.
    fn local_midnight(&self, day: NaiveDate) -> DateTime<Tz> {
        let midnight = day.and_time(NaiveTime::MIN);
        if let Some(dt) = self.tz.from_local_datetime(&midnight).earliest() {
            return dt;
        }
        for step in 1..=GAP_PROBE_STEPS {
            let probe = midnight + Duration::minutes(step * GAP_PROBE_MINUTES);
            if let Some(dt) = self.tz.from_local_datetime(&probe).earliest() {
                return dt;
            }
        }
        self.tz.from_utc_datetime(&midnight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::America::New_York;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn new_york(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(y, m, d, h, min, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_week_in_utc_starts_monday_midnight() {
        let cal = WeekCalendar::new(Utc, Weekday::Mon);
        let t = utc(2025, 3, 12, 15, 45) + Duration::milliseconds(500);
        let week = cal.week_containing(t);

        assert_eq!(week.start(), utc(2025, 3, 10, 0, 0));
        assert_eq!(week.end(), utc(2025, 3, 17, 0, 0));
        assert!(week.contains(t.timestamp_millis()));
        assert_eq!(week.end_millis() - week.start_millis(), 7 * DAY_MS);
    }

    #[test]
    fn test_week_uses_local_midnight_and_first_day() {
        let cal = WeekCalendar::new(New_York, Weekday::Mon);
        let week = cal.week_containing(new_york(2025, 3, 12, 15, 45));

        let start = week.start().with_timezone(&New_York);
        assert_eq!(start.weekday(), Weekday::Mon);
        assert_eq!((start.hour(), start.minute(), start.second()), (0, 0, 0));
        assert_eq!(start.nanosecond(), 0);
        assert!(week.end_millis() > week.start_millis());
    }

    #[test]
    fn test_sunday_first_day_spanning_dst_start() {
        // DST began 2025-03-09 02:00 in New York.
        let cal = WeekCalendar::new(New_York, Weekday::Sun);
        let week = cal.week_containing(new_york(2025, 3, 12, 9, 0));

        assert_eq!(week.start(), new_york(2025, 3, 9, 0, 0));
        assert_eq!(week.end(), new_york(2025, 3, 16, 0, 0));
        assert_eq!(week.duration(), Duration::hours(7 * 24 - 1));
    }

    #[test]
    fn test_instant_on_first_day_belongs_to_its_own_week() {
        let cal = WeekCalendar::new(Utc, Weekday::Mon);
        let monday = utc(2025, 3, 10, 0, 0);
        let week = cal.week_containing(monday);
        assert_eq!(week.start(), monday);

        let last_ms = cal.week_containing(monday - Duration::milliseconds(1));
        assert_eq!(last_ms.end(), monday);
    }

    #[test]
    fn test_week_containing_is_idempotent_at_start() {
        for first_day in [Weekday::Mon, Weekday::Sun, Weekday::Sat] {
            let cal = WeekCalendar::new(New_York, first_day);
            for t in [
                new_york(2025, 3, 9, 3, 0),
                new_york(2025, 11, 2, 12, 0),
                new_york(2025, 12, 31, 23, 59),
            ] {
                let week = cal.week_containing(t);
                assert_eq!(cal.week_containing(week.start()), week);
            }
        }
    }

    #[test]
    fn test_sampled_instants_fall_inside_their_week() {
        let cal = WeekCalendar::new(New_York, Weekday::Mon);
        let mut t = utc(2025, 2, 20, 0, 0);
        let stop = utc(2025, 11, 20, 0, 0);
        while t < stop {
            let week = cal.week_containing(t);
            assert!(week.contains(t.timestamp_millis()), "{t} outside {week:?}");
            let span = week.end_millis() - week.start_millis();
            assert!((span - 7 * DAY_MS).abs() <= 60 * 60 * 1000);
            t += Duration::minutes(97);
        }
    }

    #[test]
    fn test_previous_week_is_contiguous_across_dst() {
        let cal = WeekCalendar::new(New_York, Weekday::Mon);
        let now = new_york(2025, 3, 12, 15, 45);
        let current = cal.current_week_at(now);
        let previous = cal.previous_week_at(now);

        assert_eq!(previous.end_millis(), current.start_millis());
        assert_eq!(previous.start(), new_york(2025, 3, 3, 0, 0));
        assert_eq!(previous.duration(), Duration::hours(7 * 24 - 1));
    }

    #[test]
    fn test_previous_week_in_utc() {
        let cal = WeekCalendar::new(Utc, Weekday::Mon);
        let now = utc(2025, 1, 2, 8, 0);
        let previous = cal.previous_week_at(now);
        assert_eq!(previous.start(), utc(2024, 12, 23, 0, 0));
        assert_eq!(previous.end(), utc(2024, 12, 30, 0, 0));
        assert_eq!(previous.end_millis(), cal.current_week_at(now).start_millis());
    }

    #[test]
    fn test_current_week_contains_now() {
        let cal = WeekCalendar::new(chrono::Local, Weekday::Mon);
        let before = Utc::now().timestamp_millis();
        let week = cal.current_week();
        assert!(week.start_millis() <= before);
        assert_eq!(cal.previous_week().end_millis(), week.start_millis());
    }
}
