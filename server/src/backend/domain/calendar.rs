//! Business-day calendar.
//!
//! All reporting windows are calendar days in the business timezone (IST by
//! default). [`BusinessCalendar`] converts those days into UTC instants for
//! document queries and back again when bucketing timestamps.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc,
};

use crate::backend::domain::error::{DashboardError, DashboardResult};
use crate::backend::domain::month_key::YearMonth;

/// India Standard Time, in minutes east of UTC
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> DashboardResult<Self> {
        if from > to {
            return Err(DashboardError::InvalidInput(format!(
                "from ({}) must not be after to ({})",
                from, to
            )));
        }
        Ok(Self { from, to })
    }

    /// Range used only as a row filter. A reversed range is kept as given
    /// and contains no day.
    pub fn filter(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// Whole calendar month
    pub fn month(month: YearMonth) -> Self {
        Self {
            from: month.first_day(),
            to: month.last_day(),
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        day >= self.from && day <= self.to
    }

    /// Number of days covered, counting both ends
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }

    /// Days shared with `other`, counting both ends; 0 when disjoint
    pub fn overlap_days(&self, other: &DateRange) -> i64 {
        let start = self.from.max(other.from);
        let end = self.to.min(other.to);
        if start > end {
            0
        } else {
            (end - start).num_days() + 1
        }
    }

    /// Range of the same length ending the day before this one starts
    pub fn preceding(&self) -> DateRange {
        let length = Duration::days(self.days());
        DateRange {
            from: self.from - length,
            to: self.to - length,
        }
    }
}

/// Inclusive range of instants used for timestamp filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }
}

/// Parse a `YYYY-MM-DD` query parameter
pub fn parse_ymd(raw: &str) -> DashboardResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DashboardError::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Clock and timezone of the business
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    offset: FixedOffset,
    fixed_now: Option<DateTime<Utc>>,
}

impl BusinessCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            fixed_now: None,
        }
    }

    pub fn from_offset_minutes(minutes: i32) -> anyhow::Result<Self> {
        let offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| anyhow::anyhow!("UTC offset of {} minutes is out of range", minutes))?;
        Ok(Self::new(offset))
    }

    /// Calendar frozen at `now`, for reproducible reports and tests
    pub fn with_fixed_now(mut self, now: DateTime<Utc>) -> Self {
        self.fixed_now = Some(now);
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        self.fixed_now.unwrap_or_else(Utc::now)
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        self.now_utc().with_timezone(&self.offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    pub fn current_month(&self) -> YearMonth {
        YearMonth::of(self.today())
    }

    /// Business-local calendar day of an instant
    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn month_of(&self, instant: DateTime<Utc>) -> YearMonth {
        YearMonth::of(self.local_date(instant))
    }

    /// 00:00:00 local time on `day`
    pub fn start_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        self.local_instant(day, NaiveTime::MIN)
    }

    /// 23:59:59 local time on `day`
    pub fn end_of_day(&self, day: NaiveDate) -> DateTime<Utc> {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        self.local_instant(day, last_second)
    }

    fn local_instant(&self, day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = day.and_time(time);
        match self.offset.from_local_datetime(&local).single() {
            Some(instant) => instant.with_timezone(&Utc),
            None => Utc.from_utc_datetime(&local),
        }
    }

    pub fn window(&self, range: &DateRange) -> TimeWindow {
        TimeWindow {
            start: self.start_of_day(range.from),
            end: self.end_of_day(range.to),
        }
    }

    pub fn today_range(&self) -> DateRange {
        DateRange::single_day(self.today())
    }

    /// Whole current month
    pub fn current_month_range(&self) -> DateRange {
        DateRange::month(self.current_month())
    }

    /// Resolve optional `from`/`to` parameters, each falling back independently
    pub fn resolve_range(
        &self,
        from: Option<&str>,
        to: Option<&str>,
        default: DateRange,
    ) -> DashboardResult<DateRange> {
        let from = match non_blank(from) {
            Some(raw) => parse_ymd(raw)?,
            None => default.from,
        };
        let to = match non_blank(to) {
            Some(raw) => parse_ymd(raw)?,
            None => default.to,
        };
        DateRange::new(from, to)
    }

    /// Optional range: both ends given, or none at all
    pub fn optional_range(&self, from: Option<&str>, to: Option<&str>) -> DashboardResult<Option<DateRange>> {
        match (non_blank(from), non_blank(to)) {
            (Some(from), Some(to)) => Ok(Some(DateRange::new(parse_ymd(from)?, parse_ymd(to)?)?)),
            _ => Ok(None),
        }
    }

    /// Long date label for report headers, e.g. `Tuesday, 06 Jan 2026`
    pub fn long_date_label(&self, day: NaiveDate) -> String {
        day.format("%A, %d %b %Y").to_string()
    }

    /// Short date label, e.g. `06/01/2026`
    pub fn short_date_label(&self, day: NaiveDate) -> String {
        format!("{:02}/{:02}/{}", day.day(), day.month(), day.year())
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        let offset = FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn ist_calendar_at(now: DateTime<Utc>) -> BusinessCalendar {
        BusinessCalendar::from_offset_minutes(330).unwrap().with_fixed_now(now)
    }

    #[test]
    fn test_today_follows_business_timezone() {
        // 20:00 UTC is already the next day in IST
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 20, 0, 0).unwrap();
        let calendar = ist_calendar_at(now);
        assert_eq!(calendar.today(), ymd(2026, 1, 6));
    }

    #[test]
    fn test_window_spans_local_day() {
        let calendar = ist_calendar_at(Utc::now());
        let window = calendar.window(&DateRange::single_day(ymd(2025, 4, 1)));

        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 31, 18, 30, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 4, 1, 18, 29, 59).unwrap());
    }

    #[test]
    fn test_range_overlap_and_preceding() {
        let april = DateRange::new(ymd(2025, 4, 1), ymd(2025, 4, 30)).unwrap();
        let mid = DateRange::new(ymd(2025, 4, 21), ymd(2025, 5, 10)).unwrap();

        assert_eq!(april.days(), 30);
        assert_eq!(april.overlap_days(&mid), 10);
        assert_eq!(april.preceding(), DateRange::new(ymd(2025, 3, 2), ymd(2025, 3, 31)).unwrap());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(DateRange::new(ymd(2025, 5, 1), ymd(2025, 4, 1)).is_err());
    }

    #[test]
    fn test_resolve_range_defaults_each_end() {
        let calendar = ist_calendar_at(Utc.with_ymd_and_hms(2025, 6, 15, 6, 0, 0).unwrap());
        let default = calendar.current_month_range();

        let both = calendar.resolve_range(None, None, default).unwrap();
        assert_eq!(both, DateRange::new(ymd(2025, 6, 1), ymd(2025, 6, 30)).unwrap());

        let from_only = calendar.resolve_range(Some("2025-06-10"), Some(""), default).unwrap();
        assert_eq!(from_only.from, ymd(2025, 6, 10));
        assert_eq!(from_only.to, ymd(2025, 6, 30));

        assert!(calendar.resolve_range(Some("06/10/2025"), None, default).is_err());
    }

    #[test]
    fn test_optional_range_requires_both_ends() {
        let calendar = BusinessCalendar::default();
        assert_eq!(calendar.optional_range(Some("2025-01-01"), None).unwrap(), None);
        assert!(calendar
            .optional_range(Some("2025-01-01"), Some("2025-01-31"))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_labels() {
        let calendar = BusinessCalendar::default();
        assert_eq!(calendar.long_date_label(ymd(2026, 1, 6)), "Tuesday, 06 Jan 2026");
        assert_eq!(calendar.short_date_label(ymd(2026, 1, 6)), "06/01/2026");
    }
}
