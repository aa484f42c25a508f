//! Query windows and calendar-frame helpers.
//!
//! Instants are stored in UTC. Everything that depends on where a day starts
//! (day/week/month windows, same-day comparisons, all-day spans) goes through
//! an explicit `Tz` frame.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_WINDOW_DAYS;
use crate::error::{CoachCalError, CoachCalResult};

/// Closed query window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoachCalResult<Self> {
        if end < start {
            return Err(CoachCalError::InvalidRange(format!(
                "window end {} is before window start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(DateRange { start, end })
    }

    /// All of `date` in the frame.
    pub fn day(date: NaiveDate, tz: Tz) -> Self {
        Self::days(date, date, tz)
    }

    /// The Sunday-to-Saturday week containing `date`.
    pub fn week(date: NaiveDate, tz: Tz) -> Self {
        let first = date - Duration::days(date.weekday().num_days_from_sunday() as i64);
        Self::days(first, first + Duration::days(6), tz)
    }

    /// First to last day of the month containing `date`.
    pub fn month(date: NaiveDate, tz: Tz) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = first
            .checked_add_months(Months::new(1))
            .map(|next| next - Duration::days(1))
            .unwrap_or(first);
        Self::days(first, last, tz)
    }

    /// Inclusive span of whole days in the frame.
    fn days(first: NaiveDate, last: NaiveDate, tz: Tz) -> Self {
        DateRange {
            start: start_of_day(first, tz),
            end: end_of_day(last, tz),
        }
    }

    /// Parse CLI-style bounds.
    /// - `from`: YYYY-MM-DD, defaults to `today`
    /// - `to`: YYYY-MM-DD, defaults to `from` + DEFAULT_WINDOW_DAYS
    pub fn from_args(
        from: Option<&str>,
        to: Option<&str>,
        today: NaiveDate,
        tz: Tz,
    ) -> CoachCalResult<Self> {
        let first = match from {
            Some(s) => parse_date(s)?,
            None => today,
        };
        let last = match to {
            Some(s) => parse_date(s)?,
            None => first + Duration::days(DEFAULT_WINDOW_DAYS),
        };

        Self::new(start_of_day(first, tz), end_of_day(last, tz))
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    /// Whether `date` lies between the window's first and last day in the frame.
    pub fn contains_date(&self, date: NaiveDate, tz: Tz) -> bool {
        local_date(self.start, tz) <= date && date <= local_date(self.end, tz)
    }

    /// Every calendar day the window touches, in order.
    pub fn dates(&self, tz: Tz) -> impl Iterator<Item = NaiveDate> {
        let last = local_date(self.end, tz);
        local_date(self.start, tz)
            .iter_days()
            .take_while(move |d| *d <= last)
    }
}

/// View granularity of a calendar screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarView {
    Day,
    #[default]
    Week,
    Month,
}

impl CalendarView {
    pub fn range(self, date: NaiveDate, tz: Tz) -> DateRange {
        match self {
            CalendarView::Day => DateRange::day(date, tz),
            CalendarView::Week => DateRange::week(date, tz),
            CalendarView::Month => DateRange::month(date, tz),
        }
    }

    /// Move `date` one view forward (`forward = true`) or back.
    pub fn step(self, date: NaiveDate, forward: bool) -> NaiveDate {
        let moved = match (self, forward) {
            (CalendarView::Day, true) => date.checked_add_signed(Duration::days(1)),
            (CalendarView::Day, false) => date.checked_sub_signed(Duration::days(1)),
            (CalendarView::Week, true) => date.checked_add_signed(Duration::weeks(1)),
            (CalendarView::Week, false) => date.checked_sub_signed(Duration::weeks(1)),
            (CalendarView::Month, true) => date.checked_add_months(Months::new(1)),
            (CalendarView::Month, false) => date.checked_sub_months(Months::new(1)),
        };
        moved.unwrap_or(date)
    }
}

impl FromStr for CalendarView {
    type Err = CoachCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(CalendarView::Day),
            "week" => Ok(CalendarView::Week),
            "month" => Ok(CalendarView::Month),
            other => Err(CoachCalError::Config(format!(
                "Unknown view '{}'. Expected day, week or month",
                other
            ))),
        }
    }
}

impl fmt::Display for CalendarView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarView::Day => write!(f, "day"),
            CalendarView::Week => write!(f, "week"),
            CalendarView::Month => write!(f, "month"),
        }
    }
}

/// Calendar date of `instant` in the frame.
pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

/// Whether two instants fall on the same calendar day in the frame.
pub fn same_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    local_date(a, tz) == local_date(b, tz)
}

pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    resolve_local(date.and_time(chrono::NaiveTime::MIN), tz)
}

/// Last representable instant of `date` in the frame.
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    start_of_day(date + Duration::days(1), tz) - Duration::nanoseconds(1)
}

/// Map a wall-clock time in the frame to an instant.
/// Ambiguous times take the earlier instant; times inside a DST gap are
/// pushed forward by the length of the gap.
pub fn resolve_local(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    if let Some(dt) = tz.from_local_datetime(&naive).earliest() {
        return dt.with_timezone(&Utc);
    }

    // Inside a gap: read the wall-clock time with the offset in force before it.
    let before = tz
        .offset_from_utc_datetime(&(naive - Duration::days(1)))
        .fix()
        .local_minus_utc();
    (naive - Duration::seconds(before as i64)).and_utc()
}

/// Parse YYYY-MM-DD.
pub fn parse_date(s: &str) -> CoachCalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        CoachCalError::InvalidRange(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}
