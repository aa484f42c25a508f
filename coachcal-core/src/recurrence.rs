//! Occurrence expansion for recurring task templates.
//!
//! Occurrence `k` is always computed from the template's anchor
//! (`anchor + k * unit`), never by stepping from the previous occurrence, so
//! monthly series don't drift after a short month and re-running a query is
//! pure. Stepping happens on wall-clock time in the calendar frame: a 09:00
//! daily template stays at 09:00 across DST changes.
//!
//! Monthly overflow clamps to the last valid day of the target month:
//! an anchor on Jan 31 yields Feb 28 (29), Mar 31, Apr 30, ...

use chrono::{DateTime, Datelike, Duration, Months, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::date_range::{DateRange, resolve_local};
use crate::error::{CoachCalError, CoachCalResult};
use crate::task::{Frequency, Task};

/// Lazy, finite sequence of occurrence start instants within a window.
///
/// A clone continues from the same position; call [`occurrences`] again to
/// start over.
#[derive(Debug, Clone)]
pub struct Occurrences {
    anchor: NaiveDateTime,
    frequency: Frequency,
    tz: Tz,
    window_start: DateTime<Utc>,
    /// `min(window end, recurrence end)`
    limit: DateTime<Utc>,
    next_index: u32,
    done: bool,
}

impl Occurrences {
    pub fn new(
        anchor: DateTime<Utc>,
        frequency: Frequency,
        end_date: Option<DateTime<Utc>>,
        window: &DateRange,
        tz: Tz,
    ) -> Self {
        let limit = match end_date {
            Some(end) => end.min(window.end),
            None => window.end,
        };

        let mut occurrences = Occurrences {
            anchor: anchor.with_timezone(&tz).naive_local(),
            frequency,
            tz,
            window_start: window.start,
            limit,
            next_index: 0,
            done: frequency == Frequency::Unsupported,
        };
        occurrences.next_index = occurrences.first_candidate();
        occurrences
    }

    /// Start instant of occurrence `k`, or None if it can't be represented
    /// or the frequency is not one we expand.
    pub fn nth_start(&self, k: u32) -> Option<DateTime<Utc>> {
        let naive = match self.frequency {
            Frequency::Daily => self
                .anchor
                .checked_add_signed(Duration::days(i64::from(k)))?,
            Frequency::Weekly => self
                .anchor
                .checked_add_signed(Duration::weeks(i64::from(k)))?,
            Frequency::Monthly => self.anchor.checked_add_months(Months::new(k))?,
            Frequency::Unsupported => return None,
        };
        Some(resolve_local(naive, self.tz))
    }

    /// An index at or before the first occurrence inside the window.
    /// Skips the bulk of a long-running series without changing the output.
    fn first_candidate(&self) -> u32 {
        let start = self.window_start.with_timezone(&self.tz).naive_local();
        if start <= self.anchor {
            return 0;
        }

        let days = (start.date() - self.anchor.date()).num_days();
        let months = (start.year() - self.anchor.year()) as i64 * 12 + start.month() as i64
            - self.anchor.month() as i64;

        let estimate = match self.frequency {
            Frequency::Daily => days - 1,
            Frequency::Weekly => days / 7 - 1,
            Frequency::Monthly => months - 1,
            Frequency::Unsupported => 0,
        };

        u32::try_from(estimate.max(0)).unwrap_or(u32::MAX)
    }
}

impl Iterator for Occurrences {
    type Item = DateTime<Utc>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            let Some(current) = self.nth_start(self.next_index) else {
                self.done = true;
                break;
            };

            if current > self.limit {
                self.done = true;
                break;
            }

            self.next_index = match self.next_index.checked_add(1) {
                Some(next) => next,
                None => {
                    self.done = true;
                    u32::MAX
                }
            };

            if current >= self.window_start {
                return Some(current);
            }
        }
        None
    }
}

/// Occurrence start instants of `template` that fall inside `window`.
///
/// Fails for tasks that are not templates, templates without a positive
/// duration, and unsupported frequencies. Callers rendering a calendar skip
/// the template on error instead of failing the whole view.
pub fn occurrences(template: &Task, window: &DateRange, tz: Tz) -> CoachCalResult<Occurrences> {
    let recurring = template
        .recurring()
        .ok_or_else(|| CoachCalError::not_found("Recurring template", &template.id))?;

    if recurring.frequency == Frequency::Unsupported {
        return Err(CoachCalError::UnsupportedFrequency(format!(
            "template '{}'",
            template.id
        )));
    }

    if template.end_time <= template.start_time {
        return Err(CoachCalError::InvalidRange(format!(
            "template '{}' has no positive duration",
            template.id
        )));
    }

    Ok(Occurrences::new(
        template.start_time,
        recurring.frequency,
        recurring.end_date,
        window,
        tz,
    ))
}
