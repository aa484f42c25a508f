//! Projection of tasks and todos into calendar events.
//!
//! The output is the same for every view granularity; day, week and month
//! screens pick their window and sort or bucket the events themselves.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::date_range::{DateRange, end_of_day, local_date, start_of_day};
use crate::milestone::Milestone;
use crate::occurrence::{Occurrence, OccurrenceRef};
use crate::todo::Todo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Task,
    Todo,
}

/// Visual state of an event. Depends on completion only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorClass {
    Active,
    Completed,
}

impl ColorClass {
    pub fn from_completed(completed: bool) -> Self {
        if completed {
            ColorClass::Completed
        } else {
            ColorClass::Active
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventId {
    Occurrence(OccurrenceRef),
    Todo(String),
}

/// The item an event was projected from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Occurrence(Occurrence),
    Todo(Todo),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub kind: EventKind,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub completed: bool,
    pub color: ColorClass,
    pub source: EventSource,
}

impl CalendarEvent {
    pub fn from_occurrence(occurrence: &Occurrence) -> Self {
        CalendarEvent {
            id: EventId::Occurrence(occurrence.reference()),
            kind: EventKind::Task,
            title: occurrence.title().to_string(),
            start: occurrence.start_time(),
            end: occurrence.end_time(),
            completed: occurrence.completed(),
            color: ColorClass::from_completed(occurrence.completed()),
            source: EventSource::Occurrence(occurrence.clone()),
        }
    }

    /// All-day marker on the deadline date, midnight to midnight.
    /// None for todos without a deadline.
    pub fn from_todo(todo: &Todo, tz: Tz) -> Option<Self> {
        let deadline = todo.deadline?;
        Some(CalendarEvent {
            id: EventId::Todo(todo.id.clone()),
            kind: EventKind::Todo,
            title: todo.title.clone(),
            start: start_of_day(deadline, tz),
            end: end_of_day(deadline, tz),
            completed: todo.completed,
            color: ColorClass::from_completed(todo.completed),
            source: EventSource::Todo(todo.clone()),
        })
    }

    pub fn is_all_day(&self) -> bool {
        self.kind == EventKind::Todo
    }

    /// Calendar days this event touches in the frame.
    pub fn dates(&self, tz: Tz) -> impl Iterator<Item = NaiveDate> {
        let last = local_date(self.end, tz);
        local_date(self.start, tz)
            .iter_days()
            .take_while(move |d| *d <= last)
    }
}

/// Project dated occurrences and todos into the events visible in `window`.
///
/// - an occurrence is kept when `start <= window.end && end >= window.start`
/// - a todo is kept when it has a deadline, is not converted, and the
///   deadline date lies within the window's days
///
/// Occurrences come first, then todos, each in input order. Overlapping
/// events are all returned.
pub fn project(
    occurrences: &[Occurrence],
    todos: &[Todo],
    window: &DateRange,
    tz: Tz,
) -> Vec<CalendarEvent> {
    let tasks = occurrences
        .iter()
        .filter(|o| o.overlaps(window.start, window.end))
        .map(CalendarEvent::from_occurrence);

    let todos = todos
        .iter()
        .filter(|t| !t.is_converted())
        .filter(|t| t.deadline.is_some_and(|d| window.contains_date(d, tz)))
        .filter_map(|t| CalendarEvent::from_todo(t, tz));

    tasks.chain(todos).collect()
}

/// Sort by start, then all-day markers before timed events, then title.
pub fn sort_events(events: &mut [CalendarEvent]) {
    events.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| b.is_all_day().cmp(&a.is_all_day()))
            .then_with(|| a.title.cmp(&b.title))
    });
}

/// Bucket events under every window day they touch. Days without events are
/// present with an empty list so month grids can render them.
pub fn by_day<'a>(
    events: &'a [CalendarEvent],
    window: &DateRange,
    tz: Tz,
) -> BTreeMap<NaiveDate, Vec<&'a CalendarEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<&CalendarEvent>> =
        window.dates(tz).map(|d| (d, Vec::new())).collect();

    for event in events {
        for date in event.dates(tz) {
            if let Some(bucket) = days.get_mut(&date) {
                bucket.push(event);
            }
        }
    }

    days
}

/// A milestone deadline shown as a day marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MilestoneMarker {
    pub milestone_id: String,
    pub project_id: String,
    pub title: String,
    pub date: NaiveDate,
    pub completed: bool,
    pub color: ColorClass,
}

pub fn project_milestones(
    milestones: &[Milestone],
    window: &DateRange,
    tz: Tz,
) -> Vec<MilestoneMarker> {
    milestones
        .iter()
        .filter_map(|m| {
            let date = m.deadline.filter(|d| window.contains_date(*d, tz))?;
            Some(MilestoneMarker {
                milestone_id: m.id.clone(),
                project_id: m.project_id.clone(),
                title: m.title.clone(),
                date,
                completed: m.completed,
                color: ColorClass::from_completed(m.completed),
            })
        })
        .collect()
}
