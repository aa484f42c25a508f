//! Turning an undated todo into a dated task.
//!
//! A drag-and-drop onto a day/week grid lands on a half-hour drop target
//! (`YYYY-MM-DD HH:MM`). The target resolves to a start instant in the
//! calendar frame and a default one-hour slot, which the user may stretch
//! before confirming. The store then creates the task and marks the todo in
//! one transaction.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_SLOT_MINUTES, SLOT_STEP_MINUTES};
use crate::date_range::resolve_local;
use crate::error::{CoachCalError, CoachCalResult};
use crate::store::OccurrenceStore;
use crate::task::{Task, TaskRole, ensure_ordered};
use crate::todo::Todo;

const DROP_SLOT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// A confirmed time range for a new task. `end > start` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> CoachCalResult<Self> {
        ensure_ordered(start, end)?;
        Ok(TimeSlot { start, end })
    }

    /// Slot of the default length starting at `start`.
    pub fn starting_at(start: DateTime<Utc>) -> Self {
        TimeSlot {
            start,
            end: start + Duration::minutes(DEFAULT_SLOT_MINUTES),
        }
    }

    /// Replace the end chosen by default.
    pub fn with_end(self, end: DateTime<Utc>) -> CoachCalResult<Self> {
        Self::new(self.start, end)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }
}

/// A half-hour drop target on a day or week grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DropSlot {
    at: NaiveDateTime,
}

impl DropSlot {
    pub fn new(date: NaiveDate, time: NaiveTime) -> CoachCalResult<Self> {
        let at = date.and_time(time);
        if time.second() != 0 || time.nanosecond() != 0 || time.minute() % SLOT_STEP_MINUTES != 0 {
            return Err(CoachCalError::InvalidSlot(at.format(DROP_SLOT_FORMAT).to_string()));
        }
        Ok(DropSlot { at })
    }

    /// All drop targets of one day, in order.
    pub fn for_day(date: NaiveDate) -> Vec<DropSlot> {
        let step = Duration::minutes(i64::from(SLOT_STEP_MINUTES));
        let first = date.and_time(NaiveTime::MIN);
        (0..)
            .map(|i| first + step * i)
            .take_while(|at| at.date() == date)
            .map(|at| DropSlot { at })
            .collect()
    }

    pub fn date(&self) -> NaiveDate {
        self.at.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.at.time()
    }

    /// Start instant in the frame, with the default slot length.
    pub fn resolve(&self, tz: Tz) -> TimeSlot {
        TimeSlot::starting_at(resolve_local(self.at, tz))
    }
}

impl FromStr for DropSlot {
    type Err = CoachCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let at = NaiveDateTime::parse_from_str(s.trim(), DROP_SLOT_FORMAT)
            .map_err(|_| CoachCalError::InvalidSlot(s.to_string()))?;
        DropSlot::new(at.date(), at.time())
    }
}

impl fmt::Display for DropSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.at.format(DROP_SLOT_FORMAT))
    }
}

/// Command sent by a client to schedule a todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertRequest {
    pub todo_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ConvertRequest {
    pub fn new(todo_id: &str, slot: TimeSlot) -> Self {
        ConvertRequest {
            todo_id: todo_id.to_string(),
            start_time: slot.start(),
            end_time: slot.end(),
        }
    }
}

/// Outcome of a successful conversion: the new task and the updated todo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub task: Task,
    pub todo: Todo,
}

/// The plain task a todo becomes when scheduled into `slot`.
pub fn task_from_todo(todo: &Todo, slot: &TimeSlot) -> Task {
    Task {
        id: uuid::Uuid::new_v4().to_string(),
        title: todo.title.clone(),
        description: todo.description.clone(),
        owner_id: todo.owner_id.clone(),
        assigned_to_id: todo.assigned_to_id.clone(),
        project_id: todo.project_id.clone(),
        completed: false,
        completed_at: None,
        start_time: slot.start(),
        end_time: slot.end(),
        role: TaskRole::Plain,
        converted_from_todo_id: Some(todo.id.clone()),
    }
}

/// Schedule a todo. Fails with `InvalidRange` for an empty or inverted slot,
/// `NotFound` for an unknown todo and `Conflict` if it was already converted.
pub fn convert<S>(store: &S, request: &ConvertRequest) -> CoachCalResult<Conversion>
where
    S: OccurrenceStore + ?Sized,
{
    let slot = TimeSlot::new(request.start_time, request.end_time)?;
    let conversion = store.transactional_convert(&request.todo_id, &slot)?;

    tracing::info!(
        todo_id = %conversion.todo.id,
        task_id = %conversion.task.id,
        start = %slot.start().to_rfc3339(),
        "converted todo to task"
    );

    Ok(conversion)
}
