//! Core of coachcal: recurring tasks, todos and the calendar built from them.
//!
//! - `recurrence` expands a template into occurrence instants
//! - `materialize` reconciles those with stored per-occurrence edits
//! - `calendar_event` projects tasks and todos into displayable events
//! - `convert` schedules an undated todo as a task
//! - `planner` ties these together over an `OccurrenceStore`

pub mod calendar_event;
pub mod coachcal_config;
pub mod constants;
pub mod convert;
pub mod date_range;
pub mod error;
pub mod materialize;
pub mod milestone;
pub mod occurrence;
pub mod planner;
pub mod recurrence;
pub mod store;
pub mod task;
pub mod todo;

pub use calendar_event::{CalendarEvent, ColorClass, EventId, EventKind, MilestoneMarker};
pub use coachcal_config::CoachcalConfig;
pub use convert::{Conversion, ConvertRequest, DropSlot, TimeSlot};
pub use date_range::{CalendarView, DateRange};
pub use error::{CoachCalError, CoachCalResult};
pub use milestone::Milestone;
pub use occurrence::{Occurrence, OccurrenceRef, VirtualOccurrence};
pub use planner::{CalendarQuery, CalendarResponse, Planner};
pub use store::{FileStore, MemoryStore, OccurrenceStore};
pub use task::{
    Frequency, NewTask, Recurring, Schedulable, Task, TaskOverrides, TaskRole, TaskUpdate,
};
pub use todo::{NewTodo, Todo};
