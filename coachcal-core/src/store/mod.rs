//! Persistence port for tasks, todos and milestones.
//!
//! Both shipped stores keep the whole data set as one [`Document`] and apply
//! every mutation under a lock, so checks and writes made in one call are
//! atomic with respect to other callers.

mod document;
mod file;
mod memory;

pub use document::Document;
pub use file::FileStore;
pub use memory::MemoryStore;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::convert::{Conversion, TimeSlot};
use crate::date_range::DateRange;
use crate::error::CoachCalResult;
use crate::milestone::Milestone;
use crate::task::{Task, TaskOverrides};
use crate::todo::Todo;

/// Queries and commands the calendar needs from storage.
///
/// `subject` is a user id; an item matches when the subject owns it or has it
/// assigned.
pub trait OccurrenceStore {
    /// Recurring templates involving `subject`, regardless of date.
    fn find_templates(&self, subject: &str) -> CoachCalResult<Vec<Task>>;

    /// Materialized instances involving `subject`, optionally limited to one
    /// template. With a `range`, an instance matches when its current time
    /// overlaps the range or its nominal slot falls inside it.
    fn find_materialized_instances(
        &self,
        subject: &str,
        template_id: Option<&str>,
        range: Option<&DateRange>,
    ) -> CoachCalResult<Vec<Task>>;

    /// Instances of one template whoever they involve, with the same `range`
    /// rule as [`find_materialized_instances`](Self::find_materialized_instances).
    fn find_series_instances(
        &self,
        template_id: &str,
        range: Option<&DateRange>,
    ) -> CoachCalResult<Vec<Task>>;

    /// Non-recurring, non-instance tasks overlapping `range`.
    fn find_plain_tasks(&self, subject: &str, range: &DateRange) -> CoachCalResult<Vec<Task>>;

    /// Persist the instance of `template_id` for the day of `occurrence`.
    /// Fails with `Conflict` if that day is already materialized.
    fn create_materialized_instance(
        &self,
        template_id: &str,
        occurrence: DateTime<Utc>,
        overrides: &TaskOverrides,
        tz: Tz,
    ) -> CoachCalResult<Task>;

    /// Unconverted todos involving `subject`, optionally within one project.
    fn find_todos(&self, subject: &str, project_id: Option<&str>) -> CoachCalResult<Vec<Todo>>;

    /// Create the task for `todo_id` and mark the todo converted, atomically.
    fn transactional_convert(&self, todo_id: &str, slot: &TimeSlot) -> CoachCalResult<Conversion>;

    fn get_task(&self, id: &str) -> CoachCalResult<Task>;

    fn get_todo(&self, id: &str) -> CoachCalResult<Todo>;

    fn insert_task(&self, task: Task) -> CoachCalResult<()>;

    fn insert_todo(&self, todo: Todo) -> CoachCalResult<()>;

    /// Replace the stored task with the same id.
    fn update_task(&self, task: &Task) -> CoachCalResult<()>;

    /// Replace the stored todo with the same id.
    fn update_todo(&self, todo: &Todo) -> CoachCalResult<()>;

    /// Remove a task. With `with_instances`, a template's stored instances
    /// go too; otherwise they are left as orphans. Returns what was removed.
    fn delete_task(&self, id: &str, with_instances: bool) -> CoachCalResult<Vec<Task>>;

    fn delete_todo(&self, id: &str) -> CoachCalResult<Todo>;

    /// Milestones of one project, or of every project.
    fn find_milestones(&self, project_id: Option<&str>) -> CoachCalResult<Vec<Milestone>>;

    fn get_milestone(&self, id: &str) -> CoachCalResult<Milestone>;

    fn insert_milestone(&self, milestone: Milestone) -> CoachCalResult<()>;

    fn update_milestone(&self, milestone: &Milestone) -> CoachCalResult<()>;

    fn delete_milestone(&self, id: &str) -> CoachCalResult<Milestone>;
}

/// A store holding a single [`Document`] behind a lock.
pub trait DocumentStore {
    /// Run `f` against a consistent snapshot.
    fn read<R>(&self, f: impl FnOnce(&Document) -> R) -> CoachCalResult<R>;

    /// Run `f` with exclusive access. Changes are kept only if `f` succeeds.
    fn write<R>(&self, f: impl FnOnce(&mut Document) -> CoachCalResult<R>) -> CoachCalResult<R>;
}

impl<S: DocumentStore> OccurrenceStore for S {
    fn find_templates(&self, subject: &str) -> CoachCalResult<Vec<Task>> {
        self.read(|doc| doc.templates(subject))
    }

    fn find_materialized_instances(
        &self,
        subject: &str,
        template_id: Option<&str>,
        range: Option<&DateRange>,
    ) -> CoachCalResult<Vec<Task>> {
        self.read(|doc| doc.instances(subject, template_id, range))
    }

    fn find_series_instances(
        &self,
        template_id: &str,
        range: Option<&DateRange>,
    ) -> CoachCalResult<Vec<Task>> {
        self.read(|doc| doc.series_instances(template_id, range))
    }

    fn find_plain_tasks(&self, subject: &str, range: &DateRange) -> CoachCalResult<Vec<Task>> {
        self.read(|doc| doc.plain_tasks(subject, range))
    }

    fn create_materialized_instance(
        &self,
        template_id: &str,
        occurrence: DateTime<Utc>,
        overrides: &TaskOverrides,
        tz: Tz,
    ) -> CoachCalResult<Task> {
        self.write(|doc| doc.materialize(template_id, occurrence, overrides, tz, Utc::now()))
    }

    fn find_todos(&self, subject: &str, project_id: Option<&str>) -> CoachCalResult<Vec<Todo>> {
        self.read(|doc| doc.open_todos(subject, project_id))
    }

    fn transactional_convert(&self, todo_id: &str, slot: &TimeSlot) -> CoachCalResult<Conversion> {
        self.write(|doc| doc.convert(todo_id, slot))
    }

    fn get_task(&self, id: &str) -> CoachCalResult<Task> {
        self.read(|doc| doc.task(id).cloned())?
    }

    fn get_todo(&self, id: &str) -> CoachCalResult<Todo> {
        self.read(|doc| doc.todo(id).cloned())?
    }

    fn insert_task(&self, task: Task) -> CoachCalResult<()> {
        self.write(|doc| doc.insert_task(task))
    }

    fn insert_todo(&self, todo: Todo) -> CoachCalResult<()> {
        self.write(|doc| doc.insert_todo(todo))
    }

    fn update_task(&self, task: &Task) -> CoachCalResult<()> {
        self.write(|doc| doc.replace_task(task))
    }

    fn update_todo(&self, todo: &Todo) -> CoachCalResult<()> {
        self.write(|doc| doc.replace_todo(todo))
    }

    fn delete_task(&self, id: &str, with_instances: bool) -> CoachCalResult<Vec<Task>> {
        self.write(|doc| doc.remove_task(id, with_instances))
    }

    fn delete_todo(&self, id: &str) -> CoachCalResult<Todo> {
        self.write(|doc| doc.remove_todo(id))
    }

    fn find_milestones(&self, project_id: Option<&str>) -> CoachCalResult<Vec<Milestone>> {
        self.read(|doc| doc.milestones(project_id))
    }

    fn get_milestone(&self, id: &str) -> CoachCalResult<Milestone> {
        self.read(|doc| doc.milestone(id).cloned())?
    }

    fn insert_milestone(&self, milestone: Milestone) -> CoachCalResult<()> {
        self.write(|doc| doc.insert_milestone(milestone))
    }

    fn update_milestone(&self, milestone: &Milestone) -> CoachCalResult<()> {
        self.write(|doc| doc.replace_milestone(milestone))
    }

    fn delete_milestone(&self, id: &str) -> CoachCalResult<Milestone> {
        self.write(|doc| doc.remove_milestone(id))
    }
}
