use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::convert::{Conversion, TimeSlot, task_from_todo};
use crate::date_range::DateRange;
use crate::error::{CoachCalError, CoachCalResult};
use crate::materialize::find_materialized;
use crate::milestone::Milestone;
use crate::task::{Schedulable, Task, TaskOverrides, TaskRole};
use crate::todo::Todo;

/// Everything a store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub todos: Vec<Todo>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
}

impl Document {
    pub fn task(&self, id: &str) -> CoachCalResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoachCalError::not_found("Task", id))
    }

    pub fn todo(&self, id: &str) -> CoachCalResult<&Todo> {
        self.todos
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| CoachCalError::not_found("Todo", id))
    }

    pub fn milestone(&self, id: &str) -> CoachCalResult<&Milestone> {
        self.milestones
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| CoachCalError::not_found("Milestone", id))
    }

    pub fn templates(&self, subject: &str) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.is_recurring_template() && t.involves(subject))
            .cloned()
            .collect()
    }

    pub fn instances(
        &self,
        subject: &str,
        template_id: Option<&str>,
        range: Option<&DateRange>,
    ) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.involves(subject))
            .filter(|t| match (t.recurring_template_id(), template_id) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(wanted)) => actual == wanted,
            })
            .filter(|t| range.is_none_or(|r| touches(t, r)))
            .cloned()
            .collect()
    }

    /// Every instance of one template, whoever it involves now.
    pub fn series_instances(&self, template_id: &str, range: Option<&DateRange>) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.recurring_template_id() == Some(template_id))
            .filter(|t| range.is_none_or(|r| touches(t, r)))
            .cloned()
            .collect()
    }

    pub fn plain_tasks(&self, subject: &str, range: &DateRange) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|t| t.role == TaskRole::Plain && t.involves(subject))
            .filter(|t| t.overlaps(range.start, range.end))
            .cloned()
            .collect()
    }

    pub fn open_todos(&self, subject: &str, project_id: Option<&str>) -> Vec<Todo> {
        self.todos
            .iter()
            .filter(|t| !t.is_converted() && t.involves(subject))
            .filter(|t| project_id.is_none_or(|p| t.project_id.as_deref() == Some(p)))
            .cloned()
            .collect()
    }

    pub fn milestones(&self, project_id: Option<&str>) -> Vec<Milestone> {
        self.milestones
            .iter()
            .filter(|m| project_id.is_none_or(|p| m.project_id == p))
            .cloned()
            .collect()
    }

    pub fn materialize(
        &mut self,
        template_id: &str,
        occurrence: DateTime<Utc>,
        overrides: &TaskOverrides,
        tz: Tz,
        now: DateTime<Utc>,
    ) -> CoachCalResult<Task> {
        let template = self.task(template_id)?;
        if find_materialized(template, occurrence, &self.tasks, tz).is_some() {
            return Err(CoachCalError::Conflict(format!(
                "occurrence {} of '{}' is already materialized",
                occurrence.to_rfc3339(),
                template_id
            )));
        }

        let instance = Task::materialize(template, occurrence, overrides, now)?;
        self.tasks.push(instance.clone());
        Ok(instance)
    }

    pub fn convert(&mut self, todo_id: &str, slot: &TimeSlot) -> CoachCalResult<Conversion> {
        let todo = self
            .todos
            .iter_mut()
            .find(|t| t.id == todo_id)
            .ok_or_else(|| CoachCalError::not_found("Todo", todo_id))?;

        if let Some(task_id) = &todo.converted_to_task_id {
            return Err(CoachCalError::Conflict(format!(
                "todo '{}' was already converted to task '{}'",
                todo_id, task_id
            )));
        }

        let task = task_from_todo(todo, slot);
        todo.converted_to_task_id = Some(task.id.clone());
        let todo = todo.clone();
        self.tasks.push(task.clone());

        Ok(Conversion { task, todo })
    }

    pub fn insert_task(&mut self, task: Task) -> CoachCalResult<()> {
        if self.tasks.iter().any(|t| t.id == task.id) {
            return Err(CoachCalError::Conflict(format!("task '{}' already exists", task.id)));
        }
        self.tasks.push(task);
        Ok(())
    }

    pub fn insert_todo(&mut self, todo: Todo) -> CoachCalResult<()> {
        if self.todos.iter().any(|t| t.id == todo.id) {
            return Err(CoachCalError::Conflict(format!("todo '{}' already exists", todo.id)));
        }
        self.todos.push(todo);
        Ok(())
    }

    pub fn insert_milestone(&mut self, milestone: Milestone) -> CoachCalResult<()> {
        if self.milestones.iter().any(|m| m.id == milestone.id) {
            return Err(CoachCalError::Conflict(format!(
                "milestone '{}' already exists",
                milestone.id
            )));
        }
        self.milestones.push(milestone);
        Ok(())
    }

    pub fn replace_task(&mut self, task: &Task) -> CoachCalResult<()> {
        let slot = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task.id)
            .ok_or_else(|| CoachCalError::not_found("Task", &task.id))?;
        *slot = task.clone();
        Ok(())
    }

    pub fn replace_milestone(&mut self, milestone: &Milestone) -> CoachCalResult<()> {
        let slot = self
            .milestones
            .iter_mut()
            .find(|m| m.id == milestone.id)
            .ok_or_else(|| CoachCalError::not_found("Milestone", &milestone.id))?;
        *slot = milestone.clone();
        Ok(())
    }

    /// Remove a task. Instances of a removed template stay unless
    /// `with_instances` is set. Returns every removed task, the requested
    /// one first.
    pub fn remove_task(&mut self, id: &str, with_instances: bool) -> CoachCalResult<Vec<Task>> {
        let index = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoachCalError::not_found("Task", id))?;
        let task = self.tasks.remove(index);

        let mut removed = Vec::new();
        if with_instances && task.is_recurring_template() {
            let (instances, rest): (Vec<Task>, Vec<Task>) = std::mem::take(&mut self.tasks)
                .into_iter()
                .partition(|t| t.recurring_template_id() == Some(id));
            self.tasks = rest;
            removed = instances;
        }
        removed.insert(0, task);
        Ok(removed)
    }

    pub fn remove_todo(&mut self, id: &str) -> CoachCalResult<Todo> {
        let index = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CoachCalError::not_found("Todo", id))?;
        Ok(self.todos.remove(index))
    }

    pub fn remove_milestone(&mut self, id: &str) -> CoachCalResult<Milestone> {
        let index = self
            .milestones
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| CoachCalError::not_found("Milestone", id))?;
        Ok(self.milestones.remove(index))
    }

    pub fn replace_todo(&mut self, todo: &Todo) -> CoachCalResult<()> {
        let slot = self
            .todos
            .iter_mut()
            .find(|t| t.id == todo.id)
            .ok_or_else(|| CoachCalError::not_found("Todo", &todo.id))?;
        *slot = todo.clone();
        Ok(())
    }
}

/// The instance's current time overlaps `range`, or its nominal slot is in it.
fn touches(instance: &Task, range: &DateRange) -> bool {
    instance.overlaps(range.start, range.end)
        || instance.occurrence_date().is_some_and(|d| range.contains(d))
}
