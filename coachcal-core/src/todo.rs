//! Undated action items.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoachCalError, CoachCalResult};
use crate::task::Schedulable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Todo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// A calendar date, not a time range.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub owner_id: String,
    pub assigned_to_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Set once the todo has been scheduled as a task. Never cleared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_to_task_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub owner_id: String,
    pub assigned_to_id: Option<String>,
    pub project_id: Option<String>,
}

impl Todo {
    pub fn new(new: NewTodo) -> Self {
        Todo {
            id: uuid::Uuid::new_v4().to_string(),
            assigned_to_id: new.assigned_to_id.unwrap_or_else(|| new.owner_id.clone()),
            title: new.title,
            description: new.description,
            deadline: new.deadline,
            owner_id: new.owner_id,
            project_id: new.project_id,
            completed: false,
            completed_at: None,
            converted_to_task_id: None,
        }
    }

    pub fn is_converted(&self) -> bool {
        self.converted_to_task_id.is_some()
    }

    /// Flip completion. A converted todo is frozen.
    pub fn toggle_complete(&mut self, now: DateTime<Utc>) -> CoachCalResult<()> {
        if let Some(task_id) = &self.converted_to_task_id {
            return Err(CoachCalError::Conflict(format!(
                "todo '{}' was converted to task '{}'",
                self.id, task_id
            )));
        }
        self.completed = !self.completed;
        self.completed_at = self.completed.then_some(now);
        Ok(())
    }
}

impl Schedulable for Todo {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn owner_id(&self) -> &str {
        &self.owner_id
    }

    fn assigned_to_id(&self) -> &str {
        &self.assigned_to_id
    }

    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn completed(&self) -> bool {
        self.completed
    }
}
