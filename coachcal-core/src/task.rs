//! Dated tasks: plain one-offs, recurring templates and materialized instances.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoachCalError, CoachCalResult};

/// Capability shared by everything that can sit on someone's schedule.
pub trait Schedulable {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn owner_id(&self) -> &str;
    fn assigned_to_id(&self) -> &str;
    fn project_id(&self) -> Option<&str>;
    fn completed(&self) -> bool;

    /// Whether `subject` owns this item or has it assigned.
    fn involves(&self, subject: &str) -> bool {
        self.owner_id() == subject || self.assigned_to_id() == subject
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    /// Anything else found in stored data. Expands to nothing.
    #[serde(other)]
    Unsupported,
}

impl FromStr for Frequency {
    type Err = CoachCalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            _ => Err(CoachCalError::UnsupportedFrequency(s.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Repetition rule of a template. `end_date` is inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recurring {
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

/// The three mutually exclusive roles a stored task can play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum TaskRole {
    Plain,
    Template {
        recurring: Recurring,
    },
    Instance {
        recurring_template_id: String,
        /// Nominal slot this instance stands for. Never changes after creation.
        occurrence_date: DateTime<Utc>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub owner_id: String,
    pub assigned_to_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[serde(flatten)]
    pub role: TaskRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub converted_from_todo_id: Option<String>,
}

/// Fields for creating a plain task or a recurring template.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub owner_id: String,
    /// Defaults to the owner.
    pub assigned_to_id: Option<String>,
    pub project_id: Option<String>,
    pub recurring: Option<Recurring>,
}

/// Per-occurrence edits applied when an occurrence is materialized or updated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<String>,
    pub completed: Option<bool>,
}

/// Edits to a whole task: a plain task, an instance, or every occurrence of a
/// template. Setting `recurring` turns a plain task into a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub assigned_to_id: Option<String>,
    pub project_id: Option<String>,
    pub recurring: Option<Recurring>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        *self == TaskUpdate::default()
    }
}

impl Task {
    pub fn new(new: NewTask) -> CoachCalResult<Self> {
        ensure_ordered(new.start_time, new.end_time)?;

        let role = match new.recurring {
            Some(recurring) if recurring.frequency == Frequency::Unsupported => {
                return Err(CoachCalError::UnsupportedFrequency(
                    recurring.frequency.to_string(),
                ));
            }
            Some(recurring) => TaskRole::Template { recurring },
            None => TaskRole::Plain,
        };

        Ok(Task {
            id: uuid::Uuid::new_v4().to_string(),
            assigned_to_id: new.assigned_to_id.unwrap_or_else(|| new.owner_id.clone()),
            title: new.title,
            description: new.description,
            owner_id: new.owner_id,
            project_id: new.project_id,
            completed: false,
            completed_at: None,
            start_time: new.start_time,
            end_time: new.end_time,
            role,
            converted_from_todo_id: None,
        })
    }

    /// Build the stored instance for one occurrence of `template`.
    /// The nominal slot is `occurrence`; overrides may move the actual time.
    pub fn materialize(
        template: &Task,
        occurrence: DateTime<Utc>,
        overrides: &TaskOverrides,
        now: DateTime<Utc>,
    ) -> CoachCalResult<Self> {
        if !template.is_recurring_template() {
            return Err(CoachCalError::not_found("Recurring template", &template.id));
        }

        let start_time = overrides.start_time.unwrap_or(occurrence);
        let end_time = overrides
            .end_time
            .unwrap_or_else(|| start_time + template.duration());
        ensure_ordered(start_time, end_time)?;

        let completed = overrides.completed.unwrap_or(false);

        Ok(Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: overrides
                .title
                .clone()
                .unwrap_or_else(|| template.title.clone()),
            description: overrides
                .description
                .clone()
                .unwrap_or_else(|| template.description.clone()),
            owner_id: template.owner_id.clone(),
            assigned_to_id: overrides
                .assigned_to_id
                .clone()
                .unwrap_or_else(|| template.assigned_to_id.clone()),
            project_id: template.project_id.clone(),
            completed,
            completed_at: completed.then_some(now),
            start_time,
            end_time,
            role: TaskRole::Instance {
                recurring_template_id: template.id.clone(),
                occurrence_date: occurrence,
            },
            converted_from_todo_id: None,
        })
    }

    /// Apply edits in place. Templates keep their role; instances keep their slot.
    pub fn apply(&mut self, overrides: &TaskOverrides, now: DateTime<Utc>) -> CoachCalResult<()> {
        self.reschedule(overrides.start_time, overrides.end_time)?;
        if let Some(title) = &overrides.title {
            self.title = title.clone();
        }
        if let Some(description) = &overrides.description {
            self.description = description.clone();
        }
        if let Some(assignee) = &overrides.assigned_to_id {
            self.assigned_to_id = assignee.clone();
        }
        if let Some(completed) = overrides.completed {
            self.set_completed(completed, now);
        }
        Ok(())
    }

    /// Edit the task in place. A template's new start re-anchors the series;
    /// instances already stored keep their nominal slots.
    pub fn update(&mut self, update: &TaskUpdate) -> CoachCalResult<()> {
        let role = match (&update.recurring, &self.role) {
            (None, role) => role.clone(),
            (Some(recurring), _) if recurring.frequency == Frequency::Unsupported => {
                return Err(CoachCalError::UnsupportedFrequency(
                    recurring.frequency.to_string(),
                ));
            }
            (Some(_), TaskRole::Instance { .. }) => {
                return Err(CoachCalError::Conflict(format!(
                    "task '{}' is one occurrence of a series; change the series instead",
                    self.id
                )));
            }
            (Some(recurring), _) => TaskRole::Template {
                recurring: recurring.clone(),
            },
        };

        self.reschedule(update.start_time, update.end_time)?;
        self.role = role;
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(assignee) = &update.assigned_to_id {
            self.assigned_to_id = assignee.clone();
        }
        if let Some(project) = &update.project_id {
            self.project_id = Some(project.clone());
        }
        Ok(())
    }

    /// Move the task. A new start without a new end keeps the duration.
    fn reschedule(
        &mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> CoachCalResult<()> {
        let start_time = start.unwrap_or(self.start_time);
        let end_time = end.unwrap_or_else(|| start_time + self.duration());
        ensure_ordered(start_time, end_time)?;

        self.start_time = start_time;
        self.end_time = end_time;
        Ok(())
    }

    pub fn set_completed(&mut self, completed: bool, now: DateTime<Utc>) {
        self.completed = completed;
        self.completed_at = completed.then_some(now);
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    pub fn recurring(&self) -> Option<&Recurring> {
        match &self.role {
            TaskRole::Template { recurring } => Some(recurring),
            _ => None,
        }
    }

    pub fn is_recurring_template(&self) -> bool {
        matches!(self.role, TaskRole::Template { .. })
    }

    pub fn recurring_template_id(&self) -> Option<&str> {
        match &self.role {
            TaskRole::Instance {
                recurring_template_id,
                ..
            } => Some(recurring_template_id),
            _ => None,
        }
    }

    pub fn occurrence_date(&self) -> Option<DateTime<Utc>> {
        match &self.role {
            TaskRole::Instance {
                occurrence_date, ..
            } => Some(*occurrence_date),
            _ => None,
        }
    }

    /// Closed-interval overlap with `[from, to]`.
    pub fn overlaps(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
        self.start_time <= to && self.end_time >= from
    }
}

impl Schedulable for Task {
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

pub(crate) fn ensure_ordered(start: DateTime<Utc>, end: DateTime<Utc>) -> CoachCalResult<()> {
    if end <= start {
        return Err(CoachCalError::InvalidRange(format!(
            "end {} is not after start {}",
            end.to_rfc3339(),
            start.to_rfc3339()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn new_task(recurring: Option<Recurring>) -> NewTask {
        NewTask {
            title: "Standup".to_string(),
            description: "daily sync".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 3, 3, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 3, 3, 10, 0, 0).unwrap(),
            owner_id: "coach".to_string(),
            assigned_to_id: None,
            project_id: None,
            recurring,
        }
    }

    #[test]
    fn test_new_task_defaults_assignee_to_owner() {
        let task = Task::new(new_task(None)).unwrap();
        assert_eq!(task.assigned_to_id, "coach");
        assert_eq!(task.role, TaskRole::Plain);
        assert!(!task.is_recurring_template());
        assert!(task.recurring_template_id().is_none());
    }

    #[test]
    fn test_new_task_with_recurring_becomes_template() {
        let task = Task::new(new_task(Some(Recurring {
            frequency: Frequency::Weekly,
            end_date: None,
        })))
        .unwrap();
        assert!(task.is_recurring_template());
        assert_eq!(task.recurring().unwrap().frequency, Frequency::Weekly);
    }

    #[test]
    fn test_new_task_rejects_inverted_range() {
        let mut new = new_task(None);
        new.end_time = new.start_time;
        assert!(matches!(
            Task::new(new),
            Err(CoachCalError::InvalidRange(_))
        ));
    }

    #[test]
    fn test_materialize_keeps_nominal_slot_when_time_moves() {
        let template = Task::new(new_task(Some(Recurring {
            frequency: Frequency::Daily,
            end_date: None,
        })))
        .unwrap();
        let occurrence = Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap();
        let moved = Utc.with_ymd_and_hms(2025, 3, 5, 14, 0, 0).unwrap();
        let overrides = TaskOverrides {
            title: Some("Standup (moved)".to_string()),
            start_time: Some(moved),
            ..Default::default()
        };

        let instance = Task::materialize(&template, occurrence, &overrides, Utc::now()).unwrap();

        assert_eq!(instance.recurring_template_id(), Some(template.id.as_str()));
        assert_eq!(instance.occurrence_date(), Some(occurrence));
        assert_eq!(instance.start_time, moved);
        assert_eq!(instance.end_time, moved + Duration::hours(1));
        assert_eq!(instance.title, "Standup (moved)");
        assert!(!instance.is_recurring_template());
    }

    #[test]
    fn test_materialize_requires_template() {
        let plain = Task::new(new_task(None)).unwrap();
        let result = Task::materialize(
            &plain,
            plain.start_time,
            &TaskOverrides::default(),
            Utc::now(),
        );
        assert!(matches!(result, Err(CoachCalError::NotFound { .. })));
    }

    #[test]
    fn test_unknown_frequency_deserializes_as_unsupported() {
        let recurring: Recurring = serde_json::from_str(r#"{"frequency":"yearly"}"#).unwrap();
        assert_eq!(recurring.frequency, Frequency::Unsupported);
        assert!("yearly".parse::<Frequency>().is_err());
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
    }

    #[test]
    fn test_role_roundtrips_through_json() {
        let template = Task::new(new_task(Some(Recurring {
            frequency: Frequency::Monthly,
            end_date: None,
        })))
        .unwrap();
        let json = serde_json::to_value(&template).unwrap();
        assert_eq!(json["role"], "template");
        assert_eq!(json["recurring"]["frequency"], "monthly");

        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn test_apply_new_start_keeps_duration() {
        let mut task = Task::new(new_task(None)).unwrap();
        let moved = Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap();

        task.apply(
            &TaskOverrides {
                start_time: Some(moved),
                ..Default::default()
            },
            Utc::now(),
        )
        .unwrap();

        assert_eq!(task.start_time, moved);
        assert_eq!(task.end_time, moved + Duration::hours(1));
    }

    #[test]
    fn test_apply_explicit_end_still_validated() {
        let mut task = Task::new(new_task(None)).unwrap();
        let overrides = TaskOverrides {
            start_time: Some(Utc.with_ymd_and_hms(2025, 3, 3, 15, 0, 0).unwrap()),
            end_time: Some(Utc.with_ymd_and_hms(2025, 3, 3, 14, 0, 0).unwrap()),
            ..Default::default()
        };

        assert!(matches!(
            task.apply(&overrides, Utc::now()),
            Err(CoachCalError::InvalidRange(_))
        ));
        assert_eq!(task.start_time.hour(), 9);
    }

    #[test]
    fn test_update_changes_rule_and_project() {
        let mut task = Task::new(new_task(Some(Recurring {
            frequency: Frequency::Weekly,
            end_date: None,
        })))
        .unwrap();
        let until = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap();

        task.update(&TaskUpdate {
            project_id: Some("spring-block".to_string()),
            recurring: Some(Recurring {
                frequency: Frequency::Daily,
                end_date: Some(until),
            }),
            ..Default::default()
        })
        .unwrap();

        let recurring = task.recurring().unwrap();
        assert_eq!(recurring.frequency, Frequency::Daily);
        assert_eq!(recurring.end_date, Some(until));
        assert_eq!(task.project_id.as_deref(), Some("spring-block"));
    }

    #[test]
    fn test_update_plain_task_to_series() {
        let mut task = Task::new(new_task(None)).unwrap();
        task.update(&TaskUpdate {
            recurring: Some(Recurring {
                frequency: Frequency::Monthly,
                end_date: None,
            }),
            ..Default::default()
        })
        .unwrap();

        assert!(task.is_recurring_template());
    }

    #[test]
    fn test_update_instance_cannot_repeat() {
        let template = Task::new(new_task(Some(Recurring {
            frequency: Frequency::Daily,
            end_date: None,
        })))
        .unwrap();
        let mut instance = Task::materialize(
            &template,
            template.start_time,
            &TaskOverrides::default(),
            Utc::now(),
        )
        .unwrap();

        let result = instance.update(&TaskUpdate {
            recurring: Some(Recurring {
                frequency: Frequency::Weekly,
                end_date: None,
            }),
            ..Default::default()
        });

        assert!(matches!(result, Err(CoachCalError::Conflict(_))));
        assert_eq!(instance.recurring_template_id(), Some(template.id.as_str()));
    }
}
