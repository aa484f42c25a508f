//! Calendar service over an [`OccurrenceStore`].
//!
//! Builds the calendar for a subject and window (templates are expanded,
//! reconciled with their instances, merged with plain tasks and projected
//! with todos) and runs the commands that change it.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::calendar_event::{
    CalendarEvent, MilestoneMarker, project, project_milestones, sort_events,
};
use crate::convert::{self, Conversion, ConvertRequest};
use crate::date_range::{DateRange, end_of_day, local_date, start_of_day};
use crate::error::{CoachCalError, CoachCalResult};
use crate::materialize::{merge, resolve};
use crate::milestone::Milestone;
use crate::occurrence::{Occurrence, OccurrenceRef};
use crate::recurrence::occurrences;
use crate::store::OccurrenceStore;
use crate::task::{NewTask, Schedulable, Task, TaskOverrides, TaskUpdate};
use crate::todo::{NewTodo, Todo};

/// Query boundary: what to show, for whom.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarQuery {
    pub window: DateRange,
    pub subject_id: String,
    /// Restrict to one project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl CalendarQuery {
    pub fn new(window: DateRange, subject_id: &str) -> Self {
        CalendarQuery {
            window,
            subject_id: subject_id.to_string(),
            project_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub window: DateRange,
    /// Sorted by start.
    pub events: Vec<CalendarEvent>,
    pub milestones: Vec<MilestoneMarker>,
}

pub struct Planner<S> {
    store: S,
    tz: Tz,
}

impl<S: OccurrenceStore> Planner<S> {
    pub fn new(store: S, tz: Tz) -> Self {
        Planner { store, tz }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// Every dated occurrence involving the subject in the window: plain
    /// tasks, template occurrences (stored where materialized, virtual
    /// otherwise) and any instance not claimed by a computed occurrence.
    ///
    /// A template is resolved against all of its instances, so a day whose
    /// instance was reassigned away from the subject is hidden rather than
    /// shown as the template's default.
    pub fn occurrences(&self, subject: &str, window: &DateRange) -> CoachCalResult<Vec<Occurrence>> {
        let templates = self.store.find_templates(subject)?;
        let instances = self
            .store
            .find_materialized_instances(subject, None, Some(window))?;
        let plain = self.store.find_plain_tasks(subject, window)?;

        let mut resolved = Vec::new();
        for template in &templates {
            let instants = match occurrences(template, window, self.tz) {
                Ok(instants) => instants,
                Err(e) => {
                    tracing::warn!(template_id = %template.id, error = %e, "skipping template");
                    continue;
                }
            };
            let series = self
                .store
                .find_series_instances(&template.id, Some(window))?;
            resolved.extend(
                resolve(template, instants, &series, self.tz)
                    .into_iter()
                    .filter(|o| visible_to(o, subject)),
            );
        }

        Ok(merge(plain, resolved, instances))
    }

    pub fn calendar(&self, query: &CalendarQuery) -> CoachCalResult<CalendarResponse> {
        let subject = query.subject_id.as_str();
        let in_project = |project: Option<&str>| {
            query
                .project_id
                .as_deref()
                .is_none_or(|wanted| project == Some(wanted))
        };

        let occurrences: Vec<Occurrence> = self
            .occurrences(subject, &query.window)?
            .into_iter()
            .filter(|o| in_project(occurrence_project(o)))
            .collect();
        let todos = self
            .store
            .find_todos(subject, query.project_id.as_deref())?;

        let mut events = project(&occurrences, &todos, &query.window, self.tz);
        sort_events(&mut events);

        let milestones = match &query.project_id {
            Some(project_id) => self.store.find_milestones(Some(project_id))?,
            None => {
                let projects: BTreeSet<&str> = occurrences
                    .iter()
                    .filter_map(occurrence_project)
                    .chain(todos.iter().filter_map(|t| t.project_id.as_deref()))
                    .collect();
                self.store
                    .find_milestones(None)?
                    .into_iter()
                    .filter(|m| projects.contains(m.project_id.as_str()))
                    .collect()
            }
        };
        let milestones = project_milestones(&milestones, &query.window, self.tz);

        tracing::debug!(
            subject,
            events = events.len(),
            milestones = milestones.len(),
            "calendar built"
        );

        Ok(CalendarResponse {
            window: query.window,
            events,
            milestones,
        })
    }

    pub fn convert(&self, request: &ConvertRequest) -> CoachCalResult<Conversion> {
        convert::convert(&self.store, request)
    }

    /// Persist one occurrence of a template with per-occurrence edits.
    ///
    /// `occurrence` must be an instant the template actually produces.
    pub fn materialize(
        &self,
        template_id: &str,
        occurrence: DateTime<Utc>,
        overrides: &TaskOverrides,
    ) -> CoachCalResult<Task> {
        let template = self.store.get_task(template_id)?;
        if !template.is_recurring_template() {
            return Err(CoachCalError::not_found("Recurring template", template_id));
        }

        let day = local_date(occurrence, self.tz);
        let day_window = DateRange::new(start_of_day(day, self.tz), end_of_day(day, self.tz))?;
        if !occurrences(&template, &day_window, self.tz)?.any(|i| i == occurrence) {
            return Err(CoachCalError::not_found(
                "Occurrence",
                OccurrenceRef::Virtual {
                    template_id: template_id.to_string(),
                    occurrence,
                }
                .to_string(),
            ));
        }

        let instance =
            self.store
                .create_materialized_instance(template_id, occurrence, overrides, self.tz)?;

        tracing::info!(
            template_id,
            instance_id = %instance.id,
            occurrence = %occurrence.to_rfc3339(),
            "materialized occurrence"
        );
        Ok(instance)
    }

    /// Edit a single occurrence. Virtual occurrences are materialized with
    /// the edits; stored ones are updated in place.
    pub fn edit_occurrence(
        &self,
        reference: &OccurrenceRef,
        overrides: &TaskOverrides,
    ) -> CoachCalResult<Task> {
        match reference {
            OccurrenceRef::Virtual {
                template_id,
                occurrence,
            } => self.materialize(template_id, *occurrence, overrides),
            OccurrenceRef::Stored { id } => {
                let mut task = self.store.get_task(id)?;
                task.apply(overrides, Utc::now())?;
                self.store.update_task(&task)?;
                Ok(task)
            }
        }
    }

    /// Flip completion of an occurrence. A virtual occurrence becomes a
    /// completed instance.
    pub fn toggle_task(&self, reference: &OccurrenceRef) -> CoachCalResult<Task> {
        match reference {
            OccurrenceRef::Virtual { .. } => {
                let overrides = TaskOverrides {
                    completed: Some(true),
                    ..Default::default()
                };
                self.edit_occurrence(reference, &overrides)
            }
            OccurrenceRef::Stored { id } => {
                let mut task = self.store.get_task(id)?;
                task.set_completed(!task.completed, Utc::now());
                self.store.update_task(&task)?;
                Ok(task)
            }
        }
    }

    /// Edit a task as a whole. For a template this changes every occurrence
    /// not already materialized.
    pub fn update_task(&self, id: &str, update: &TaskUpdate) -> CoachCalResult<Task> {
        let mut task = self.store.get_task(id)?;
        task.update(update)?;
        self.store.update_task(&task)?;
        tracing::info!(task_id = %task.id, recurring = task.is_recurring_template(), "updated task");
        Ok(task)
    }

    /// Delete a task. A template's instances are kept as standalone entries
    /// unless `with_instances` is set.
    pub fn delete_task(&self, id: &str, with_instances: bool) -> CoachCalResult<Vec<Task>> {
        let removed = self.store.delete_task(id, with_instances)?;
        tracing::info!(task_id = id, removed = removed.len(), "deleted task");
        Ok(removed)
    }

    pub fn delete_todo(&self, todo_id: &str) -> CoachCalResult<Todo> {
        let todo = self.store.delete_todo(todo_id)?;
        tracing::info!(todo_id, "deleted todo");
        Ok(todo)
    }

    pub fn toggle_todo(&self, todo_id: &str) -> CoachCalResult<Todo> {
        let mut todo = self.store.get_todo(todo_id)?;
        todo.toggle_complete(Utc::now())?;
        self.store.update_todo(&todo)?;
        Ok(todo)
    }

    pub fn create_task(&self, new: NewTask) -> CoachCalResult<Task> {
        let task = Task::new(new)?;
        self.store.insert_task(task.clone())?;
        tracing::info!(task_id = %task.id, recurring = task.is_recurring_template(), "created task");
        Ok(task)
    }

    pub fn create_todo(&self, new: NewTodo) -> CoachCalResult<Todo> {
        let todo = Todo::new(new);
        self.store.insert_todo(todo.clone())?;
        tracing::info!(todo_id = %todo.id, "created todo");
        Ok(todo)
    }

    pub fn create_milestone(
        &self,
        project_id: &str,
        title: &str,
        deadline: Option<NaiveDate>,
    ) -> CoachCalResult<Milestone> {
        let milestone = Milestone::new(project_id, title, deadline);
        self.store.insert_milestone(milestone.clone())?;
        Ok(milestone)
    }

    pub fn toggle_milestone(&self, milestone_id: &str) -> CoachCalResult<Milestone> {
        let mut milestone = self.store.get_milestone(milestone_id)?;
        milestone.toggle_complete(Utc::now());
        self.store.update_milestone(&milestone)?;
        Ok(milestone)
    }

    pub fn delete_milestone(&self, milestone_id: &str) -> CoachCalResult<Milestone> {
        let milestone = self.store.delete_milestone(milestone_id)?;
        tracing::info!(milestone_id, "deleted milestone");
        Ok(milestone)
    }

    /// Todos not yet scheduled, for the side panel.
    pub fn unscheduled_todos(
        &self,
        subject: &str,
        project_id: Option<&str>,
    ) -> CoachCalResult<Vec<Todo>> {
        self.store.find_todos(subject, project_id)
    }
}

fn visible_to(occurrence: &Occurrence, subject: &str) -> bool {
    match occurrence {
        Occurrence::Stored(task) => task.involves(subject),
        Occurrence::Virtual(_) => true,
    }
}

fn occurrence_project(occurrence: &Occurrence) -> Option<&str> {
    match occurrence {
        Occurrence::Stored(task) => task.project_id.as_deref(),
        Occurrence::Virtual(v) => v.project_id.as_deref(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar_event::{ColorClass, EventId, EventKind};
    use crate::convert::{DropSlot, TimeSlot};
    use crate::store::MemoryStore;
    use crate::task::{Frequency, Recurring};
    use chrono::{Duration, TimeZone};

    fn planner() -> Planner<MemoryStore> {
        Planner::new(MemoryStore::new(), Tz::UTC)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    fn weekly_template(planner: &Planner<MemoryStore>) -> Task {
        planner
            .create_task(NewTask {
                title: "Long run".to_string(),
                description: String::new(),
                start_time: at(3, 9),
                end_time: at(3, 10),
                owner_id: "coach".to_string(),
                assigned_to_id: Some("athlete".to_string()),
                project_id: Some("marathon".to_string()),
                recurring: Some(Recurring {
                    frequency: Frequency::Weekly,
                    end_date: None,
                }),
            })
            .unwrap()
    }

    fn todo(planner: &Planner<MemoryStore>, title: &str, deadline: Option<NaiveDate>) -> Todo {
        planner
            .create_todo(NewTodo {
                title: title.to_string(),
                description: String::new(),
                deadline,
                owner_id: "coach".to_string(),
                assigned_to_id: Some("athlete".to_string()),
                project_id: Some("marathon".to_string()),
            })
            .unwrap()
    }

    fn march() -> DateRange {
        DateRange::new(at(1, 0), Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap()).unwrap()
    }

    fn week_of(day: u32) -> DateRange {
        DateRange::new(at(day, 0), at(day + 6, 23)).unwrap()
    }

    #[test]
    fn test_calendar_expands_template_with_virtual_events() {
        let planner = planner();
        let template = weekly_template(&planner);

        let response = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap();

        let starts: Vec<_> = response.events.iter().map(|e| e.start).collect();
        assert_eq!(starts, vec![at(3, 9), at(10, 9), at(17, 9), at(24, 9), at(31, 9)]);
        assert!(response.events.iter().all(|e| matches!(
            &e.id,
            EventId::Occurrence(OccurrenceRef::Virtual { template_id, .. }) if *template_id == template.id
        )));
    }

    #[test]
    fn test_edited_occurrence_replaces_virtual_one() {
        let planner = planner();
        let template = weekly_template(&planner);
        let overrides = TaskOverrides {
            title: Some("Long run (trail)".to_string()),
            start_time: Some(at(10, 15)),
            end_time: Some(at(10, 17)),
            ..Default::default()
        };

        let instance = planner.materialize(&template.id, at(10, 9), &overrides).unwrap();
        let events = planner
            .calendar(&CalendarQuery::new(week_of(9), "athlete"))
            .unwrap()
            .events;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Long run (trail)");
        assert_eq!(events[0].start, at(10, 15));
        assert_eq!(
            events[0].id,
            EventId::Occurrence(OccurrenceRef::Stored { id: instance.id })
        );
    }

    #[test]
    fn test_materialize_rejects_instants_outside_series() {
        let planner = planner();
        let template = weekly_template(&planner);

        let off_series = planner.materialize(&template.id, at(11, 9), &TaskOverrides::default());
        assert!(matches!(off_series, Err(CoachCalError::NotFound { .. })));

        planner
            .materialize(&template.id, at(10, 9), &TaskOverrides::default())
            .unwrap();
        let twice = planner.materialize(&template.id, at(10, 9), &TaskOverrides::default());
        assert!(matches!(twice, Err(CoachCalError::Conflict(_))));
    }

    #[test]
    fn test_toggle_virtual_occurrence_materializes_completed_instance() {
        let planner = planner();
        let template = weekly_template(&planner);
        let reference = OccurrenceRef::Virtual {
            template_id: template.id.clone(),
            occurrence: at(17, 9),
        };

        let done = planner.toggle_task(&reference).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.occurrence_date(), Some(at(17, 9)));

        let events = planner
            .calendar(&CalendarQuery::new(week_of(16), "athlete"))
            .unwrap()
            .events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].color, ColorClass::Completed);

        let undone = planner
            .toggle_task(&OccurrenceRef::Stored { id: done.id })
            .unwrap();
        assert!(!undone.completed);
        assert_eq!(undone.completed_at, None);
    }

    #[test]
    fn test_broken_template_is_skipped() {
        let planner = planner();
        weekly_template(&planner);
        let mut broken = Task::new(NewTask {
            title: "Yearly review".to_string(),
            description: String::new(),
            start_time: at(4, 9),
            end_time: at(4, 10),
            owner_id: "athlete".to_string(),
            assigned_to_id: None,
            project_id: None,
            recurring: Some(Recurring {
                frequency: Frequency::Monthly,
                end_date: None,
            }),
        })
        .unwrap();
        broken.role = crate::task::TaskRole::Template {
            recurring: Recurring {
                frequency: Frequency::Unsupported,
                end_date: None,
            },
        };
        planner.store().insert_task(broken).unwrap();

        let events = planner
            .calendar(&CalendarQuery::new(week_of(2), "athlete"))
            .unwrap()
            .events;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Long run");
    }

    #[test]
    fn test_convert_moves_todo_from_list_to_calendar() {
        let planner = planner();
        let item = todo(&planner, "Buy gels", None);
        assert_eq!(planner.unscheduled_todos("athlete", None).unwrap().len(), 1);

        let slot = "2025-03-06 14:00".parse::<DropSlot>().unwrap().resolve(planner.tz());
        let request = ConvertRequest::new(&item.id, slot);
        let conversion = planner.convert(&request).unwrap();

        assert!(planner.unscheduled_todos("athlete", None).unwrap().is_empty());
        let events = planner
            .calendar(&CalendarQuery::new(week_of(2), "athlete"))
            .unwrap()
            .events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Task);
        assert_eq!(events[0].start, at(6, 14));
        assert_eq!(events[0].end, at(6, 15));
        assert_eq!(
            events[0].id,
            EventId::Occurrence(OccurrenceRef::Stored {
                id: conversion.task.id.clone()
            })
        );

        assert!(matches!(
            planner.convert(&request),
            Err(CoachCalError::Conflict(_))
        ));
        assert!(matches!(
            planner.toggle_todo(&item.id),
            Err(CoachCalError::Conflict(_))
        ));
    }

    #[test]
    fn test_todo_deadline_shows_as_all_day_event() {
        let planner = planner();
        let item = todo(&planner, "Register for race", NaiveDate::from_ymd_opt(2025, 3, 5));
        todo(&planner, "Someday", None);

        let events = planner
            .calendar(&CalendarQuery::new(week_of(2), "athlete"))
            .unwrap()
            .events;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::Todo);
        assert_eq!(events[0].id, EventId::Todo(item.id));
        assert_eq!(events[0].start, at(5, 0));
        assert!(events[0].is_all_day());
    }

    #[test]
    fn test_milestones_follow_subject_projects() {
        let planner = planner();
        weekly_template(&planner);
        planner
            .create_milestone("marathon", "Race day", NaiveDate::from_ymd_opt(2025, 3, 30))
            .unwrap();
        planner
            .create_milestone("other", "Unrelated", NaiveDate::from_ymd_opt(2025, 3, 30))
            .unwrap();

        let response = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap();

        assert_eq!(response.milestones.len(), 1);
        assert_eq!(response.milestones[0].title, "Race day");
    }

    #[test]
    fn test_project_filter_applies_to_events() {
        let planner = planner();
        weekly_template(&planner);
        planner
            .create_task(NewTask {
                title: "Dentist".to_string(),
                description: String::new(),
                start_time: at(4, 8),
                end_time: at(4, 9),
                owner_id: "athlete".to_string(),
                assigned_to_id: None,
                project_id: None,
                recurring: None,
            })
            .unwrap();

        let mut query = CalendarQuery::new(week_of(2), "athlete");
        assert_eq!(planner.calendar(&query).unwrap().events.len(), 2);

        query.project_id = Some("marathon".to_string());
        let events = planner.calendar(&query).unwrap().events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Long run");
    }

    #[test]
    fn test_stretched_slot_is_kept() {
        let planner = planner();
        let item = todo(&planner, "Video analysis", None);
        let slot = TimeSlot::starting_at(at(7, 10))
            .with_end(at(7, 10) + Duration::minutes(150))
            .unwrap();

        let conversion = planner.convert(&ConvertRequest::new(&item.id, slot)).unwrap();

        assert_eq!(conversion.task.duration(), Duration::minutes(150));
    }

    #[test]
    fn test_reassigned_occurrence_leaves_no_template_copy() {
        let planner = planner();
        let template = weekly_template(&planner);
        let overrides = TaskOverrides {
            title: Some("Long run (with Sam)".to_string()),
            assigned_to_id: Some("sam".to_string()),
            ..Default::default()
        };
        let instance = planner.materialize(&template.id, at(10, 9), &overrides).unwrap();

        let athlete = planner
            .calendar(&CalendarQuery::new(week_of(9), "athlete"))
            .unwrap()
            .events;
        assert!(athlete.is_empty());

        let coach = planner
            .calendar(&CalendarQuery::new(week_of(9), "coach"))
            .unwrap()
            .events;
        assert_eq!(coach.len(), 1);
        assert_eq!(coach[0].title, "Long run (with Sam)");

        let sam = planner
            .calendar(&CalendarQuery::new(week_of(9), "sam"))
            .unwrap()
            .events;
        assert_eq!(sam.len(), 1);
        assert_eq!(
            sam[0].id,
            EventId::Occurrence(OccurrenceRef::Stored { id: instance.id })
        );
    }

    #[test]
    fn test_moving_stored_instance_keeps_its_duration() {
        let planner = planner();
        let template = weekly_template(&planner);
        let instance = planner
            .materialize(
                &template.id,
                at(10, 9),
                &TaskOverrides {
                    title: Some("Long run (trail)".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let moved = planner
            .edit_occurrence(
                &OccurrenceRef::Stored {
                    id: instance.id.clone(),
                },
                &TaskOverrides {
                    start_time: Some(at(10, 15)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!((moved.start_time, moved.end_time), (at(10, 15), at(10, 16)));
        assert_eq!(moved.occurrence_date(), Some(at(10, 9)));
        assert_eq!(moved.title, "Long run (trail)");

        let events = planner
            .calendar(&CalendarQuery::new(week_of(9), "athlete"))
            .unwrap()
            .events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].start, at(10, 15));
    }

    #[test]
    fn test_edit_plain_task_in_place() {
        let planner = planner();
        let task = planner
            .create_task(NewTask {
                title: "Physio".to_string(),
                description: String::new(),
                start_time: at(4, 8),
                end_time: at(4, 9),
                owner_id: "athlete".to_string(),
                assigned_to_id: None,
                project_id: None,
                recurring: None,
            })
            .unwrap();

        let edited = planner
            .edit_occurrence(
                &OccurrenceRef::Stored { id: task.id.clone() },
                &TaskOverrides {
                    end_time: Some(at(4, 10)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!((edited.start_time, edited.end_time), (at(4, 8), at(4, 10)));
        assert_eq!(planner.store().get_task(&task.id).unwrap(), edited);
    }

    #[test]
    fn test_series_update_changes_future_occurrences() {
        let planner = planner();
        let template = weekly_template(&planner);
        let edited = planner
            .materialize(&template.id, at(10, 9), &TaskOverrides::default())
            .unwrap();

        planner
            .update_task(
                &template.id,
                &TaskUpdate {
                    title: Some("Easy run".to_string()),
                    project_id: Some("base".to_string()),
                    recurring: Some(Recurring {
                        frequency: Frequency::Weekly,
                        end_date: Some(at(17, 23)),
                    }),
                    ..Default::default()
                },
            )
            .unwrap();

        let events = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap()
            .events;
        let titles: Vec<_> = events.iter().map(|e| (e.start, e.title.as_str())).collect();
        assert_eq!(
            titles,
            vec![
                (at(3, 9), "Easy run"),
                (at(10, 9), "Long run"),
                (at(17, 9), "Easy run"),
            ]
        );
        assert_eq!(
            events[1].id,
            EventId::Occurrence(OccurrenceRef::Stored { id: edited.id })
        );
    }

    #[test]
    fn test_deleting_template_keeps_edited_occurrences_unless_asked() {
        let planner = planner();
        let template = weekly_template(&planner);
        let edited = planner
            .materialize(
                &template.id,
                at(10, 9),
                &TaskOverrides {
                    title: Some("Long run (trail)".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let removed = planner.delete_task(&template.id, false).unwrap();
        assert_eq!(removed.len(), 1);

        let events = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap()
            .events;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title, "Long run (trail)");

        let second = weekly_template(&planner);
        planner
            .materialize(&second.id, at(17, 9), &TaskOverrides::default())
            .unwrap();
        let removed = planner.delete_task(&second.id, true).unwrap();
        assert_eq!(removed.len(), 2);

        let events = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap()
            .events;
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].id,
            EventId::Occurrence(OccurrenceRef::Stored { id: edited.id })
        );
        assert!(matches!(
            planner.delete_task(&second.id, true),
            Err(CoachCalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_deleted_todo_leaves_the_list() {
        let planner = planner();
        let item = todo(&planner, "Buy gels", None);

        planner.delete_todo(&item.id).unwrap();

        assert!(planner.unscheduled_todos("athlete", None).unwrap().is_empty());
        assert!(matches!(
            planner.delete_todo(&item.id),
            Err(CoachCalError::NotFound { .. })
        ));
    }

    #[test]
    fn test_milestone_toggle_and_delete() {
        let planner = planner();
        weekly_template(&planner);
        let milestone = planner
            .create_milestone("marathon", "Race day", NaiveDate::from_ymd_opt(2025, 3, 30))
            .unwrap();

        let done = planner.toggle_milestone(&milestone.id).unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        let response = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap();
        assert!(response.milestones[0].completed);

        planner.delete_milestone(&milestone.id).unwrap();
        let response = planner
            .calendar(&CalendarQuery::new(march(), "athlete"))
            .unwrap();
        assert!(response.milestones.is_empty());
    }
}
