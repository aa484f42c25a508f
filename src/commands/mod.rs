pub mod complete;
pub mod config;
pub mod convert;
pub mod delete;
pub mod edit;
pub mod edit_occurrence;
pub mod events;
pub mod milestone;
pub mod task;
pub mod todo;
pub mod todos;

use anyhow::Result;
use coachcal_core::materialize::find_materialized;
use coachcal_core::{FileStore, OccurrenceRef, OccurrenceStore, Planner};

use crate::input::parse_datetime;

/// Turn a command-line id (and `--at` for repeating tasks) into an occurrence reference.
pub fn resolve_occurrence(
    planner: &Planner<FileStore>,
    id: &str,
    at: Option<&str>,
) -> Result<OccurrenceRef> {
    let task = planner.store().get_task(id)?;

    match at {
        Some(at) => {
            if !task.is_recurring_template() {
                anyhow::bail!("Task '{}' does not repeat; drop --at to edit it directly", id);
            }
            let occurrence = parse_datetime(at, planner.tz())?;

            // Already edited once: act on the stored instance.
            let instances = planner.store().find_series_instances(&task.id, None)?;
            if let Some(instance) = find_materialized(&task, occurrence, &instances, planner.tz()) {
                return Ok(OccurrenceRef::Stored {
                    id: instance.id.clone(),
                });
            }

            Ok(OccurrenceRef::Virtual {
                template_id: task.id,
                occurrence,
            })
        }
        None if task.is_recurring_template() => anyhow::bail!(
            "Task '{}' repeats. Pick one occurrence with --at \"YYYY-MM-DD HH:MM\", or use `coachcal edit {}` for the whole series",
            id,
            id
        ),
        None => Ok(OccurrenceRef::Stored { id: task.id }),
    }
}
