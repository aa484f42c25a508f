use anyhow::Result;
use coachcal_core::date_range::end_of_day;
use coachcal_core::{FileStore, OccurrenceStore, Planner, Recurring, TaskUpdate};
use owo_colors::OwoColorize;

use super::task::parse_recurring;
use crate::input::{parse_date, parse_datetime, parse_end};
use crate::render::Render;

pub struct SeriesEdits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub assign: Option<String>,
    pub project: Option<String>,
    pub repeat: Option<String>,
    pub until: Option<String>,
}

/// Edit a task as a whole. On a repeating task this changes every
/// occurrence that hasn't been edited on its own.
pub fn run(planner: &Planner<FileStore>, id: &str, edits: SeriesEdits) -> Result<()> {
    let tz = planner.tz();
    let task = planner.store().get_task(id)?;

    let start_time = edits
        .start
        .as_deref()
        .map(|s| parse_datetime(s, tz))
        .transpose()?;
    let end_time = edits
        .end
        .as_deref()
        .map(|e| parse_end(e, start_time.unwrap_or(task.start_time), tz))
        .transpose()?;

    let recurring = match (edits.repeat.as_deref(), edits.until.as_deref()) {
        (Some(repeat), until) => parse_recurring(Some(repeat), until, tz)?,
        (None, Some(until)) => {
            let Some(current) = task.recurring() else {
                anyhow::bail!("Task '{}' does not repeat; pass --repeat with --until", id);
            };
            Some(Recurring {
                frequency: current.frequency,
                end_date: Some(end_of_day(parse_date(until)?, tz)),
            })
        }
        (None, None) => None,
    };

    let update = TaskUpdate {
        title: edits.title,
        description: edits.description,
        start_time,
        end_time,
        assigned_to_id: edits.assign,
        project_id: edits.project,
        recurring,
    };
    if update.is_empty() {
        anyhow::bail!(
            "Nothing to change. Pass --title, --start, --end, --description, --assign, --project, --repeat or --until"
        );
    }

    let task = planner.update_task(id, &update)?;

    println!("{}", format!("  Updated: {}", task.render(tz)).green());
    if let Some(recurring) = task.recurring() {
        let until = recurring
            .end_date
            .map(|d| format!(" until {}", d.with_timezone(&tz).format("%a %b %-d")))
            .unwrap_or_default();
        println!("  {}", format!("repeats {}{}", recurring.frequency, until).dimmed());
    }

    Ok(())
}
