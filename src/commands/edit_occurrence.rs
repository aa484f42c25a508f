use anyhow::Result;
use coachcal_core::{FileStore, OccurrenceRef, Planner, TaskOverrides};
use owo_colors::OwoColorize;

use super::resolve_occurrence;
use crate::input::{parse_datetime, parse_end};
use crate::render::Render;

pub struct Edits {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub assign: Option<String>,
}

impl Edits {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.start.is_none()
            && self.end.is_none()
            && self.assign.is_none()
    }
}

pub fn run(planner: &Planner<FileStore>, id: &str, at: Option<&str>, edits: Edits) -> Result<()> {
    if edits.is_empty() {
        anyhow::bail!("Nothing to change. Pass --title, --start, --end, --description or --assign");
    }

    let tz = planner.tz();
    let reference = resolve_occurrence(planner, id, at)?;

    let start_time = edits
        .start
        .as_deref()
        .map(|s| parse_datetime(s, tz))
        .transpose()?;
    // A relative end ("45m", "17:00") counts from the new start, else the nominal one.
    let anchor = match (&reference, start_time) {
        (_, Some(start)) => Some(start),
        (OccurrenceRef::Virtual { occurrence, .. }, None) => Some(*occurrence),
        (OccurrenceRef::Stored { .. }, None) => None,
    };
    let end_time = match (edits.end.as_deref(), anchor) {
        (Some(end), Some(anchor)) => Some(parse_end(end, anchor, tz)?),
        (Some(end), None) => Some(parse_datetime(end, tz)?),
        (None, _) => None,
    };

    let overrides = TaskOverrides {
        title: edits.title,
        description: edits.description,
        start_time,
        end_time,
        assigned_to_id: edits.assign,
        completed: None,
    };

    let task = planner.edit_occurrence(&reference, &overrides)?;

    println!("{}", format!("  Updated: {}", task.render(tz)).green());
    println!("  {}", task.id.dimmed());

    Ok(())
}
