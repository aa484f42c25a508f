use anyhow::Result;
use chrono::Utc;
use coachcal_core::calendar_event::by_day;
use coachcal_core::date_range::local_date;
use coachcal_core::{CalendarQuery, CalendarView, DateRange, FileStore, Planner};
use owo_colors::OwoColorize;

use crate::input::parse_date;
use crate::render::{Render, format_date_label};

/// Which days to show.
pub struct Window {
    pub view: Option<CalendarView>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
}

impl Window {
    fn resolve(&self, planner: &Planner<FileStore>) -> Result<DateRange> {
        let tz = planner.tz();
        let today = local_date(Utc::now(), tz);

        if let Some(view) = self.view {
            let date = match &self.date {
                Some(d) => parse_date(d)?,
                None => today,
            };
            return Ok(view.range(date, tz));
        }

        let from = self.from.as_deref().or(self.date.as_deref());
        Ok(DateRange::from_args(from, self.to.as_deref(), today, tz)?)
    }
}

pub fn run(
    planner: &Planner<FileStore>,
    user: &str,
    window: Window,
    project: Option<String>,
    json: bool,
) -> Result<()> {
    let tz = planner.tz();
    let range = window.resolve(planner)?;

    let mut query = CalendarQuery::new(range, user);
    query.project_id = project;
    let response = planner.calendar(&query)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if response.events.is_empty() && response.milestones.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let today = local_date(Utc::now(), tz);
    let days = by_day(&response.events, &range, tz);
    let mut first = true;

    for (date, events) in &days {
        let milestones: Vec<_> = response.milestones.iter().filter(|m| m.date == *date).collect();
        if events.is_empty() && milestones.is_empty() {
            continue;
        }

        if !first {
            println!();
        }
        first = false;

        println!("{}", format_date_label(*date, today).bold());
        for milestone in milestones {
            println!("{}", milestone.render(tz));
        }
        for event in events {
            println!("{}", event.render(tz));
        }
    }

    Ok(())
}
