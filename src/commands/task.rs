use anyhow::Result;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use coachcal_core::date_range::end_of_day;
use coachcal_core::{FileStore, Frequency, NewTask, Planner, Recurring};
use owo_colors::OwoColorize;

use crate::input::{apply_duration, default_end, parse_date, parse_datetime, parse_end};
use crate::render::Render;

pub struct TaskArgs {
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub duration: Option<String>,
    pub repeat: Option<String>,
    pub until: Option<String>,
    pub description: Option<String>,
    pub assign: Option<String>,
    pub project: Option<String>,
}

pub fn run(planner: &Planner<FileStore>, user: &str, args: TaskArgs) -> Result<()> {
    let tz = planner.tz();
    let start_time = parse_datetime(&args.start, tz)?;

    let end_time = if let Some(end) = &args.end {
        parse_end(end, start_time, tz)?
    } else if let Some(duration) = &args.duration {
        apply_duration(start_time, duration)?
    } else {
        default_end(start_time)
    };

    let recurring = parse_recurring(args.repeat.as_deref(), args.until.as_deref(), tz)?;

    let task = planner.create_task(NewTask {
        title: args.title,
        description: args.description.unwrap_or_default(),
        start_time,
        end_time,
        owner_id: user.to_string(),
        assigned_to_id: args.assign,
        project_id: args.project,
        recurring,
    })?;

    println!("{}", format!("  Created: {}", task.render(tz)).green());
    println!("  {}", task.id.dimmed());

    Ok(())
}

/// `--until` is a date; the series runs through the end of that day.
pub(crate) fn parse_recurring(repeat: Option<&str>, until: Option<&str>, tz: Tz) -> Result<Option<Recurring>> {
    let Some(repeat) = repeat else {
        return Ok(None);
    };

    let frequency: Frequency = repeat.parse()?;
    let end_date: Option<DateTime<Utc>> = until
        .map(parse_date)
        .transpose()?
        .map(|d| end_of_day(d, tz));

    Ok(Some(Recurring {
        frequency,
        end_date,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn no_repeat_is_plain() {
        assert!(parse_recurring(None, None, Tz::UTC).unwrap().is_none());
    }

    #[test]
    fn until_covers_whole_day() {
        let recurring = parse_recurring(Some("weekly"), Some("2026-04-30"), Tz::UTC)
            .unwrap()
            .unwrap();
        assert_eq!(recurring.frequency, Frequency::Weekly);
        let end = recurring.end_date.unwrap();
        assert!(end > Utc.with_ymd_and_hms(2026, 4, 30, 23, 59, 59).unwrap());
        assert!(end < Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn unknown_repeat_is_rejected() {
        assert!(parse_recurring(Some("yearly"), None, Tz::UTC).is_err());
    }
}
