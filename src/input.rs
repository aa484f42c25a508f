//! Parsing of user-typed dates, times and durations.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use coachcal_core::constants::DEFAULT_SLOT_MINUTES;
use coachcal_core::date_range::{local_date, resolve_local};
use dialoguer::Input;
use owo_colors::OwoColorize;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Parse a wall-clock date and time in the calendar frame.
pub fn parse_datetime(input: &str, tz: Tz) -> Result<DateTime<Utc>> {
    let input = input.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|naive| resolve_local(naive, tz))
        .ok_or_else(|| {
            anyhow::anyhow!("Could not parse date/time: \"{}\" (expected YYYY-MM-DD HH:MM)", input)
        })
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    Ok(coachcal_core::date_range::parse_date(input.trim())?)
}

/// Parse an end input: a duration ("45m", "2h"), a time on the start's day
/// ("17:30"), or a full date and time.
pub fn parse_end(input: &str, start: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>> {
    if let Ok(end) = try_apply_duration(start, input) {
        return Ok(end);
    }

    let cleaned = input
        .trim()
        .strip_prefix("until ")
        .or_else(|| input.trim().strip_prefix("to "))
        .unwrap_or(input.trim());

    if let Ok(time) = NaiveTime::parse_from_str(cleaned, "%H:%M") {
        return Ok(resolve_local(local_date(start, tz).and_time(time), tz));
    }

    parse_datetime(cleaned, tz)
}

pub fn apply_duration(start: DateTime<Utc>, input: &str) -> Result<DateTime<Utc>> {
    try_apply_duration(start, input).with_context(|| format!("Could not parse duration: \"{}\"", input))
}

fn try_apply_duration(start: DateTime<Utc>, input: &str) -> Result<DateTime<Utc>> {
    let std_dur = humantime::parse_duration(input.trim()).map_err(|e| anyhow::anyhow!("{}", e))?;
    let chrono_dur = Duration::from_std(std_dur).context("Duration too large")?;
    Ok(start + chrono_dur)
}

pub fn default_end(start: DateTime<Utc>) -> DateTime<Utc> {
    start + Duration::minutes(DEFAULT_SLOT_MINUTES)
}

pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Ask for an end time, accepting durations or times. Empty keeps `fallback`.
pub fn prompt_end(start: DateTime<Utc>, fallback: DateTime<Utc>, tz: Tz) -> Result<DateTime<Utc>> {
    let hint = fallback.with_timezone(&tz).format("%H:%M").to_string();
    loop {
        let input: String = Input::new()
            .with_prompt(format!("  Until? ({})", hint))
            .default(String::new())
            .show_default(false)
            .interact_text()?;
        if input.is_empty() {
            return Ok(fallback);
        }
        match parse_end(&input, start, tz) {
            Ok(end) if end > start => return Ok(end),
            Ok(_) => eprintln!("  {}", "End must be after the start".red()),
            Err(e) => eprintln!("  {}", e.to_string().red()),
        }
    }
}
