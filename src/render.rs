//! Colored terminal rendering for coachcal-core types.

use chrono::NaiveDate;
use chrono_tz::Tz;
use coachcal_core::{
    CalendarEvent, ColorClass, EventId, EventKind, MilestoneMarker, OccurrenceRef, Task, Todo,
};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self, tz: Tz) -> String;
}

impl Render for CalendarEvent {
    fn render(&self, tz: Tz) -> String {
        let time = format_time(self, tz);
        let title = match self.color {
            ColorClass::Active => self.title.clone(),
            ColorClass::Completed => self.title.strikethrough().dimmed().to_string(),
        };
        let marker = match (&self.kind, &self.id) {
            (EventKind::Todo, _) => "todo".yellow().to_string(),
            (_, EventId::Occurrence(OccurrenceRef::Virtual { .. })) => "↻".cyan().to_string(),
            _ => String::new(),
        };
        let id = format!("[{}]", short_id(&self.id));

        format!("  {} {} {} {}", time, title, marker, id.dimmed())
            .trim_end()
            .to_string()
    }
}

impl Render for Todo {
    fn render(&self, _tz: Tz) -> String {
        let check = if self.completed { "[x]" } else { "[ ]" };
        let deadline = self
            .deadline
            .map(|d| format!("due {}", d.format("%a %b %-d")))
            .unwrap_or_default();
        let project = self
            .project_id
            .as_ref()
            .map(|p| format!("#{}", p))
            .unwrap_or_default();

        format!(
            "  {} {} {} {} {}",
            check,
            self.title,
            deadline.yellow(),
            project.cyan(),
            format!("[{}]", self.id).dimmed()
        )
    }
}

impl Render for MilestoneMarker {
    fn render(&self, _tz: Tz) -> String {
        let flag = match self.color {
            ColorClass::Active => "◆".magenta().to_string(),
            ColorClass::Completed => "◇".dimmed().to_string(),
        };
        format!("  {} {} {}", flag, self.title.bold(), format!("#{}", self.project_id).cyan())
    }
}

impl Render for Task {
    fn render(&self, tz: Tz) -> String {
        let start = self.start_time.with_timezone(&tz);
        let end = self.end_time.with_timezone(&tz);
        let repeat = self
            .recurring()
            .map(|r| format!(" (repeats {})", r.frequency))
            .unwrap_or_default();
        format!(
            "{} {}-{}{}",
            self.title,
            start.format("%a %b %-d %H:%M"),
            end.format("%H:%M"),
            repeat
        )
    }
}

/// Human label for a day heading (e.g. "Today", "Tomorrow", "Wed Feb 25").
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// Time column of an event (e.g. "  15:00" or "all-day").
pub fn format_time(event: &CalendarEvent, tz: Tz) -> String {
    if event.is_all_day() {
        return "all-day".to_string();
    }
    format!("{:>7}", event.start.with_timezone(&tz).format("%H:%M"))
}

/// Id a user can pass back on the command line.
fn short_id(id: &EventId) -> String {
    match id {
        EventId::Todo(id) | EventId::Occurrence(OccurrenceRef::Stored { id }) => id.clone(),
        EventId::Occurrence(OccurrenceRef::Virtual { template_id, .. }) => template_id.clone(),
    }
}
