use anyhow::Result;
use coachcal_core::{FileStore, Planner};
use owo_colors::OwoColorize;

use crate::input::parse_date;

pub fn run(
    planner: &Planner<FileStore>,
    project: &str,
    title: &str,
    deadline: Option<String>,
) -> Result<()> {
    let deadline = deadline.as_deref().map(parse_date).transpose()?;
    let milestone = planner.create_milestone(project, title, deadline)?;

    let due = milestone
        .deadline
        .map(|d| format!(" on {}", d.format("%a %b %-d")))
        .unwrap_or_default();
    println!(
        "{}",
        format!("  Created milestone: {}{} #{}", milestone.title, due, milestone.project_id).green()
    );

    Ok(())
}
