use anyhow::Result;
use coachcal_core::{FileStore, Planner};
use owo_colors::OwoColorize;

use crate::render::Render;

pub fn run(planner: &Planner<FileStore>, user: &str, project: Option<&str>, json: bool) -> Result<()> {
    let mut todos = planner.unscheduled_todos(user, project)?;
    todos.sort_by(|a, b| {
        // Dated first, earliest deadline first.
        match (a.deadline, b.deadline) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.title.cmp(&b.title),
        }
    });

    if json {
        println!("{}", serde_json::to_string_pretty(&todos)?);
        return Ok(());
    }

    if todos.is_empty() {
        println!("{}", "Nothing left to schedule".dimmed());
        return Ok(());
    }

    for todo in &todos {
        println!("{}", todo.render(planner.tz()));
    }

    Ok(())
}
