use anyhow::Result;
use coachcal_core::{FileStore, NewTodo, Planner};
use owo_colors::OwoColorize;

use crate::input::parse_date;

pub fn run(
    planner: &Planner<FileStore>,
    user: &str,
    title: String,
    deadline: Option<String>,
    description: Option<String>,
    assign: Option<String>,
    project: Option<String>,
) -> Result<()> {
    let deadline = deadline.as_deref().map(parse_date).transpose()?;

    let todo = planner.create_todo(NewTodo {
        title,
        description: description.unwrap_or_default(),
        deadline,
        owner_id: user.to_string(),
        assigned_to_id: assign,
        project_id: project,
    })?;

    println!("{}", format!("  Created todo: {}", todo.title).green());
    println!("  {}", todo.id.dimmed());

    Ok(())
}
