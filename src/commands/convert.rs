use anyhow::Result;
use coachcal_core::{ConvertRequest, DropSlot, FileStore, OccurrenceStore, Planner};
use owo_colors::OwoColorize;

use crate::input::{is_interactive, parse_end, prompt_end};
use crate::render::Render;

pub fn run(planner: &Planner<FileStore>, todo_id: &str, slot: &str, end: Option<String>) -> Result<()> {
    let tz = planner.tz();
    let todo = planner.store().get_todo(todo_id)?;
    if let Some(task_id) = &todo.converted_to_task_id {
        anyhow::bail!("'{}' is already scheduled as task {}", todo.title, task_id);
    }

    let slot = slot.parse::<DropSlot>()?.resolve(tz);

    let slot = match end {
        Some(end) => slot.with_end(parse_end(&end, slot.start(), tz)?)?,
        None if is_interactive() => {
            println!("  Scheduling: {}", todo.title.bold());
            slot.with_end(prompt_end(slot.start(), slot.end(), tz)?)?
        }
        None => slot,
    };

    let conversion = planner.convert(&ConvertRequest::new(&todo.id, slot))?;

    println!("{}", format!("  Scheduled: {}", conversion.task.render(tz)).green());
    println!("  {}", conversion.task.id.dimmed());

    Ok(())
}
