use anyhow::Result;
use coachcal_core::{CoachCalError, FileStore, OccurrenceStore, Planner};
use owo_colors::OwoColorize;

/// Delete a task, todo or milestone by id.
pub fn run(planner: &Planner<FileStore>, id: &str, with_instances: bool) -> Result<()> {
    match planner.store().get_task(id) {
        Ok(_) => {
            let removed = planner.delete_task(id, with_instances)?;
            if let Some((task, instances)) = removed.split_first() {
                println!("{}", format!("  Deleted: {}", task.title).red());
                if !instances.is_empty() {
                    println!("  {}", format!("and {} edited occurrence(s)", instances.len()).dimmed());
                } else if task.is_recurring_template() {
                    println!(
                        "  {}",
                        "Edited occurrences stay on the calendar (use --with-instances to remove them)"
                            .dimmed()
                    );
                }
            }
            return Ok(());
        }
        Err(CoachCalError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    match planner.delete_todo(id) {
        Ok(todo) => {
            println!("{}", format!("  Deleted todo: {}", todo.title).red());
            return Ok(());
        }
        Err(CoachCalError::NotFound { .. }) => {}
        Err(e) => return Err(e.into()),
    }

    match planner.delete_milestone(id) {
        Ok(milestone) => {
            println!("{}", format!("  Deleted milestone: {}", milestone.title).red());
            Ok(())
        }
        Err(CoachCalError::NotFound { .. }) => {
            anyhow::bail!("No task, todo or milestone with id '{}'", id)
        }
        Err(e) => Err(e.into()),
    }
}
