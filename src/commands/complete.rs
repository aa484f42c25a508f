use anyhow::Result;
use coachcal_core::{CoachCalError, FileStore, OccurrenceStore, Planner};
use owo_colors::OwoColorize;

use super::resolve_occurrence;

/// Toggle a task occurrence, or else the todo or milestone with that id.
pub fn run(planner: &Planner<FileStore>, id: &str, at: Option<&str>) -> Result<()> {
    match planner.store().get_task(id) {
        Ok(_) => {
            let reference = resolve_occurrence(planner, id, at)?;
            let task = planner.toggle_task(&reference)?;
            print_state(&task.title, task.completed);
            Ok(())
        }
        Err(CoachCalError::NotFound { .. }) if at.is_none() => match planner.toggle_todo(id) {
            Ok(todo) => {
                print_state(&todo.title, todo.completed);
                Ok(())
            }
            Err(CoachCalError::NotFound { .. }) => {
                let milestone = planner.toggle_milestone(id)?;
                print_state(&milestone.title, milestone.completed);
                Ok(())
            }
            Err(e) => Err(e.into()),
        },
        Err(e) => Err(e.into()),
    }
}

fn print_state(title: &str, completed: bool) {
    if completed {
        println!("{}", format!("  Done: {}", title).green());
    } else {
        println!("{}", format!("  Reopened: {}", title).yellow());
    }
}
