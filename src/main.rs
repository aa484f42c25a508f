mod commands;
mod input;
mod render;
mod telemetry;

use anyhow::Result;
use clap::{Parser, Subcommand};
use coachcal_core::{CalendarView, CoachcalConfig, FileStore, Planner};

#[derive(Parser)]
#[command(name = "coachcal")]
#[command(about = "Plan recurring tasks and schedule todos onto your calendar")]
struct Cli {
    /// More log output (-v info, -vv debug). COACHCAL_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Act as this user instead of the configured one
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the calendar
    Events {
        /// day, week or month around --date
        #[arg(long, conflicts_with_all = ["from", "to"])]
        view: Option<CalendarView>,

        /// Anchor date for --view (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Show events from this date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// Show events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Only this project
        #[arg(short, long)]
        project: Option<String>,

        /// Print the raw calendar response as JSON
        #[arg(long)]
        json: bool,
    },
    /// List todos not yet scheduled
    Todos {
        #[arg(short, long)]
        project: Option<String>,

        #[arg(long)]
        json: bool,
    },
    /// Add a todo
    Todo {
        title: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Assign to another user
        #[arg(short, long)]
        assign: Option<String>,

        #[arg(short, long)]
        project: Option<String>,
    },
    /// Add a task, optionally repeating
    Task {
        title: String,

        /// Start (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        start: String,

        /// End (YYYY-MM-DD HH:MM)
        #[arg(short, long, conflicts_with = "duration")]
        end: Option<String>,

        /// Duration (e.g. "30m", "2h"), default 1 hour
        #[arg(long)]
        duration: Option<String>,

        /// daily, weekly or monthly
        #[arg(short, long)]
        repeat: Option<String>,

        /// Last day of the series (YYYY-MM-DD)
        #[arg(long, requires = "repeat")]
        until: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        assign: Option<String>,

        #[arg(short, long)]
        project: Option<String>,
    },
    /// Schedule a todo into a half-hour slot
    Convert {
        /// Todo id
        todo: String,

        /// Drop slot (YYYY-MM-DD HH:MM, minutes 00 or 30)
        #[arg(long)]
        slot: String,

        /// End time or duration; prompted when omitted
        #[arg(long)]
        end: Option<String>,
    },
    /// Edit a single occurrence of a task
    EditOccurrence {
        /// Task id, or template id together with --at
        id: String,

        /// Occurrence start of a repeating task (YYYY-MM-DD HH:MM)
        #[arg(long)]
        at: Option<String>,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// New start (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        start: Option<String>,

        /// New end (YYYY-MM-DD HH:MM)
        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        assign: Option<String>,
    },
    /// Edit a task as a whole; for a repeating task, the entire series
    Edit {
        /// Task id
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// New start (YYYY-MM-DD HH:MM); re-anchors a series
        #[arg(short, long)]
        start: Option<String>,

        /// New end (YYYY-MM-DD HH:MM, HH:MM or a duration)
        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        assign: Option<String>,

        #[arg(short, long)]
        project: Option<String>,

        /// daily, weekly or monthly
        #[arg(short, long)]
        repeat: Option<String>,

        /// Last day of the series (YYYY-MM-DD)
        #[arg(long)]
        until: Option<String>,
    },
    /// Delete a task, todo or milestone
    Delete {
        /// Task, template, todo or milestone id
        id: String,

        /// Also delete the edited occurrences of a repeating task
        #[arg(long)]
        with_instances: bool,
    },
    /// Toggle completion of a task occurrence, todo or milestone
    Complete {
        /// Task, template, todo or milestone id
        id: String,

        /// Occurrence start of a repeating task (YYYY-MM-DD HH:MM)
        #[arg(long)]
        at: Option<String>,
    },
    /// Add a project milestone
    Milestone {
        project: String,

        title: String,

        /// YYYY-MM-DD
        #[arg(long)]
        deadline: Option<String>,
    },
    /// Show or change the configuration
    Config {
        /// Default user
        #[arg(long)]
        set_user: Option<String>,

        /// Calendar time zone (IANA name)
        #[arg(long)]
        timezone: Option<String>,

        /// Where tasks and todos are stored
        #[arg(long)]
        data_dir: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let config = CoachcalConfig::load()?;
    let user = cli.user.unwrap_or_else(|| config.user());
    // Opened per command so `config` works even when the calendar can't open.
    let planner = || open_planner(&config);

    match cli.command {
        Commands::Events {
            view,
            date,
            from,
            to,
            project,
            json,
        } => commands::events::run(
            &planner()?,
            &user,
            commands::events::Window {
                view,
                date,
                from,
                to,
            },
            project,
            json,
        ),
        Commands::Todos { project, json } => {
            commands::todos::run(&planner()?, &user, project.as_deref(), json)
        }
        Commands::Todo {
            title,
            deadline,
            description,
            assign,
            project,
        } => commands::todo::run(&planner()?, &user, title, deadline, description, assign, project),
        Commands::Task {
            title,
            start,
            end,
            duration,
            repeat,
            until,
            description,
            assign,
            project,
        } => commands::task::run(
            &planner()?,
            &user,
            commands::task::TaskArgs {
                title,
                start,
                end,
                duration,
                repeat,
                until,
                description,
                assign,
                project,
            },
        ),
        Commands::Convert { todo, slot, end } => commands::convert::run(&planner()?, &todo, &slot, end),
        Commands::EditOccurrence {
            id,
            at,
            title,
            description,
            start,
            end,
            assign,
        } => commands::edit_occurrence::run(
            &planner()?,
            &id,
            at.as_deref(),
            commands::edit_occurrence::Edits {
                title,
                description,
                start,
                end,
                assign,
            },
        ),
        Commands::Edit {
            id,
            title,
            description,
            start,
            end,
            assign,
            project,
            repeat,
            until,
        } => commands::edit::run(
            &planner()?,
            &id,
            commands::edit::SeriesEdits {
                title,
                description,
                start,
                end,
                assign,
                project,
                repeat,
                until,
            },
        ),
        Commands::Delete { id, with_instances } => {
            commands::delete::run(&planner()?, &id, with_instances)
        }
        Commands::Complete { id, at } => commands::complete::run(&planner()?, &id, at.as_deref()),
        Commands::Milestone {
            project,
            title,
            deadline,
        } => commands::milestone::run(&planner()?, &project, &title, deadline),
        Commands::Config {
            set_user,
            timezone,
            data_dir,
        } => commands::config::run(
            config.clone(),
            commands::config::ConfigChanges {
                user: set_user,
                timezone,
                data_dir,
            },
        ),
    }
}

fn open_planner(config: &CoachcalConfig) -> Result<Planner<FileStore>> {
    let planner = config.planner()?;
    tracing::debug!(
        data_dir = %config.data_path().display(),
        tz = %planner.tz(),
        "opened calendar"
    );
    Ok(planner)
}
