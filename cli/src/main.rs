mod logging;
mod table;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Local;
use clap::Parser;
use tasuke_core::config::{self, Config};
use tasuke_core::{FileTaskRepository, InputStatus, Interpreter, TaskStore, Tasuke, UiEvent};

use crate::tui::app::SnapshotBuffer;

#[derive(Parser)]
#[command(name = "tasuke")]
#[command(about = "A task manager that understands plain sentences", long_about = None)]
struct Cli {
    /// Where tasks, settings and logs live (defaults to ~/.tasuke)
    #[arg(long, env = "TASUKE_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Overrides the log level from the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run one command line, e.g. `run add buy milk @ 2pm #shopping`
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        words: Vec<String>,
    },
    /// List all tasks
    List,
    /// Open the Terminal User Interface
    Tui,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let data_dir = config::resolve_data_dir(cli.data_dir)?;
    let config = Config::load(&data_dir)?;

    let level = cli.log_level.unwrap_or_else(|| config.log_level.clone());
    let _logger = match logging::init_logging(&level, &config::log_dir(&data_dir)) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {e:#}");
            None
        }
    };

    let repo = FileTaskRepository::new(&data_dir, &config.tasks_file)?;
    let snapshots = Arc::new(SnapshotBuffer::default());
    let store = TaskStore::open(repo)?.with_listener(snapshots.clone());
    let mut app = Tasuke::new(store, Interpreter::new(config.implicit_add));

    match cli.command {
        Some(Commands::Run { words }) => {
            let outcome = app.run_command(&words.join(" "));
            if outcome.status == InputStatus::Failure {
                bail!(outcome.message);
            }
            if !outcome.message.is_empty() {
                println!("{}", outcome.message);
            }
            match outcome.event {
                Some(UiEvent::ShowTasks { tasks, .. }) => println!("{}", table::render(&tasks)),
                Some(UiEvent::Help) => println!("{}", tui::ui::HELP_TEXT),
                Some(UiEvent::About) => println!("{}", tui::ui::about_text()),
                _ if outcome.status == InputStatus::Success => {
                    let now = Local::now().naive_local();
                    println!("{}", table::render(&app.store().snapshot(now)));
                }
                _ => {}
            }
        }
        Some(Commands::List) => {
            let now = Local::now().naive_local();
            println!("{}", table::render(&app.store().snapshot(now)));
        }
        Some(Commands::Tui) | None => {
            tui::run(app, snapshots, config)?;
        }
    }
    Ok(())
}
