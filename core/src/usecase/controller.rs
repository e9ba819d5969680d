use chrono::{Duration, Local, NaiveDateTime};

use crate::interpreter::{Action, Interpreter};
use crate::model::task::Task;
use crate::repository::TaskRepository;
use crate::service::dto::{snapshot_of, TaskDto};
use crate::service::task_store::TaskStore;
use crate::usecase::history::{CommandHistory, Replay};

/// How the input line should be decorated after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputStatus {
    Success,
    Failure,
    Normal,
}

/// Requests for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowTasks { title: String, tasks: Vec<TaskDto> },
    Hide,
    Help,
    About,
    Settings,
    Exit,
}

/// The answer to one line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub status: InputStatus,
    pub message: String,
    pub event: Option<UiEvent>,
}

impl Outcome {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: InputStatus::Success,
            message: message.into(),
            event: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            status: InputStatus::Failure,
            message: message.into(),
            event: None,
        }
    }

    fn normal(message: impl Into<String>, event: Option<UiEvent>) -> Self {
        Self {
            status: InputStatus::Normal,
            message: message.into(),
            event,
        }
    }
}

/// A task about to begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub task: Task,
    pub message: String,
}

/// Owns the store, the undo history and the interpreter, and runs input
/// lines against them one at a time.
pub struct Tasuke<R: TaskRepository> {
    store: TaskStore<R>,
    history: CommandHistory,
    interpreter: Interpreter,
}

impl<R: TaskRepository> Tasuke<R> {
    pub fn new(store: TaskStore<R>, interpreter: Interpreter) -> Self {
        Self {
            store,
            history: CommandHistory::new(),
            interpreter,
        }
    }

    pub fn store(&self) -> &TaskStore<R> {
        &self.store
    }

    pub fn run_command(&mut self, text: &str) -> Outcome {
        self.run_command_at(text, Local::now().naive_local())
    }

    /// Interprets and executes one line as of `now`.
    pub fn run_command_at(&mut self, text: &str, now: NaiveDateTime) -> Outcome {
        let action = match self.interpreter.interpret(text, &self.store, now) {
            Ok(action) => action,
            Err(e) => {
                log::info!("event=command_parse status=rejected");
                return Outcome::failure(e.to_string());
            }
        };

        match action {
            Action::Execute(command) => {
                let kind = command.kind();
                let summary = command.summary();
                match self.history.execute(command, &self.store) {
                    Ok(()) => {
                        log::info!("event=command_run kind={kind} status=ok");
                        Outcome::success(summary)
                    }
                    Err(e) => {
                        log::error!("event=command_run kind={kind} status=failed");
                        Outcome::failure(e.to_string())
                    }
                }
            }
            Action::Undo => match self.history.undo(&self.store) {
                Ok(Replay::Applied(command)) => {
                    log::info!("event=command_undo kind={} status=ok", command.kind());
                    Outcome::success(format!("Undid {}.", command.kind()))
                }
                Ok(Replay::Nothing) => Outcome::normal("Nothing to undo", None),
                Err(e) => {
                    log::error!("event=command_undo status=failed");
                    Outcome::failure(e.to_string())
                }
            },
            Action::Redo => match self.history.redo(&self.store) {
                Ok(Replay::Applied(command)) => {
                    log::info!("event=command_redo kind={} status=ok", command.kind());
                    Outcome::success(format!("Redid {}.", command.kind()))
                }
                Ok(Replay::Nothing) => Outcome::normal("Nothing to redo", None),
                Err(e) => {
                    log::error!("event=command_redo status=failed");
                    Outcome::failure(e.to_string())
                }
            },
            Action::Show(filter) => {
                let entries = self.store.find(|task| filter.matches(task, now));
                let title = filter.title();
                let message = format!("Showing {} ({}).", title, entries.len());
                Outcome::normal(
                    message,
                    Some(UiEvent::ShowTasks {
                        title,
                        tasks: snapshot_of(&entries, now),
                    }),
                )
            }
            Action::Hide => Outcome::normal("", Some(UiEvent::Hide)),
            Action::Help => Outcome::normal("", Some(UiEvent::Help)),
            Action::About => Outcome::normal("", Some(UiEvent::About)),
            Action::Settings => Outcome::normal("", Some(UiEvent::Settings)),
            Action::Exit => Outcome::normal("", Some(UiEvent::Exit)),
        }
    }

    /// A reminder when the next not-done task begins within `lead_minutes`.
    pub fn upcoming_reminder(&self, now: NaiveDateTime, lead_minutes: i64) -> Option<Reminder> {
        let next = self.store.next_upcoming_task(now).ok()?;
        let left = next.begin? - now;
        if left > Duration::minutes(lead_minutes) {
            return None;
        }
        // whole minutes, rounded up so a task 30 seconds away is not "0 minutes"
        let minutes = (left.num_seconds() + 59) / 60;
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        let message = format!("Next task: {} begins in {minutes} {unit}.", next.description);
        Some(Reminder { task: next, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Task;
    use crate::repository::MemoryTaskRepository;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn tasuke() -> Tasuke<MemoryTaskRepository> {
        let store = TaskStore::open(MemoryTaskRepository::new()).unwrap();
        Tasuke::new(store, Interpreter::default())
    }

    #[test]
    fn test_run_and_undo_messages() {
        let mut app = tasuke();
        let outcome = app.run_command_at("add buy milk", now());
        assert_eq!(outcome.status, InputStatus::Success);
        assert_eq!(outcome.message, "Added \"buy milk\".");

        let outcome = app.run_command_at("undo", now());
        assert_eq!(outcome.status, InputStatus::Success);
        assert_eq!(app.store().total_tasks(), 0);

        let outcome = app.run_command_at("undo", now());
        assert_eq!(outcome.status, InputStatus::Normal);
        assert_eq!(outcome.message, "Nothing to undo");
    }

    #[test]
    fn test_parse_error_is_a_failure_outcome() {
        let mut app = tasuke();
        let outcome = app.run_command_at("remove", now());
        assert_eq!(outcome.status, InputStatus::Failure);
        assert_eq!(outcome.message, "You need to tell me which task(s) to remove.");
        assert_eq!(outcome.event, None);
    }

    #[test]
    fn test_storage_failure_is_reported() {
        let mut app = tasuke();
        app.store().repository().set_fail_writes(true);
        let outcome = app.run_command_at("add x", now());
        assert_eq!(outcome.status, InputStatus::Failure);
        assert!(outcome.message.starts_with("Could not save tasks"));
        assert_eq!(app.store().total_tasks(), 0);
    }

    #[test]
    fn test_show_keeps_store_ids() {
        let mut app = tasuke();
        app.run_command_at("add apples #fruit", now());
        app.run_command_at("add bread", now());
        app.run_command_at("add cherries #fruit", now());

        let outcome = app.run_command_at("show #fruit", now());
        let Some(UiEvent::ShowTasks { title, tasks }) = outcome.event else {
            panic!("expected a task list");
        };
        assert_eq!(title, "tasks tagged #fruit");
        assert_eq!(tasks.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_window_events() {
        let mut app = tasuke();
        assert_eq!(app.run_command_at("help", now()).event, Some(UiEvent::Help));
        assert_eq!(app.run_command_at("exit", now()).event, Some(UiEvent::Exit));
        assert_eq!(app.run_command_at("hide", now()).event, Some(UiEvent::Hide));
    }

    #[test]
    fn test_upcoming_reminder() {
        let mut app = tasuke();
        assert_eq!(app.upcoming_reminder(now(), 10), None);

        let mut meeting = Task::new("standup");
        meeting.begin = Some(now() + Duration::minutes(8));
        meeting.end = Some(now() + Duration::minutes(20));
        app.store().add_task(meeting).unwrap();
        let reminder = app.upcoming_reminder(now(), 10).unwrap();
        assert_eq!(reminder.task.description, "standup");
        assert_eq!(reminder.message, "Next task: standup begins in 8 minutes.");
        assert_eq!(
            app.upcoming_reminder(now(), 30).map(|r| r.message).as_deref(),
            Some("Next task: standup begins in 8 minutes.")
        );
        assert_eq!(
            app.upcoming_reminder(now() + Duration::seconds(7 * 60 + 30), 10)
                .map(|r| r.message)
                .as_deref(),
            Some("Next task: standup begins in 1 minute.")
        );
        assert_eq!(app.upcoming_reminder(now() - Duration::hours(1), 10), None);

        app.run_command_at("done 1", now());
        assert_eq!(app.upcoming_reminder(now(), 10), None);
    }
}
