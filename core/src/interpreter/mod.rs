//! Turns a line of user text into an [`Action`].
//!
//! Interpretation only reads the store (for id resolution and to capture the
//! tasks a command will act on); it never changes it.

pub mod ids;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ParseError;
use crate::input::{self, split_body, Body, TagToken};
use crate::model::task::Task;
use crate::repository::TaskRepository;
use crate::service::task_store::TaskStore;
use crate::time::{extract_period, parse_day, TimePeriod};
use crate::usecase::command::{Command, EditTarget, Target};

use self::ids::{resolve_ids, IdContext};

/// The id list that opens an `edit` argument; dashes may be spaced as in `remove`.
static EDIT_IDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\w+(?:(?:\s*-\s*|,\s*)\w+)*").unwrap_or_else(|e| panic!("invalid edit id pattern: {e}"))
});

/// Which tasks a `show` request lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShowFilter {
    All,
    Done,
    Undone,
    Ongoing,
    Overdue,
    Today,
    Tomorrow,
    Tag(String),
    DueOn(NaiveDate),
    Description(String),
}

impl ShowFilter {
    fn parse(argument: &str, now: NaiveDateTime) -> Result<Self, ParseError> {
        let argument = argument.trim_start_matches(input::DELIMITER_AT).trim();
        let filter = match argument.to_lowercase().as_str() {
            "" | "all" | "everything" => ShowFilter::All,
            "done" => ShowFilter::Done,
            "undone" => ShowFilter::Undone,
            "ongoing" => ShowFilter::Ongoing,
            "overdue" => ShowFilter::Overdue,
            "today" => ShowFilter::Today,
            "tomorrow" => ShowFilter::Tomorrow,
            _ => {
                if let Some(tag) = argument.strip_prefix(input::DELIMITER_HASH) {
                    if tag.is_empty() {
                        return Err(ParseError::TagNoName);
                    }
                    ShowFilter::Tag(tag.to_string())
                } else if let Ok(date) = parse_day(argument, now) {
                    ShowFilter::DueOn(date)
                } else {
                    ShowFilter::Description(argument.to_string())
                }
            }
        };
        Ok(filter)
    }

    pub fn title(&self) -> String {
        match self {
            ShowFilter::All => "all tasks".to_string(),
            ShowFilter::Done => "done tasks".to_string(),
            ShowFilter::Undone => "undone tasks".to_string(),
            ShowFilter::Ongoing => "ongoing tasks".to_string(),
            ShowFilter::Overdue => "overdue tasks".to_string(),
            ShowFilter::Today => "tasks due today".to_string(),
            ShowFilter::Tomorrow => "tasks due tomorrow".to_string(),
            ShowFilter::Tag(tag) => format!("tasks tagged #{tag}"),
            ShowFilter::DueOn(date) => format!("tasks due on {}", date.format("%d/%m/%Y")),
            ShowFilter::Description(text) => format!("tasks containing \"{text}\""),
        }
    }

    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        match self {
            ShowFilter::All => true,
            ShowFilter::Done => task.done,
            ShowFilter::Undone => !task.done,
            ShowFilter::Ongoing => task.is_ongoing_at(now),
            ShowFilter::Overdue => task.is_overdue_at(now),
            ShowFilter::Today => task.is_due_today_at(now),
            ShowFilter::Tomorrow => task.is_due_tomorrow_at(now),
            ShowFilter::Tag(tag) => {
                let tag = tag.to_lowercase();
                task.tags().any(|t| t.to_lowercase() == tag)
            }
            ShowFilter::DueOn(date) => task.is_due_on(*date, now),
            ShowFilter::Description(text) => task
                .description
                .to_lowercase()
                .contains(&text.to_lowercase()),
        }
    }
}

/// The result of interpreting one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Execute(Command),
    Undo,
    Redo,
    Show(ShowFilter),
    Hide,
    Help,
    About,
    Settings,
    Exit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Interpreter {
    implicit_add: bool,
}

impl Interpreter {
    /// With `implicit_add`, a line that starts with no known command is added
    /// as a task instead of being rejected.
    pub fn new(implicit_add: bool) -> Self {
        Self { implicit_add }
    }

    pub fn interpret<R: TaskRepository>(
        &self,
        text: &str,
        store: &TaskStore<R>,
        now: NaiveDateTime,
    ) -> Result<Action, ParseError> {
        let normalized = input::normalize(text);
        let argument = normalized.argument.as_str();

        let action = match normalized.keyword.as_str() {
            input::COMMAND_ADD => Action::Execute(parse_add(argument, now)?),
            input::COMMAND_EDIT => Action::Execute(parse_edit(argument, store, now)?),
            input::COMMAND_REMOVE => Action::Execute(parse_remove(argument, store)?),
            input::COMMAND_DONE => Action::Execute(parse_done(argument, store, true)?),
            input::COMMAND_UNDONE => Action::Execute(parse_done(argument, store, false)?),
            input::COMMAND_CLEAR => Action::Execute(Command::Clear {
                tasks: store.get_tasks(),
            }),
            input::COMMAND_SHOW => Action::Show(ShowFilter::parse(argument, now)?),
            input::COMMAND_UNDO => Action::Undo,
            input::COMMAND_REDO => Action::Redo,
            input::COMMAND_HIDE => Action::Hide,
            input::COMMAND_HELP => Action::Help,
            input::COMMAND_ABOUT => Action::About,
            input::COMMAND_SETTINGS => Action::Settings,
            input::COMMAND_EXIT => Action::Exit,
            _ if self.implicit_add && !normalized.text.is_empty() => {
                Action::Execute(parse_add(&normalized.text, now)?)
            }
            _ => return Err(ParseError::BadCommand(normalized.text)),
        };
        Ok(action)
    }
}

fn id_context<R: TaskRepository>(store: &TaskStore<R>) -> IdContext {
    IdContext {
        total: store.total_tasks(),
        last: store.last_added_position(),
    }
}

/// Captures the tasks behind `ids` as they are right now.
fn capture<R: TaskRepository>(ids: &[usize], store: &TaskStore<R>) -> Result<Vec<Target>, ParseError> {
    let total = store.total_tasks();
    ids.iter()
        .map(|&id| {
            let position = id - 1;
            store
                .get_task(position)
                .map(|task| Target { position, task })
                .ok_or(ParseError::IdOutOfRange(id, total))
        })
        .collect()
}

fn parse_add(argument: &str, now: NaiveDateTime) -> Result<Command, ParseError> {
    let body = split_body(argument)?;
    if body.clear_dates {
        return Err(ParseError::EditOnly("-@".to_string()));
    }
    if body.description.is_empty() {
        return Err(ParseError::AddEmpty);
    }

    let mut task = Task::new(body.description);
    for tag in body.tags {
        match tag {
            TagToken::Add(name) => task.add_tag(name)?,
            TagToken::Remove(name) => return Err(ParseError::EditOnly(format!("#-{name}"))),
            TagToken::ClearAll => return Err(ParseError::EditOnly("-#".to_string())),
        }
    }
    if let Some(period) = extract_period(&body.temporal, now)? {
        task.begin = period.begin;
        task.end = period.end;
    }
    Ok(Command::Add { task })
}

fn parse_edit<R: TaskRepository>(
    argument: &str,
    store: &TaskStore<R>,
    now: NaiveDateTime,
) -> Result<Command, ParseError> {
    let Some(found) = EDIT_IDS.find(argument) else {
        return Err(ParseError::EditNoId);
    };
    let id_text = found.as_str();
    let rest = argument[found.end()..].trim();
    let ids = resolve_ids(id_text, id_context(store))?;

    let body = split_body(rest)?;
    if body.is_empty() {
        return Err(ParseError::EditEmpty);
    }
    let period = extract_period(&body.temporal, now)?;

    let targets = capture(&ids, store)?
        .into_iter()
        .map(|Target { position, task }| {
            let after = apply_edit(&task, &body, period)?;
            Ok(EditTarget {
                position,
                before: task,
                after,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(Command::Edit { targets })
}

fn apply_edit(task: &Task, body: &Body, period: Option<TimePeriod>) -> Result<Task, ParseError> {
    let mut edited = task.clone();
    if !body.description.is_empty() {
        edited.description = body.description.clone();
    }
    if body.clear_dates {
        edited.begin = None;
        edited.end = None;
    }
    if let Some(period) = period {
        edited.begin = period.begin;
        edited.end = period.end;
    }
    // removals first so a full tag set can still take the new tags
    for tag in &body.tags {
        match tag {
            TagToken::Remove(name) => {
                edited.remove_tag(name);
            }
            TagToken::ClearAll => edited.clear_tags(),
            TagToken::Add(_) => {}
        }
    }
    for tag in &body.tags {
        if let TagToken::Add(name) = tag {
            edited.add_tag(name.clone())?;
        }
    }
    Ok(edited)
}

fn parse_remove<R: TaskRepository>(argument: &str, store: &TaskStore<R>) -> Result<Command, ParseError> {
    if argument.is_empty() {
        return Err(ParseError::RemoveNoId);
    }
    let ids = resolve_ids(argument, id_context(store))?;
    Ok(Command::Remove {
        targets: capture(&ids, store)?,
    })
}

fn parse_done<R: TaskRepository>(argument: &str, store: &TaskStore<R>, done: bool) -> Result<Command, ParseError> {
    if argument.is_empty() {
        return Err(if done {
            ParseError::DoneNoId
        } else {
            ParseError::UndoneNoId
        });
    }
    let ids = resolve_ids(argument, id_context(store))?;
    Ok(Command::Done {
        targets: capture(&ids, store)?,
        done,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryTaskRepository;
    use chrono::NaiveDate;

    // Monday
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap().and_hms_opt(12, 0, 0).unwrap()
    }

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap().and_hms_opt(h, m, s).unwrap()
    }

    fn store_with(descriptions: &[&str]) -> TaskStore<MemoryTaskRepository> {
        let tasks = descriptions.iter().map(|d| Task::new(*d)).collect();
        TaskStore::open(MemoryTaskRepository::with_tasks(tasks)).unwrap()
    }

    fn interpret(text: &str, store: &TaskStore<MemoryTaskRepository>) -> Result<Action, ParseError> {
        Interpreter::default().interpret(text, store, now())
    }

    fn added(text: &str) -> Task {
        match interpret(text, &store_with(&[])) {
            Ok(Action::Execute(Command::Add { task })) => task,
            other => panic!("expected an add, got {other:?}"),
        }
    }

    #[test]
    fn test_add_with_period_and_tag() {
        let task = added("add buy milk @2pm-3pm #shopping");
        assert_eq!(task.description, "buy milk");
        assert_eq!(task.begin, Some(at(19, 14, 0, 0)));
        assert_eq!(task.end, Some(at(19, 15, 0, 0)));
        assert!(task.has_tag("shopping"));
    }

    #[test]
    fn test_add_with_connector_words() {
        let task = added("do essay by fri");
        assert_eq!(task.description, "essay");
        assert_eq!(task.begin, None);
        assert_eq!(task.end, Some(at(23, 23, 59, 59)));

        let task = added("add class from 2pm to 3pm");
        assert_eq!(task.begin, Some(at(19, 14, 0, 0)));
        assert_eq!(task.end, Some(at(19, 15, 0, 0)));
    }

    #[test]
    fn test_add_errors() {
        let store = store_with(&[]);
        assert_eq!(interpret("add", &store), Err(ParseError::AddEmpty));
        assert_eq!(interpret("add @ 2pm #x", &store), Err(ParseError::AddEmpty));
        assert_eq!(interpret("add a #-b", &store), Err(ParseError::EditOnly("#-b".to_string())));
        assert_eq!(interpret("add a -@", &store), Err(ParseError::EditOnly("-@".to_string())));
        assert_eq!(interpret("add a #", &store), Err(ParseError::TagNoName));
        assert_eq!(
            interpret("add a #1 #2 #3 #4 #5 #6 #7 #8 #9 #10 #11", &store),
            Err(ParseError::TooManyTags)
        );
        assert!(interpret("add a #1 #1 #1", &store).is_ok());
    }

    #[test]
    fn test_bad_command() {
        let store = store_with(&["a"]);
        assert_eq!(
            interpret("bad command blah blah", &store),
            Err(ParseError::BadCommand("bad command blah blah".to_string()))
        );
    }

    #[test]
    fn test_implicit_add() {
        let store = store_with(&[]);
        let action = Interpreter::new(true).interpret("buy eggs", &store, now()).unwrap();
        assert_eq!(
            action,
            Action::Execute(Command::Add {
                task: Task::new("buy eggs")
            })
        );
    }

    #[test]
    fn test_edit_replaces_fields() {
        let store = store_with(&["buy eggs", "do homework", "watch anime"]);
        let action = interpret("edit 2 buy milk @ 2pm - 3pm #shopping", &store).unwrap();
        let Action::Execute(Command::Edit { targets }) = action else {
            panic!("expected an edit");
        };
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].position, 1);
        assert_eq!(targets[0].before, Task::new("do homework"));
        let after = &targets[0].after;
        assert_eq!(after.description, "buy milk");
        assert_eq!(after.begin, Some(at(19, 14, 0, 0)));
        assert_eq!(after.end, Some(at(19, 15, 0, 0)));
        assert!(after.has_tag("shopping"));
    }

    #[test]
    fn test_edit_tags_and_dates_only() {
        let mut dated = Task::new("report");
        dated.end = Some(at(20, 9, 0, 0));
        dated.add_tag("old").unwrap();
        dated.add_tag("keep").unwrap();
        let store = TaskStore::open(MemoryTaskRepository::with_tasks(vec![dated])).unwrap();

        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1 #-old #new -@", &store) else {
            panic!("expected an edit");
        };
        let after = &targets[0].after;
        assert_eq!(after.description, "report");
        assert_eq!(after.end, None);
        assert_eq!(after.tags().collect::<Vec<_>>(), vec!["keep", "new"]);

        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1 -#", &store) else {
            panic!("expected an edit");
        };
        assert_eq!(targets[0].after.tag_count(), 0);
    }

    #[test]
    fn test_edit_errors() {
        let store = store_with(&["a", "b"]);
        assert_eq!(interpret("edit", &store), Err(ParseError::EditNoId));
        assert_eq!(interpret("edit 1", &store), Err(ParseError::EditEmpty));
        assert_eq!(interpret("edit 3 x", &store), Err(ParseError::IdOutOfRange(3, 2)));
        assert_eq!(interpret("edit x y", &store), Err(ParseError::NotANumber("x".to_string())));
        assert_eq!(interpret("edit last x", &store), Err(ParseError::NoLast));
    }

    #[test]
    fn test_edit_accepts_ranges() {
        let store = store_with(&["a", "b", "c"]);
        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1-2 #x", &store) else {
            panic!("expected an edit");
        };
        assert_eq!(targets.iter().map(|t| t.position).collect::<Vec<_>>(), vec![0, 1]);

        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1 - 2 #x", &store) else {
            panic!("expected an edit");
        };
        assert_eq!(targets.iter().map(|t| t.position).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(targets[0].after.description, "a");
        assert!(targets[1].after.has_tag("x"));

        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1,3 #x", &store) else {
            panic!("expected an edit");
        };
        assert_eq!(targets.iter().map(|t| t.position).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_edit_removes_tags_before_adding() {
        let mut full = Task::new("tagged");
        for name in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"] {
            full.add_tag(name).unwrap();
        }
        let store = TaskStore::open(MemoryTaskRepository::with_tasks(vec![full])).unwrap();

        let Ok(Action::Execute(Command::Edit { targets })) = interpret("edit 1 #k #-a", &store) else {
            panic!("expected an edit");
        };
        let after = &targets[0].after;
        assert!(after.has_tag("k"));
        assert!(!after.has_tag("a"));
        assert_eq!(after.tag_count(), 10);

        assert_eq!(interpret("edit 1 #k #l #-a", &store), Err(ParseError::TooManyTags));
    }

    #[test]
    fn test_remove_and_done_capture_targets() {
        let store = store_with(&["a", "b", "c", "d", "e", "f"]);
        let Ok(Action::Execute(Command::Remove { targets })) = interpret("rm 2,4-6", &store) else {
            panic!("expected a remove");
        };
        let names: Vec<_> = targets.iter().map(|t| t.task.description.as_str()).collect();
        assert_eq!(names, vec!["b", "d", "e", "f"]);

        let Ok(Action::Execute(Command::Done { targets, done })) = interpret("done all", &store) else {
            panic!("expected a done");
        };
        assert!(done);
        assert_eq!(targets.len(), 6);

        assert_eq!(interpret("remove", &store), Err(ParseError::RemoveNoId));
        assert_eq!(interpret("done", &store), Err(ParseError::DoneNoId));
        assert_eq!(interpret("undone", &store), Err(ParseError::UndoneNoId));
        assert_eq!(interpret("remove 5-2", &store), Err(ParseError::InvalidRange(5, 2)));
    }

    #[test]
    fn test_show_filters() {
        let store = store_with(&[]);
        let show = |text: &str| match interpret(text, &store) {
            Ok(Action::Show(filter)) => filter,
            other => panic!("expected a show, got {other:?}"),
        };
        assert_eq!(show("show"), ShowFilter::All);
        assert_eq!(show("ls everything"), ShowFilter::All);
        assert_eq!(show("show done"), ShowFilter::Done);
        assert_eq!(show("show overdue"), ShowFilter::Overdue);
        assert_eq!(show("show TODAY"), ShowFilter::Today);
        assert_eq!(show("show #work"), ShowFilter::Tag("work".to_string()));
        assert_eq!(show("show on fri"), ShowFilter::DueOn(NaiveDate::from_ymd_opt(2026, 10, 23).unwrap()));
        assert_eq!(show("show 25/12"), ShowFilter::DueOn(NaiveDate::from_ymd_opt(2026, 12, 25).unwrap()));
        assert_eq!(show("search milk"), ShowFilter::Description("milk".to_string()));
        assert_eq!(interpret("show #", &store), Err(ParseError::TagNoName));
    }

    #[test]
    fn test_show_filter_matching() {
        let mut late = Task::new("Buy Milk");
        late.end = Some(at(19, 9, 0, 0));
        late.add_tag("Home").unwrap();
        assert!(ShowFilter::Overdue.matches(&late, now()));
        assert!(ShowFilter::Today.matches(&late, now()));
        assert!(ShowFilter::Undone.matches(&late, now()));
        assert!(!ShowFilter::Done.matches(&late, now()));
        assert!(ShowFilter::Tag("home".to_string()).matches(&late, now()));
        assert!(ShowFilter::Description("milk".to_string()).matches(&late, now()));
        assert_eq!(ShowFilter::Today.title(), "tasks due today");
    }

    #[test]
    fn test_argument_free_commands() {
        let store = store_with(&[]);
        assert_eq!(interpret("undo", &store), Ok(Action::Undo));
        assert_eq!(interpret("redo please", &store), Ok(Action::Redo));
        assert_eq!(interpret("hide", &store), Ok(Action::Hide));
        assert_eq!(interpret("help", &store), Ok(Action::Help));
        assert_eq!(interpret("about", &store), Ok(Action::About));
        assert_eq!(interpret("settings", &store), Ok(Action::Settings));
        assert_eq!(interpret("quit", &store), Ok(Action::Exit));
        assert_eq!(interpret("clear", &store), Ok(Action::Execute(Command::Clear { tasks: vec![] })));
    }
}
