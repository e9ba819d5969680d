use chrono::{Local, NaiveDateTime};
use parking_lot::Mutex;
use ratatui::widgets::TableState;
use tasuke_core::{Config, InputStatus, SnapshotListener, Task, TaskDto, TaskRepository, Tasuke, UiEvent};

const ALL_TASKS_TITLE: &str = "all tasks";

/// Holds the most recent snapshot pushed by the store until the UI picks it up.
#[derive(Default)]
pub struct SnapshotBuffer {
    latest: Mutex<Option<Vec<TaskDto>>>,
}

impl SnapshotBuffer {
    pub fn take(&self) -> Option<Vec<TaskDto>> {
        self.latest.lock().take()
    }
}

impl SnapshotListener for SnapshotBuffer {
    fn on_snapshot(&self, tasks: &[TaskDto]) {
        *self.latest.lock() = Some(tasks.to_vec());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Help,
    About,
    Settings,
}

pub struct App<R: TaskRepository> {
    pub controller: Tasuke<R>,
    pub config: Config,
    pub title: String,
    pub tasks: Vec<TaskDto>,
    pub state: TableState,
    pub input: String,
    pub cursor_position: usize,
    pub status: Option<(InputStatus, String)>,
    pub panel: Option<Panel>,
    pub hidden: bool,
    pub should_quit: bool,
    reminded: Option<Task>,
}

impl<R: TaskRepository> App<R> {
    pub fn new(controller: Tasuke<R>, config: Config) -> Self {
        let tasks = controller.store().snapshot(Local::now().naive_local());
        let mut state = TableState::default();
        if !tasks.is_empty() {
            state.select(Some(0));
        }
        Self {
            controller,
            config,
            title: ALL_TASKS_TITLE.to_string(),
            tasks,
            state,
            input: String::new(),
            cursor_position: 0,
            status: None,
            panel: None,
            hidden: false,
            should_quit: false,
            reminded: None,
        }
    }

    pub fn next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.tasks.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.byte_index(self.cursor_position);
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index = self.byte_index(self.cursor_position - 1);
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    /// Esc: closes an open panel first, then clears the input line.
    pub fn escape(&mut self) {
        if self.panel.take().is_none() {
            self.input.clear();
            self.cursor_position = 0;
        }
    }

    pub fn submit_command(&mut self) {
        let line = self.input.trim().to_string();
        self.input.clear();
        self.cursor_position = 0;
        if line.is_empty() {
            return;
        }
        self.submit_at(&line, Local::now().naive_local());
    }

    fn submit_at(&mut self, line: &str, now: NaiveDateTime) {
        let outcome = self.controller.run_command_at(line, now);
        self.status = (!outcome.message.is_empty()).then(|| (outcome.status, outcome.message));
        // a successful change always brings the full list back
        if outcome.status == InputStatus::Success {
            self.title = ALL_TASKS_TITLE.to_string();
            self.hidden = false;
        }

        match outcome.event {
            Some(UiEvent::ShowTasks { title, tasks }) => {
                self.title = title;
                self.set_tasks(tasks);
                self.hidden = false;
            }
            Some(UiEvent::Hide) => self.hidden = true,
            Some(UiEvent::Help) => self.panel = Some(Panel::Help),
            Some(UiEvent::About) => self.panel = Some(Panel::About),
            Some(UiEvent::Settings) => self.panel = Some(Panel::Settings),
            Some(UiEvent::Exit) => self.should_quit = true,
            None => {}
        }
    }

    /// Picks up a pushed snapshot when the full list is on screen.
    pub fn sync(&mut self, pushed: Option<Vec<TaskDto>>) {
        if let Some(tasks) = pushed {
            if self.title == ALL_TASKS_TITLE {
                self.set_tasks(tasks);
            }
        }
    }

    /// Shows the reminder once per upcoming task.
    pub fn check_reminder(&mut self, now: NaiveDateTime) {
        let Some(reminder) = self.controller.upcoming_reminder(now, self.config.reminder_minutes) else {
            return;
        };
        if self.reminded.as_ref() == Some(&reminder.task) {
            return;
        }
        log::info!("event=reminder_shown status=ok");
        self.status = Some((InputStatus::Normal, reminder.message));
        self.reminded = Some(reminder.task);
    }

    fn set_tasks(&mut self, tasks: Vec<TaskDto>) {
        self.tasks = tasks;
        let selected = match self.state.selected() {
            _ if self.tasks.is_empty() => None,
            Some(i) => Some(i.min(self.tasks.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input.chars().take(chars).map(char::len_utf8).sum()
    }
}
