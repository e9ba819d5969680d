use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use tasuke_core::TaskDto;

const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: usize,
    #[tabled(rename = "St")]
    status: &'static str,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

/// Short status marker: done, overdue, ongoing or nothing.
pub fn status_marker(task: &TaskDto) -> &'static str {
    if task.done {
        "✔"
    } else if task.is_overdue {
        "!"
    } else if task.is_ongoing {
        "▶"
    } else {
        ""
    }
}

/// `"from A to B"`, `"by B"` or an empty string for floating tasks.
pub fn format_when(task: &TaskDto) -> String {
    match (task.begin, task.end) {
        (Some(begin), Some(end)) => format!(
            "{} - {}",
            begin.format(DATE_TIME_FORMAT),
            end.format(DATE_TIME_FORMAT)
        ),
        (None, Some(end)) => format!("by {}", end.format(DATE_TIME_FORMAT)),
        (Some(begin), None) => format!("from {}", begin.format(DATE_TIME_FORMAT)),
        (None, None) => String::new(),
    }
}

pub fn format_tags(task: &TaskDto) -> String {
    task.tags
        .iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn render(tasks: &[TaskDto]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }
    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| TaskRow {
            id: task.id,
            status: status_marker(task),
            description: task.description.clone(),
            when: format_when(task),
            tags: format_tags(task),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}
