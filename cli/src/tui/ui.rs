use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Row, Table, Wrap},
    Frame,
};
use tasuke_core::{InputStatus, TaskDto, TaskRepository};
use unicode_width::UnicodeWidthChar;

use crate::table::{format_tags, format_when, status_marker};
use crate::tui::app::{App, Panel};

const DESCRIPTION_WIDTH: usize = 40;

pub const HELP_TEXT: &str = "\
add <description> [@ <time or period>] [#tag ...]
    add buy milk @ 2pm - 3pm #shopping
    do essay by fri
edit <id> [description] [@ <time>] [#tag] [#-tag] [-@] [-#]
remove <ids>          e.g. remove 2,4-6 / rm last
done <ids> / undone <ids>
show [done|undone|ongoing|overdue|today|tomorrow|#tag|<date>|<text>]
undo / redo / clear / hide / help / about / settings / exit";

pub fn about_text() -> String {
    format!(
        "Tasuke {}\nA task manager that understands plain sentences.",
        env!("CARGO_PKG_VERSION")
    )
}

pub fn draw<R: TaskRepository>(f: &mut Frame, app: &mut App<R>) {
    let size = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(1),    // Tasks
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status
        ])
        .split(size);

    let header = Paragraph::new("TASUKE")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(header, main_chunks[0]);

    if app.hidden {
        let hint = Paragraph::new("Tasks hidden. Type `show` to bring them back.")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, main_chunks[1]);
    } else {
        draw_task_list(f, app, main_chunks[1]);
    }
    draw_input(f, app, main_chunks[2]);
    draw_status(f, app, main_chunks[3]);

    if let Some(panel) = app.panel {
        draw_panel(f, app, panel, size);
    }
}

fn draw_task_list<R: TaskRepository>(f: &mut Frame, app: &mut App<R>, area: Rect) {
    let rows: Vec<Row> = app.tasks.iter().map(task_row).collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),  // Id
            Constraint::Length(2),  // Status
            Constraint::Min(20),    // Description
            Constraint::Length(35), // When
            Constraint::Length(20), // Tags
        ],
    )
    .header(Row::new(vec!["#", "", "Task", "When", "Tags"]).style(Style::default().fg(Color::Yellow)))
    .block(
        Block::default()
            .title(format!(" {} ", app.title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    )
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(">> ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn task_row(task: &TaskDto) -> Row<'static> {
    let style = if task.done {
        Style::default().fg(Color::DarkGray)
    } else if task.is_overdue {
        Style::default().fg(Color::Red)
    } else if task.is_ongoing {
        Style::default().fg(Color::Green)
    } else if task.is_due_today {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    Row::new(vec![
        Span::raw(task.id.to_string()),
        Span::raw(status_marker(task)),
        Span::styled(truncate(&task.description, DESCRIPTION_WIDTH), style),
        Span::raw(format_when(task)),
        Span::styled(format_tags(task), Style::default().fg(Color::Blue)),
    ])
}

fn draw_input<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let input = Paragraph::new(app.input.as_str()).block(
        Block::default()
            .title(" What do you want to do? ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded),
    );
    f.render_widget(input, area);

    let before: String = app.input.chars().take(app.cursor_position).collect();
    let offset = display_width(&before) as u16;
    f.set_cursor_position((area.x + 1 + offset, area.y + 1));
}

fn draw_status<R: TaskRepository>(f: &mut Frame, app: &App<R>, area: Rect) {
    let (text, color) = match &app.status {
        Some((InputStatus::Success, message)) => (message.as_str(), Color::Green),
        Some((InputStatus::Failure, message)) => (message.as_str(), Color::Red),
        Some((InputStatus::Normal, message)) => (message.as_str(), Color::Cyan),
        None => ("Enter: run | Up/Down: scroll | Esc: clear | Ctrl+C: quit", Color::DarkGray),
    };
    let status = Paragraph::new(text).style(Style::default().fg(color));
    f.render_widget(status, area);
}

fn draw_panel<R: TaskRepository>(f: &mut Frame, app: &App<R>, panel: Panel, area: Rect) {
    let (title, lines): (&str, Vec<Line>) = match panel {
        Panel::Help => (" Help ", HELP_TEXT.lines().map(Line::from).collect()),
        Panel::About => (" About ", about_text().lines().map(|l| Line::from(l.to_string())).collect()),
        Panel::Settings => (
            " Settings ",
            vec![
                setting_line("Tasks file", app.config.tasks_file.clone()),
                setting_line("Log level", app.config.log_level.clone()),
                setting_line("Implicit add", app.config.implicit_add.to_string()),
                setting_line("Reminder (minutes)", app.config.reminder_minutes.to_string()),
                Line::from(""),
                Line::from(Span::styled(
                    "Edit config.json in the data directory to change these.",
                    Style::default().fg(Color::DarkGray),
                )),
            ],
        ),
    };

    let popup = centered(area, 70, 60);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn setting_line(name: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{name}: "), Style::default().fg(Color::Blue)),
        Span::raw(value),
    ])
}

fn centered(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn display_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

/// Cuts `text` to at most `max` terminal columns, marking the cut with `…`.
fn truncate(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}
