pub mod app;
pub mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tasuke_core::{Config, TaskRepository, Tasuke};

use crate::tui::app::{App, SnapshotBuffer};

const TICK: Duration = Duration::from_millis(250);

pub fn run<R: TaskRepository>(controller: Tasuke<R>, snapshots: Arc<SnapshotBuffer>, config: Config) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller, config);
    let res = run_app(&mut terminal, &mut app, &snapshots);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        log::error!("event=tui_loop status=failed");
        println!("{err:?}");
    }
    Ok(())
}

fn run_app<B: Backend, R: TaskRepository>(
    terminal: &mut Terminal<B>,
    app: &mut App<R>,
    snapshots: &SnapshotBuffer,
) -> io::Result<()> {
    loop {
        app.sync(snapshots.take());
        app.check_reminder(Local::now().naive_local());

        terminal
            .draw(|f| ui::draw(f, app))
            .map_err(|e| io::Error::other(e.to_string()))?;

        if !event::poll(TICK)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
            KeyCode::Enter => app.submit_command(),
            KeyCode::Esc => app.escape(),
            KeyCode::Char(c) => app.input_char(c),
            KeyCode::Backspace => app.delete_char(),
            KeyCode::Left => app.move_cursor_left(),
            KeyCode::Right => app.move_cursor_right(),
            KeyCode::Down => app.next(),
            KeyCode::Up => app.previous(),
            _ => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
