use std::io::{self, Stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;

use super::app::{Action, App};

/// Spin up the terminal backend, enter the draw loop, and keep processing input
/// until the user quits. The terminal is restored even when the loop fails.
pub fn run_app(app: &mut App) -> Result<()> {
    let mut stdout = io::stdout();
    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal backend")?;

    let result = event_loop(&mut terminal, app);

    cleanup_terminal(&mut terminal)?;
    info!("session closed");
    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal
            .draw(|frame| app.draw(frame))
            .context("failed to draw frame")?;

        if !event::poll(Duration::from_millis(250)).context("event polling failed")? {
            continue;
        }
        let Event::Key(key_event) = event::read().context("failed to read event")? else {
            continue;
        };
        if key_event.kind != KeyEventKind::Press {
            continue;
        }

        match route_key(key_event) {
            KeyRoute::Shortcut(action) => app.trigger(action),
            KeyRoute::Quit => return Ok(()),
            KeyRoute::Ignore => {}
            KeyRoute::Key(code) => {
                if app.handle_key(code) {
                    return Ok(());
                }
            }
        }
    }
}

/// Where a key press goes once it leaves the event queue.
#[derive(Debug, PartialEq, Eq)]
enum KeyRoute {
    Shortcut(Action),
    Quit,
    /// Control chords with no binding; they must not type into a field.
    Ignore,
    Key(KeyCode),
}

fn route_key(key_event: KeyEvent) -> KeyRoute {
    if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyRoute::Key(key_event.code);
    }
    match key_event.code {
        KeyCode::Char('a') => KeyRoute::Shortcut(Action::Add),
        KeyCode::Char('u') => KeyRoute::Shortcut(Action::Update),
        KeyCode::Char('d') => KeyRoute::Shortcut(Action::Delete),
        KeyCode::Char('c') => KeyRoute::Quit,
        KeyCode::Char(_) => KeyRoute::Ignore,
        code => KeyRoute::Key(code),
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal
        .show_cursor()
        .context("failed to restore cursor visibility")
}
