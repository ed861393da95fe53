use std::io;
use std::panic::{self, PanicHookInfo};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::cursor::Show;
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::task_store::JsonFileStore;
use crate::model::config::BoardConfig;

use super::input;
use super::render;
use super::state::BoardState;

type Backend = CrosstermBackend<io::Stdout>;
type PanicHook = Arc<dyn Fn(&PanicHookInfo<'_>) + Sync + Send + 'static>;

/// What to open and how
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub tasks_file: PathBuf,
    pub config: BoardConfig,
}

/// Leaves raw mode and the alternate screen when dropped, so every exit
/// path (including `?`) hands the terminal back intact.
struct TerminalGuard {
    terminal: Terminal<Backend>,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;
        Ok(TerminalGuard { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Run the board until the user quits
pub fn run(options: RunOptions) -> Result<(), Box<dyn std::error::Error>> {
    let store = JsonFileStore::new(options.tasks_file.clone());
    let (width, height) = crossterm::terminal::size()?;
    // Load before touching the terminal so a bad file reports on stderr
    let mut state = BoardState::new(Box::new(store), &options.config, width, height)?;

    let mut guard = TerminalGuard::enter()?;

    let previous_hook = install_panic_hook();
    let result = run_event_loop(&mut guard.terminal, &mut state);
    restore_panic_hook(previous_hook);
    if let Err(e) = &result {
        tracing::error!(error = %e, "event loop failed");
    }
    tracing::info!("board closed");
    result
}

/// Restore the terminal before the default hook prints the panic
fn install_panic_hook() -> PanicHook {
    let previous: PanicHook = panic::take_hook().into();
    let chained = Arc::clone(&previous);
    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        chained(info);
    }));
    previous
}

fn restore_panic_hook(previous: PanicHook) {
    let _ = panic::take_hook();
    panic::set_hook(Box::new(move |info| previous(info)));
}

fn run_event_loop(
    terminal: &mut Terminal<Backend>,
    state: &mut BoardState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, state))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    input::handle_key(state, key);
                }
                Event::Resize(width, height) => {
                    tracing::debug!(width, height, "terminal resized");
                    state.resize(width, height);
                }
                _ => {}
            }
        }
        state.expire_message(Instant::now());

        if state.should_quit {
            break;
        }
    }
    Ok(())
}
