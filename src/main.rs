use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use sql_runner::config::Config;
use sql_runner::favorites::QueryFavorites;
use sql_runner::history::QueryHistory;
use sql_runner::logging;
use sql_runner::storage::JsonStore;
use sql_runner::ui::app::App;
use sql_runner::ui::render;

type Term = Terminal<CrosstermBackend<io::Stdout>>;

fn main() -> Result<()> {
    let log_buffer = logging::init_tracing();
    let config = Config::load();
    let history = QueryHistory::load(JsonStore::open_default()?)?;
    let favorites = QueryFavorites::load(JsonStore::open_default()?)?;
    let mut app = App::new(config, history, favorites, log_buffer);

    // Raw mode and the alternate screen are scoped to this call; both are
    // released on every exit path, panics included.
    let mut terminal = setup_terminal()?;
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(info);
    }));

    let result = run(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Term) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(terminal: &mut Term, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render::draw(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle_key(key)?;
                }
                // A resize just invalidates the window geometry; the next
                // draw recomputes it from the new frame size.
                Event::Resize(_, _) => {}
                _ => {}
            }
        } else {
            app.on_tick();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}
