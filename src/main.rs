//! userdeck binary entry point.
//!
//! Parses options, sets up file logging, loads theme and keybindings,
//! starts the network worker and runs the TUI event loop, restoring the
//! terminal state on exit.
//!
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use userdeck::api::{RecordClient, UreqTransport};
use userdeck::app::keymap::Keymap;
use userdeck::app::worker::Worker;
use userdeck::app::{self, AppState, Theme};
use userdeck::config::Cli;
use userdeck::logging;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Program entry point: run the TUI and report any top-level error to stderr.
fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_dir())?;

    let config_dir = cli.config_dir();
    std::fs::create_dir_all(&config_dir)
        .with_context(|| format!("create config directory {}", config_dir.display()))?;
    let theme = Theme::load_or_init(&cli.theme_path());
    let keymap = Keymap::load_or_init(&cli.keybinds_path());

    let client = RecordClient::new(&cli.base_url, &cli.collection);
    tracing::info!(url = client.collection_url(), "using records endpoint");
    let worker = Worker::spawn(client, UreqTransport::new(cli.timeout()))?;

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, AppState::new(theme, keymap), worker);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(error = %err, "application error");
        eprintln!("application error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}
