use std::env;
use std::io::{self, Stdout};
use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
    LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use qgrid::app::App;
use qgrid::clipboard::Clipboard;
use qgrid::config::{self, Action, Keymap};
use qgrid::logging;

fn print_version() {
    println!("qgrid {}", env!("CARGO_PKG_VERSION"));
}

fn print_usage() {
    eprintln!("qgrid - Interactive grid for SQL query results");
    eprintln!();
    eprintln!("Usage: qgrid [OPTIONS] [RESULT_JSON]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [RESULT_JSON]     Query result document to open");
    eprintln!("                    ({{\"columns\": [...], \"rows\": [[...]], \"executionTimeMs\": 0}})");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -h, --help        Print this help message");
    eprintln!("  -V, --version     Print version information");
    eprintln!();
    eprintln!("Environment Variables:");
    eprintln!("  QGRID_CONFIG_DIR  Override the configuration directory");
    eprintln!("  QGRID_LOG         Log filter (default: qgrid=info)");
    eprintln!();
    eprintln!("Configuration:");
    if let Some(path) = config::config_path() {
        eprintln!("  Config file: {}", path.display());
    }
    if let Some(path) = config::log_path() {
        eprintln!("  Log file:    {}", path.display());
    }
    eprintln!();
    eprintln!("Grid keys (default):");
    let keymap = Keymap::default_grid_keymap();
    for action in Action::ALL {
        let keys: Vec<String> = keymap
            .keys_for(action)
            .iter()
            .map(ToString::to_string)
            .collect();
        eprintln!("  {:<22}{}", keys.join(", "), action.description());
    }
    eprintln!("  {:<22}{}", "Shift+movement", "Extend the selection");
    eprintln!("  {:<22}{}", "Double-click", "Edit cell");
    eprintln!("  Alt+; filters by the focused cell in every terminal; Ctrl+; needs a");
    eprintln!("  terminal with keyboard enhancement (kitty, foot, WezTerm, ...).");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  qgrid result.json");
    eprintln!("  QGRID_LOG=qgrid=debug qgrid result.json");
}

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_usage();
        return Ok(());
    }

    if args.iter().any(|a| a == "-V" || a == "--version") {
        print_version();
        return Ok(());
    }

    if let Some(path) = config::log_path() {
        if let Err(e) = logging::init_logging(&path) {
            eprintln!("Warning: Failed to initialize logging: {:#}", e);
        }
    }

    let cfg = config::load_config().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {:#}", e);
        config::Config::default()
    });

    let clipboard = match Clipboard::new(&cfg.clipboard) {
        Ok(c) => Some(c),
        Err(e) => {
            eprintln!("Warning: {:#}", e);
            None
        }
    };

    let result_path = args
        .get(1)
        .filter(|a| !a.starts_with('-'))
        .map(PathBuf::from);

    let mut app = App::new(cfg, clipboard);
    if let Some(path) = result_path {
        app.open(path);
    }

    let (mut terminal, enhanced_keys) =
        init_terminal().context("failed to initialize terminal; are you running in a real TTY?")?;

    let res = app.run(&mut terminal);

    restore_terminal(terminal, enhanced_keys)?;

    res
}

/// Sets up the terminal. The flag reports whether keyboard enhancement was
/// pushed, so chords like Ctrl+; arrive with their modifiers.
fn init_terminal() -> Result<(Terminal<CrosstermBackend<Stdout>>, bool)> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let enhanced_keys = matches!(supports_keyboard_enhancement(), Ok(true))
        && execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
        )
        .is_ok();
    tracing::debug!(enhanced_keys, "terminal initialized");

    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok((terminal, enhanced_keys))
}

fn restore_terminal(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    enhanced_keys: bool,
) -> Result<()> {
    if enhanced_keys {
        execute!(terminal.backend_mut(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
