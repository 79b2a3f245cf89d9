mod ui;

use crate::ui::{App, StatusType, Theme};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use snapedit::{EditorConfig, Platform, Session};
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{info, warn, Level};

/// A terminal text editor with smart indentation, list continuation and
/// word-merging undo history
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// File to edit (created on first save)
    file: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where the undo history is kept between runs
    #[arg(long)]
    session: Option<PathBuf>,

    /// Neither restore nor save the undo history
    #[arg(long, conflicts_with = "session")]
    no_session: bool,

    /// Write debug logs to this file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Keybinding flavor, overriding the config file
    #[arg(long, value_enum)]
    platform: Option<PlatformArg>,

    /// Use the light color theme
    #[arg(long)]
    light: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformArg {
    Host,
    Mac,
    Windows,
    Other,
}

impl From<PlatformArg> for Platform {
    fn from(arg: PlatformArg) -> Self {
        match arg {
            PlatformArg::Host => Platform::host(),
            PlatformArg::Mac => Platform::MacLike,
            PlatformArg::Windows => Platform::Windows,
            PlatformArg::Other => Platform::Other,
        }
    }
}

fn main() -> Result<()> {
    // Parse CLI args (before entering raw mode so --help / errors print normally)
    let cli = Cli::parse();

    // Logs go to a file only; stdout belongs to the terminal UI
    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    let config_path = cli.config.clone().unwrap_or_else(EditorConfig::default_path);
    let mut config = EditorConfig::load_or_default(&config_path)?;
    if let Some(platform) = cli.platform {
        config.platform = platform.into();
    }

    let text = match &cli.file {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => String::new(),
    };

    let session_path = if cli.no_session {
        None
    } else {
        Some(cli.session.clone().unwrap_or_else(Session::default_path))
    };
    let theme = if cli.light { Theme::light() } else { Theme::dark() };

    let mut app = App::new(&text, config, cli.file.clone(), session_path, theme)?;
    if let Err(err) = app.restore_session() {
        warn!("session not restored: {err:#}");
        app.set_status(format!("Session not restored: {err:#}"), StatusType::Warning);
    }
    info!(
        file = ?cli.file,
        platform = app.engine.config().platform.label(),
        "starting editor"
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = app.save_session() {
        eprintln!("Warning: undo history not saved: {err:#}");
    }

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
    }

    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .init();
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        let height = terminal.size()?.height;
        app.view.ensure_cursor_visible(ui::editor_rows(height));
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events (ignore release/repeat)
                if key.kind != KeyEventKind::Press {
                    continue;
                }

                // Global quit: Ctrl+Q
                if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                app.handle_input(key)?;
            }
        }
    }
}
