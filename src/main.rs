//! Disaster Watch - disaster preparedness client for the terminal
//!
//! Shows live weather risk for the current position, sends SOS alerts with a
//! cancellable countdown, and lists shelters, notices and settings.

use std::fs::{self, File};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use directories::ProjectDirs;
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::EnvFilter;

use disasterwatch::app::{App, AppOptions, Services};
use disasterwatch::cli::{Cli, StartupConfig};
use disasterwatch::settings::{AppConfig, Settings};
use disasterwatch::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

/// Default log file in the platform data directory
fn default_log_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "disasterwatch")?;
    Some(dirs.data_dir().join("disasterwatch.log"))
}

/// Sends logs to a file; the terminal belongs to the UI
///
/// `RUST_LOG` wins over the configured level.
fn init_logging(level: &str, path: Option<&Path>) -> io::Result<()> {
    let path = match path.map(Path::to_path_buf).or_else(default_log_path) {
        Some(path) => path,
        None => return Ok(()),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = File::options().create(true).append(true).open(&path)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Prints a startup error and exits before the terminal is touched
fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let startup = StartupConfig::from_cli(&cli).unwrap_or_else(|e| fail(e));

    let mut config = AppConfig::load(startup.config_path.as_deref()).unwrap_or_else(|e| fail(e));
    startup.apply(&mut config);
    if let Err(e) = config.validate() {
        fail(e);
    }

    init_logging(&config.log_level, startup.log_file.as_deref())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let settings = Settings::default();
    let services = Services::from_config(&config, settings.location_flag());
    let mut app = App::new(services, settings, AppOptions::from_config(&config, &startup));

    // Trigger initial weather load
    app.start();

    // Main event loop
    loop {
        terminal.draw(|f| ui::render(f, &app))?;

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        // Apply ticks and finished fetches
        app.process_events();

        if app.should_quit {
            break;
        }
    }

    info!("shutting down");

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    Ok(())
}
