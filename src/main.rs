//! Persona Router - Route dispensation questions to the right assistant
//!
//! A terminal UI application that suggests which assistant persona should
//! answer a question about hanseníase treatment while the user types it.

use std::io;
use std::panic;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use persona_router::app::App;
use persona_router::cache::RoutingCache;
use persona_router::cli::{Cli, StartupConfig};
use persona_router::config::Settings;
use persona_router::debounce::Debouncer;
use persona_router::logging::{self, LogTarget};
use persona_router::routing::{Classifier, Router};
use persona_router::ui;

/// How long to wait for a key before running time-driven work
const POLL_INTERVAL: Duration = Duration::from_millis(50);

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

/// Builds the routing service described by the settings
fn build_router(settings: &Settings) -> Router {
    Router::new(
        RoutingCache::with_ttl(settings.cache_ttl()),
        Classifier::from_api_url(settings.api_url.as_deref(), settings.request_timeout()),
    )
}

/// Routes each question once and prints the results as a JSON array
async fn run_one_shot(settings: &Settings, questions: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    logging::init(&LogTarget::Stderr, &settings.log_level)?;

    let mut router = build_router(settings);
    info!(classifier = %router.classifier().describe(), count = questions.len(), "routing questions");

    let routed = router.analyze_batch(questions).await;
    println!("{}", serde_json::to_string_pretty(&routed)?);

    Ok(())
}

/// Runs the interactive terminal UI
async fn run_tui(settings: &Settings, startup: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    match logging::default_log_file() {
        Some(path) => logging::init(&LogTarget::File(path), &settings.log_level)?,
        None => eprintln!("Warning: no home directory, logging disabled"),
    }

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_startup_config(
        startup,
        build_router(settings),
        Debouncer::new(settings.debounce()),
    );
    info!(classifier = %app.router().classifier().describe(), "session started");

    // Main event loop
    let result = loop {
        if let Err(e) = terminal.draw(|f| ui::render(f, &app)) {
            break Err(e);
        }

        // Poll for keyboard events, then let debounced work run
        match event::poll(POLL_INTERVAL) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => app.handle_key(key),
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }
        app.tick(Instant::now());

        // Check if we should quit
        if app.should_quit {
            break Ok(());
        }
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = &result {
        warn!(error = %e, "terminal error");
    }
    info!(cached = app.router().cache().len(), "session ended");
    result?;

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let startup = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let settings = match Settings::from_cli(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    let result = if startup.is_one_shot() {
        run_one_shot(&settings, &startup.questions).await
    } else {
        run_tui(&settings, startup).await
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
