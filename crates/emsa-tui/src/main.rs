//! EMSA - a terminal client for the EMSA employee management system.
//!
//! Provides a keyboard-driven interface to accounts, departments, projects,
//! tasks, KPIs, leave requests, performance reviews and audit logs, with
//! pages and actions gated by the signed-in user's role.

mod app;
mod forms;
mod ui;

use std::io::{self, BufRead, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emsa_core::api::ApiClient;
use emsa_core::auth::{open_storage, SessionStore};
use emsa_core::config::{Config, SessionBackend, ENV_PASSWORD};
use emsa_core::routing::DEFAULT_ROUTE;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE_PREFIX: &str = "emsa.log";

const USAGE: &str = "\
Usage: emsa [OPTIONS]

Options:
  --login        Sign in from the command line and exit
  --logout       Clear the saved session and exit
  --whoami       Print the signed-in user and exit
  --no-persist   Keep the session in memory for this run only
  -h, --help     Show this help

Environment:
  EMSA_API_URL, EMSA_USERNAME, EMSA_PASSWORD, EMSA_SESSION_BACKEND, RUST_LOG";

/// Initialize the tracing subscriber for logging.
///
/// The terminal belongs to the UI, so logs go to a daily file under the
/// cache directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing() -> WorkerGuard {
    let log_dir = Config::log_dir().unwrap_or_else(|_| std::env::temp_dir().join("emsa"));
    let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.iter().any(|a| a == "-h" || a == "--help") {
        println!("{}", USAGE);
        return Ok(());
    }
    if let Some(unknown) = args.iter().find(|a| !is_known_flag(a)) {
        eprintln!("Unknown option: {}\n\n{}", unknown, USAGE);
        std::process::exit(2);
    }

    let _log_guard = init_tracing();
    info!("EMSA client starting");

    let mut config = Config::load_or_default();
    config.apply_env();
    if has_flag(&args, "--no-persist") {
        config.session_backend = SessionBackend::Memory;
    }

    let storage = open_storage(&config)?;
    let mut session = SessionStore::new(storage);
    session.initialize();

    if has_flag(&args, "--whoami") {
        return whoami(&session);
    }
    if has_flag(&args, "--logout") {
        return logout(&config, &mut session).await;
    }
    if has_flag(&args, "--login") {
        return login(&mut config, &mut session).await;
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = match App::new(config, session) {
        Ok(mut app) => {
            app.navigate(DEFAULT_ROUTE);
            run_app(&mut terminal, &mut app).await
        }
        Err(e) => Err(e.into()),
    };

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
    }

    info!("EMSA client shutting down");
    Ok(())
}

fn is_known_flag(arg: &str) -> bool {
    matches!(arg, "--login" | "--logout" | "--whoami" | "--no-persist")
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

// ============================================================================
// Command-line session commands
// ============================================================================

fn whoami(session: &SessionStore) -> Result<()> {
    match session.user() {
        Some(user) => {
            println!("{}", serde_json::to_string_pretty(user)?);
            if session.current_role().is_none() {
                println!("(role {:?} is not recognized; no privileges)", user.role);
            }
        }
        None => println!("Not signed in"),
    }
    Ok(())
}

async fn logout(config: &Config, session: &mut SessionStore) -> Result<()> {
    if let Some(token) = session.token() {
        let api = ApiClient::new(config.api_base_url())?.with_token(token);
        if let Err(e) = api.logout().await {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }
    }
    session.logout();
    println!("Signed out");
    Ok(())
}

async fn login(config: &mut Config, session: &mut SessionStore) -> Result<()> {
    let default_username = config.last_username.clone().unwrap_or_default();
    if default_username.is_empty() {
        print!("Username: ");
    } else {
        print!("Username [{}]: ", default_username);
    }
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin()
        .lock()
        .read_line(&mut username)
        .context("Failed to read username")?;
    let username = match username.trim() {
        "" => default_username,
        typed => typed.to_string(),
    };
    if username.is_empty() {
        anyhow::bail!("Username is required");
    }

    let password = match std::env::var(ENV_PASSWORD) {
        Ok(p) if !p.is_empty() => p,
        _ => rpassword::prompt_password("Password: ").context("Failed to read password")?,
    };

    let api = ApiClient::new(config.api_base_url())?;
    match api.login(&username, &password).await {
        Ok(payload) => {
            session.login(payload);
            config.last_username = Some(username);
            if let Err(e) = config.save() {
                warn!("Failed to save config: {:#}", e);
            }
            if let Some(user) = session.user() {
                println!("Signed in as {} ({})", user.display_name(), user.role);
            }
            Ok(())
        }
        Err(e) => anyhow::bail!("{}", app::login_error_message(&e)),
    }
}

// ============================================================================
// Main loop
// ============================================================================

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
