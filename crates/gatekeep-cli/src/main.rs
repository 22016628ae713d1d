//! gatekeep - terminal front end for the gatekeep session manager.
//!
//! Runs the initial token check, then shows the page for the requested
//! command and follows whatever navigation the pages and guard request.

mod pages;
mod router;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use gatekeep_core::{routes, Config, HttpAuthApi, Navigator, SessionManager, TokenBackend};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pages::print_status;
use router::CliRouter;

// ============================================================================
// Constants
// ============================================================================

/// Upper bound on page-to-page hops in one run (guards against redirect loops)
const MAX_NAVIGATION_HOPS: usize = 8;

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "gatekeep.log";

const USAGE: &str = "\
Usage: gatekeep [--ephemeral] <command>

Commands:
  status            Check the stored token and show the session status (default)
  login [email]     Log in
  register          Create an account and log in
  dashboard         Open the protected dashboard
  logout            Log out and forget the stored token

Options:
  --ephemeral       Keep the token in memory only
";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Login(Option<String>),
    Register,
    Dashboard,
    Logout,
}

#[derive(Debug, PartialEq, Eq)]
struct Cli {
    command: Command,
    ephemeral: bool,
}

/// What the command line asked for
#[derive(Debug, PartialEq, Eq)]
enum Invocation {
    Help,
    Run(Cli),
}

impl Cli {
    fn parse(args: &[String]) -> Result<Invocation> {
        if args.iter().any(|a| a == "--help" || a == "-h") {
            return Ok(Invocation::Help);
        }
        let ephemeral = args.iter().any(|a| a == "--ephemeral");

        let mut positional = args.iter().filter(|a| !a.starts_with("--"));
        let command = match positional.next().map(String::as_str) {
            None | Some("status") => Command::Status,
            Some("login") => Command::Login(positional.next().cloned()),
            Some("register") => Command::Register,
            Some("dashboard") => Command::Dashboard,
            Some("logout") => Command::Logout,
            Some("help") => return Ok(Invocation::Help),
            Some(other) => return Err(anyhow::anyhow!("Unknown command: {}\n\n{}", other, USAGE)),
        };

        Ok(Invocation::Run(Self { command, ephemeral }))
    }
}

/// Initialize the tracing subscriber for logging.
/// The returned guard must live until exit so file logs get flushed.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_writer(writer).with_ansi(false)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cli = match Cli::parse(&args)? {
        Invocation::Run(cli) => cli,
        Invocation::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
    };

    let (mut config, config_error) = match Config::load() {
        Ok(c) => (c, None),
        Err(e) => (Config::default(), Some(e)),
    };
    if cli.ephemeral {
        config.token_backend = TokenBackend::Memory;
    }

    let _log_guard = init_tracing(config.log_dir.as_deref());
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }
    info!(base_url = %config.base_url, backend = ?config.token_backend, "gatekeep starting");

    let api = Arc::new(HttpAuthApi::new(config.base_url.clone(), config.request_timeout())?);
    let store = config.token_store()?;
    let session = Arc::new(
        SessionManager::new(api, store).purge_invalid_token(config.purge_invalid_token),
    );
    let initial_check = session.clone().start();
    let router = CliRouter::new();

    match cli.command {
        Command::Status => {
            initial_check.await?;
            print_status(&session.state());
            return Ok(());
        }
        Command::Logout => {
            initial_check.abort();
            session.logout();
            println!("Logged out.");
            return Ok(());
        }
        Command::Login(email) => {
            // Let the check settle so its result cannot overwrite the new login
            initial_check.await?;
            pages::login_page(&session, &router, email.as_deref()).await?;
        }
        Command::Register => {
            initial_check.await?;
            pages::register_page(&session, &router).await?;
        }
        Command::Dashboard => router.navigate_by_url(routes::DASHBOARD),
    }

    follow_navigation(&session, &router).await
}

/// Show the page for each requested route until nothing more is requested
async fn follow_navigation(session: &SessionManager, router: &CliRouter) -> Result<()> {
    for _ in 0..MAX_NAVIGATION_HOPS {
        let Some(url) = router.take() else {
            return Ok(());
        };
        match url.as_str() {
            routes::DASHBOARD => pages::dashboard_page(session, router).await?,
            routes::LOGIN => pages::login_page(session, router, None).await?,
            routes::REGISTER => pages::register_page(session, router).await?,
            other => warn!(url = other, "No page for route"),
        }
    }

    warn!("Too many redirects, stopping");
    Ok(())
}
