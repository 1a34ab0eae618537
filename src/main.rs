use std::io::ErrorKind;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};

use gator::{Cli, Config, Context, Database, GatorError, Session};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load_with_env(&cli.config) {
        Ok(config) => config,
        Err(GatorError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            eprintln!("{} not found, using default configuration.", cli.config.display());
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
        Err(e) => {
            eprintln!("Failed to load {}: {e}", cli.config.display());
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        return ExitCode::FAILURE;
    }

    // Initialize logging
    if let Err(e) = gator::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        gator::logging::init_console_only(&config.logging.level);
    }

    let db = match Database::connect(&config.database).await {
        Ok(db) => db,
        Err(e) => {
            error!(error = %e, "Failed to open database");
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let session = match Session::load(&config.session.path) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    debug!(command = ?cli.command, "Running command");
    let mut ctx = Context::new(db, config, session);
    let mut stdout = std::io::stdout().lock();

    match gator::execute(&mut ctx, cli.command, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
