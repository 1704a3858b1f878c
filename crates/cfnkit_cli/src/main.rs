//! cfnkit CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cfnkit_core::CfnError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let directives = if cli.verbose {
        "cfnkit=debug,warn"
    } else if cli.quiet {
        "warn"
    } else {
        "cfnkit=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    // Logging may already be initialized
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::List(args) => commands::list::execute(args),
        Commands::Render(args) => commands::render::execute(args),
        Commands::Check(args) => commands::check::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(err) = e.downcast_ref::<CfnError>() {
        return match err {
            CfnError::MissingRequiredField { .. }
            | CfnError::IllegalState { .. }
            | CfnError::UnresolvedReference { .. }
            | CfnError::DuplicateName(_)
            | CfnError::InvalidName(_)
            | CfnError::InvalidValue { .. } => ExitCodes::VALIDATION_FAILURE,
            CfnError::Config(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("unknown sample") || msg.contains("unknown format") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
