//! pace CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template error
//! - 5: IaC error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::{Cli, Commands};

use pace_iac::IacError;
use pace_spec::SpecError;
use pace_templates::TemplateError;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const IAC_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
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

fn init_logging(cli: &Cli) {
    let default_filter = if cli.verbose {
        "pace=debug,info"
    } else if cli.quiet {
        "warn"
    } else {
        "pace=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let log_result = tracing_subscriber::registry()
        .with(cli.log_json.then(|| fmt::layer().json().with_target(false)))
        .with((!cli.log_json).then(|| fmt::layer().with_target(false)))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<commands::validate::ValidationFailed>().is_some() {
            return ExitCodes::VALIDATION_FAILURE;
        }
        if let Some(err) = cause.downcast_ref::<IacError>() {
            return match err.root_cause() {
                IacError::Render { .. } => ExitCodes::TEMPLATE_ERROR,
                _ => ExitCodes::IAC_ERROR,
            };
        }
        if let Some(err) = cause.downcast_ref::<SpecError>() {
            return categorize_spec_error(err);
        }
        if cause.downcast_ref::<TemplateError>().is_some() {
            return ExitCodes::TEMPLATE_ERROR;
        }
    }
    ExitCodes::GENERAL_ERROR
}

fn categorize_spec_error(e: &SpecError) -> u8 {
    match e {
        SpecError::NotFound(_) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::VALIDATION_FAILURE,
    }
}
