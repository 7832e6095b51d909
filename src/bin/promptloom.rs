//! promptloom CLI Binary
//!
//! Renders and inspects prompts from a manifest directory.

use clap::Parser;
use promptloom::logging::init_logging;
use promptloom::tooling::cli::{load_engine_config, Cli, CliContext};
use std::process;

fn main() {
    let cli = Cli::parse();

    let mut config = match load_engine_config(cli.config.as_deref(), cli.prompts_dir.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    cli.apply_logging_overrides(&mut config.logging);
    if let Err(e) = init_logging(Some(&config.logging)) {
        eprintln!("Error initializing logging: {}", e);
        process::exit(1);
    }

    let context = match CliContext::from_config(config) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
