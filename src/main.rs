#![allow(
    clippy::collapsible_else_if,
    clippy::collapsible_if,
    clippy::module_inception,
    clippy::useless_format
)]
#![deny(
    clippy::get_unwrap,
    clippy::panic,
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::used_underscore_binding,
    clippy::used_underscore_items
)]

mod config;
mod logger;
mod sandbox;
mod types;
mod util;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;
use config::{cli, resolve_config};
use log::{Log, debug, error};
use sandbox::SandboxContext;
use types::ChildOutcome;
use util::{HostSys, reraise};

/// Exit code for any failure of our own, as opposed to the command's.
const FATAL_EXIT_CODE: i32 = 1;

pub fn main() {
    // This function will not return if tab completion is requested.
    CompleteEnv::with_factory(cli::Args::command).complete();

    let logger = logger::StoreLogger::new(log::LevelFilter::Trace);
    if let Err(e) = logger.init() {
        eprintln!("Failed to initialize logger: {}", e);
        std::process::exit(FATAL_EXIT_CODE);
    }
    logger.set_level(config::DEFAULT_LOG_LEVEL);

    let cli = cli::Args::parse();

    let code = match run(logger, cli) {
        Ok(ChildOutcome::Exited(code)) => code,
        Ok(outcome @ ChildOutcome::Signaled(signal)) => {
            logger.flush();
            reraise(signal);
            outcome.exit_code()
        }
        Err(e) => {
            logger.print_deferred();
            error!("{:#}", e);
            FATAL_EXIT_CODE
        }
    };

    logger.flush();
    std::process::exit(code);
}

fn run(
    logger: &'static logger::StoreLogger,
    cli: cli::Args,
) -> Result<ChildOutcome> {
    let command = cli.command.clone();
    let store_path = cli.store_path.clone();

    let config = resolve_config(cli).context("Resolving config")?;

    // Now that we've loaded the config, we can set the log level and print
    // out any deferred messages emitted while we were loading it.
    logger.set_level(config.log_level);
    logger.print_deferred();
    for line in config.to_string().lines() {
        debug!("{}", line);
    }

    let sys = HostSys;
    let mut sandbox = SandboxContext::prepare(&sys, &config, &store_path)?;
    sandbox.bootstrap(&sys)?;
    sandbox.execute(&sys, &command)
}
