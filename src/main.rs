use clap::Parser;
use std::process::ExitCode;

mod artifact;
mod cli;
mod document;
mod error;
mod launcher;
mod logging;
mod orchestrator;
mod providers;
mod registry;
mod validate;

use crate::cli::RootArgs;
use crate::error::LaunchError;
use crate::logging::LogLevel;
use crate::orchestrator::{Orchestrator, ProcessEnvironment};
use crate::registry::LauncherRegistry;

fn main() -> ExitCode {
    let args = RootArgs::parse();

    match run(&args) {
        Ok(code) => exit_code(code),
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &RootArgs) -> anyhow::Result<i32> {
    let level = LogLevel::parse(&args.command.common().log_level)?;
    logging::init(level)?;
    let orchestrator = Orchestrator::new(LauncherRegistry::builtin(), ProcessEnvironment);
    let mut stdout = std::io::stdout().lock();
    let code = orchestrator.run(&args.command, &mut stdout)?;
    Ok(code)
}

fn report(err: &anyhow::Error) {
    eprintln!("cluster-launch encountered an error!");
    match err.downcast_ref::<LaunchError>() {
        Some(launch) => {
            tracing::debug!(kind = launch.kind(), error = ?launch, "phase failed");
            eprintln!("{}: {launch}", launch.kind());
        }
        None => eprintln!("{err:#}"),
    }
}

fn exit_code(code: i32) -> ExitCode {
    // exit statuses outside 0..=255 cannot be reported faithfully
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
