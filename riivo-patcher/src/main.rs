//! Main entry point for the riivo-patcher CLI

mod cli;
mod commands;
mod utils;

use std::io;
use std::process::ExitCode;

use clap::CommandFactory;
use clap::Parser;
use clap_complete::{Generator, generate};
use console::style;

use crate::cli::{Cli, Commands};

fn main() -> ExitCode {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger; RUST_LOG still wins over the verbosity flags
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .format_timestamp(None)
        .format_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Patch(args) => commands::patch::execute(args, cli.quiet),
        Commands::List(args) => commands::list::execute(args),
        Commands::Completions { shell } => {
            print_completions(shell, &mut Cli::command());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err),
    }
}

/// Print a failed run and pick the exit status
fn report_error(err: &anyhow::Error) -> ExitCode {
    eprintln!("{} {err:#}", style("Error:").red().bold());

    let riivo_error = err.downcast_ref::<riivo::Error>();
    if let Some(riivo::Error::ExternalTool { stderr, .. }) = riivo_error
        && !stderr.is_empty()
    {
        eprintln!("{}", style(stderr).red());
    }

    ExitCode::from(riivo_error.map_or(1, riivo::Error::exit_code))
}

fn print_completions<G: Generator>(generator: G, cmd: &mut clap::Command) {
    generate(
        generator,
        cmd,
        cmd.get_name().to_string(),
        &mut io::stdout(),
    );
}
