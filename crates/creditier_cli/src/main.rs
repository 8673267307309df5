//! `creditier` command-line entry point.

use clap::Parser;
use creditier_cli::cli::{render_rules, run_export, summarize, Cli, Command};
use creditier_core::{default_log_level, init_logging, LogTarget};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    let target = match cli.log_dir.as_deref() {
        Some(dir) => LogTarget::directory(dir),
        None => Ok(LogTarget::Stderr),
    };
    if let Err(err) = target.and_then(|target| init_logging(level, target)) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    let result = match &cli.command {
        Command::Export(args) => run_export(args).map(|outcome| summarize(&outcome)),
        Command::Rules(args) => render_rules(args),
    };

    match result {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("event=cli_exit module=cli status=error");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
