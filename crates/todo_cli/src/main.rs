//! `todo` command-line entry point.
//!
//! # Responsibility
//! - Parse options, start logging, and run one store session per invocation.
//! - Print the listing and a short change summary.
//!
//! # Invariants
//! - Every exit path closes the session: flush on success, rollback otherwise.
//! - Any error exits with status 1.

mod cli;
mod display;
mod editor;
mod error;

use chrono::Local;
use clap::Parser;
use cli::Cli;
use error::CliError;
use log::info;
use std::process::ExitCode;
use todo_core::{apply_request, default_log_level, init_logging, with_session};

fn main() -> ExitCode {
    let cli = Cli::parse();
    start_logging(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("todo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn start_logging(cli: &Cli) {
    let Some(log_dir) = cli.log_dir() else {
        return;
    };
    let level = cli.log_level.as_deref().unwrap_or(default_log_level());
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("todo: warning: logging disabled: {err}");
    }
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let now = Local::now();
    let db_path = cli.database_path()?;
    let mut request = cli.to_request(&now)?;
    info!(
        "event=cli_run module=cli status=start edit={} stdin={} listing={}",
        cli.edit,
        cli.reads_stdin(),
        request.list.is_some()
    );

    let (report, flushed) = with_session(&db_path, |store| -> Result<_, CliError> {
        if cli.edit {
            request.add_lines.extend(editor::collect_from_editor()?);
        }
        if cli.reads_stdin() {
            request.add_lines.extend(editor::collect_from_stdin()?);
        }
        Ok(apply_request(store, &request, &now)?)
    })?;

    for id in &report.unknown_ids {
        eprintln!("todo: no item with id {id}");
    }
    for id in &flushed.inserted {
        eprintln!("added item {id}");
    }
    for id in &report.completed {
        eprintln!("completed item {id}");
    }
    for id in &report.removed {
        eprintln!("removed item {id}");
    }

    if let Some(listing) = &report.listing {
        for entry in listing {
            if cli.json {
                let line = serde_json::to_string(entry)
                    .map_err(|err| CliError::Io(std::io::Error::other(err)))?;
                println!("{line}");
            } else {
                println!("{}", display::format_item(entry));
            }
        }
    }

    Ok(())
}
