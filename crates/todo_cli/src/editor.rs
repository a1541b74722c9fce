//! Interactive entry through an external editor or stdin.
//!
//! # Invariants
//! - The temp file is removed when collection finishes, on every path.
//! - A non-zero editor exit is an error, never an empty item list.

use crate::error::CliError;
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::Command;

const FALLBACK_EDITOR: &str = "vi";
const ENTRY_TEMPLATE: &str = "\
# One todo item per line. Format: <date> -- <todo>, or just <todo>.
# Dates: today, tomorrow 17:30, friday, in 3 days, 2026-04-01 09:00
# Lines starting with '#' and blank lines are ignored.
";

/// Picks `$VISUAL`, then `$EDITOR`, then `vi`.
pub fn resolve_editor(visual: Option<String>, editor: Option<String>) -> String {
    [visual, editor]
        .into_iter()
        .flatten()
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .unwrap_or_else(|| FALLBACK_EDITOR.to_string())
}

/// Opens the editor on a prefilled temp file and returns its raw lines.
pub fn collect_from_editor() -> Result<Vec<String>, CliError> {
    let editor = resolve_editor(
        std::env::var("VISUAL").ok(),
        std::env::var("EDITOR").ok(),
    );

    let mut file = tempfile::Builder::new()
        .prefix("todo-")
        .suffix(".txt")
        .tempfile()?;
    file.write_all(ENTRY_TEMPLATE.as_bytes())?;
    file.flush()?;

    // `$EDITOR` may carry arguments, e.g. `code --wait`.
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or(FALLBACK_EDITOR);
    let status = Command::new(program)
        .args(parts)
        .arg(file.path())
        .status()
        .map_err(|err| CliError::Editor(format!("cannot launch `{editor}`: {err}")))?;
    if !status.success() {
        return Err(CliError::Editor(format!("`{editor}` exited with {status}")));
    }

    let contents = std::fs::read_to_string(file.path())?;
    Ok(contents.lines().map(str::to_string).collect())
}

/// Reads raw lines from stdin until EOF, prompting when attached to a terminal.
pub fn collect_from_stdin() -> Result<Vec<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Recording todo items. Format: <date> -- <todo>. ^D to quit.");
    }
    read_lines(stdin.lock())
}

fn read_lines(reader: impl BufRead) -> Result<Vec<String>, CliError> {
    Ok(reader.lines().collect::<Result<Vec<_>, _>>()?)
}
