//! Command-line options and their translation into a core request.
//!
//! # Responsibility
//! - Parse flags with clap, including environment fallbacks.
//! - Resolve defaults (database path, listing window) against an explicit
//!   `now` so nothing depends on process-wide mutable state.

use crate::error::CliError;
use chrono::{DateTime, TimeZone, Utc};
use clap::Parser;
use std::path::{Path, PathBuf};
use todo_core::{parse_date, DueWindow, ItemId, ListCriteria, TodoRequest};

const DEFAULT_DB_FILE_NAME: &str = ".todo.db";
const LOG_DIR_COMPONENTS: [&str; 2] = ["todo", "logs"];
const MAX_WINDOW_DAYS: u32 = 36_500;

/// todo - record, complete and list todo items
#[derive(Parser, Debug)]
#[command(name = "todo", version, about, long_about = None)]
#[command(after_help = "Item format: <date> -- <text>, or just <text>.\n\
Examples:\n  todo \"tomorrow 9:00 -- call mom\" \"buy milk\"\n  todo -l -s milk\n  todo -c 3 -r 5 -l")]
pub struct Cli {
    /// SQLite database file
    #[arg(short = 'd', long, env = "TODO_DB", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// List items
    #[arg(short, long)]
    pub list: bool,

    /// Mark an item as done (repeatable)
    #[arg(short, long = "complete", value_name = "ID", value_parser = clap::value_parser!(i64).range(1..))]
    pub complete: Vec<i64>,

    /// Remove an item (repeatable)
    #[arg(short, long = "remove", value_name = "ID", value_parser = clap::value_parser!(i64).range(1..))]
    pub remove: Vec<i64>,

    /// Only list items whose text matches every PATTERN (regex, implies --list)
    #[arg(short, long = "search", value_name = "PATTERN")]
    pub search: Vec<String>,

    /// Case-insensitive search
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// List only done items
    #[arg(long, conflicts_with = "all")]
    pub done: bool,

    /// List done and open items with any due date
    #[arg(short, long)]
    pub all: bool,

    /// Window start (exclusive), e.g. "today" or "2026-03-01"
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Window end (exclusive), e.g. "friday" or "in 2 weeks"
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Days after now covered by the default listing window
    #[arg(
        long,
        default_value_t = 7,
        value_name = "N",
        value_parser = clap::value_parser!(u32).range(..=i64::from(MAX_WINDOW_DAYS))
    )]
    pub days: u32,

    /// Enter items in $VISUAL / $EDITOR
    #[arg(short, long)]
    pub edit: bool,

    /// Read items from stdin, one per line
    #[arg(long)]
    pub stdin: bool,

    /// Print the listing as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long, env = "TODO_LOG_LEVEL", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Directory for rotated log files
    #[arg(long, env = "TODO_LOG_DIR", value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Items to add
    #[arg(value_name = "ITEM")]
    pub items: Vec<String>,
}

impl Cli {
    pub fn wants_listing(&self) -> bool {
        self.list
            || self.done
            || self.all
            || !self.search.is_empty()
            || self.from.is_some()
            || self.to.is_some()
    }

    /// Nothing on the command line: fall back to reading stdin.
    pub fn reads_stdin(&self) -> bool {
        self.stdin
            || (!self.edit
                && !self.wants_listing()
                && self.items.is_empty()
                && self.complete.is_empty()
                && self.remove.is_empty())
    }

    /// Builds the request for positional items, ids and listing criteria.
    ///
    /// Editor and stdin lines are appended by the caller inside the session.
    pub fn to_request<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Result<TodoRequest, CliError> {
        Ok(TodoRequest {
            complete: self.complete.iter().copied().map(ItemId).collect(),
            remove: self.remove.iter().copied().map(ItemId).collect(),
            add_lines: self.items.clone(),
            list: self.list_criteria(now)?,
        })
    }

    fn list_criteria<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Option<ListCriteria>, CliError> {
        if !self.wants_listing() {
            return Ok(None);
        }

        let now_utc = now.with_timezone(&Utc);
        let default_window = if self.all {
            DueWindow::unbounded()
        } else {
            DueWindow::upcoming(now_utc, self.days)
        };
        let start = match &self.from {
            Some(value) => parse_bound("--from", value, now)?,
            None => default_window.start,
        };
        let end = match &self.to {
            Some(value) => parse_bound("--to", value, now)?,
            None if self.from.is_some() && !self.all => DueWindow::upcoming(start, self.days).end,
            None => default_window.end,
        };

        Ok(Some(ListCriteria {
            show_done: self.done || self.all,
            show_not_done: !self.done,
            window: DueWindow::new(start, end)?,
            patterns: self.search.clone(),
            ignore_case: self.ignore_case,
        }))
    }

    /// Database path: `--database`/`TODO_DB`, else `~/.todo.db`.
    pub fn database_path(&self) -> Result<PathBuf, CliError> {
        match &self.database {
            Some(path) => expand_home(path),
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_DB_FILE_NAME))
                .ok_or(CliError::NoHomeDir),
        }
    }

    /// Log directory: `--log-dir`/`TODO_LOG_DIR`, else the platform data dir.
    pub fn log_dir(&self) -> Option<PathBuf> {
        match &self.log_dir {
            Some(path) => expand_home(path).ok(),
            None => dirs::data_local_dir()
                .map(|dir| LOG_DIR_COMPONENTS.iter().fold(dir, |acc, part| acc.join(part))),
        }
    }
}

fn parse_bound<Tz: TimeZone>(
    flag: &'static str,
    value: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Utc>, CliError> {
    parse_date(value, now).ok_or_else(|| CliError::InvalidDate {
        flag,
        value: value.to_string(),
    })
}

fn expand_home(path: &Path) -> Result<PathBuf, CliError> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or(CliError::NoHomeDir),
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use crate::error::CliError;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use clap::Parser;
    use std::path::PathBuf;
    use todo_core::{DueWindow, ItemId};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["todo"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn bare_invocation_reads_stdin() {
        let cli = parse(&["-d", "/tmp/t.db"]);
        assert!(cli.reads_stdin());
        assert!(cli.to_request(&now()).unwrap().is_empty());
    }

    #[test]
    fn positional_items_and_ids_build_request() {
        let cli = parse(&["-d", "/tmp/t.db", "-c", "3", "-c", "4", "-r", "9", "buy milk"]);
        assert!(!cli.reads_stdin());
        let request = cli.to_request(&now()).unwrap();
        assert_eq!(request.complete, [ItemId(3), ItemId(4)]);
        assert_eq!(request.remove, [ItemId(9)]);
        assert_eq!(request.add_lines, ["buy milk"]);
        assert!(request.list.is_none());
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(Cli::try_parse_from(["todo", "-c", "0"]).is_err());
        assert!(Cli::try_parse_from(["todo", "-r", "abc"]).is_err());
    }

    #[test]
    fn default_listing_window_is_now_plus_days() {
        let criteria = parse(&["-l", "--days", "3"])
            .to_request(&now())
            .unwrap()
            .list
            .unwrap();
        assert_eq!(criteria.window, DueWindow::upcoming(now(), 3));
        assert!(criteria.show_not_done);
        assert!(!criteria.show_done);
    }

    #[test]
    fn search_implies_listing() {
        let criteria = parse(&["-s", "foo", "-s", "bar", "-i"])
            .to_request(&now())
            .unwrap()
            .list
            .unwrap();
        assert_eq!(criteria.patterns, ["foo", "bar"]);
        assert!(criteria.ignore_case);
    }

    #[test]
    fn all_and_done_flags_set_visibility() {
        let all = parse(&["-a"]).to_request(&now()).unwrap().list.unwrap();
        assert!(all.show_done && all.show_not_done);
        assert_eq!(all.window, DueWindow::unbounded());

        let done = parse(&["--done"]).to_request(&now()).unwrap().list.unwrap();
        assert!(done.show_done && !done.show_not_done);

        assert!(Cli::try_parse_from(["todo", "--done", "-a"]).is_err());
    }

    #[test]
    fn from_and_to_use_date_grammar() {
        let criteria = parse(&["--from", "2026-03-01", "--to", "friday"])
            .to_request(&now())
            .unwrap()
            .list
            .unwrap();
        assert_eq!(
            criteria.window.start,
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(
            criteria.window.end,
            Utc.with_ymd_and_hms(2026, 3, 6, 0, 0, 0).unwrap()
        );

        let from_only = parse(&["--from", "2026-03-01", "--days", "2"])
            .to_request(&now())
            .unwrap()
            .list
            .unwrap();
        assert_eq!(
            from_only.window.end,
            from_only.window.start + Duration::days(2)
        );
    }

    #[test]
    fn day_counts_beyond_a_century_are_rejected() {
        let err = Cli::try_parse_from(["todo", "-l", "--days", "100000000"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);

        let criteria = parse(&["--from", "2026-03-01", "--days", "36500"])
            .to_request(&now())
            .unwrap()
            .list
            .unwrap();
        assert!(criteria.window.end > criteria.window.start + Duration::days(36_000));
    }

    #[test]
    fn invalid_bounds_are_rejected() {
        let err = parse(&["--from", "someday"]).to_request(&now()).unwrap_err();
        assert!(matches!(err, CliError::InvalidDate { flag: "--from", .. }));

        let err = parse(&["--from", "friday", "--to", "today"])
            .to_request(&now())
            .unwrap_err();
        assert!(matches!(err, CliError::Filter(_)));
    }

    #[test]
    fn explicit_database_path_is_used() {
        let cli = parse(&["-d", "/var/tmp/items.db"]);
        assert_eq!(
            cli.database_path().unwrap(),
            PathBuf::from("/var/tmp/items.db")
        );
    }
}
