//! Date expression grammar used by item lines and listing windows.
//!
//! Accepted forms (case-insensitive):
//! - `today`, `tomorrow`, `yesterday`, weekday names (`fri`, `friday`), each
//!   optionally followed by a time (`tomorrow 17:30`, `friday at 9:00`)
//! - `in N minutes|hours|days|weeks`
//! - `YYYY-MM-DD`, `YYYY/MM/DD`, `MM/DD/YYYY`, optionally followed by a time
//! - `YYYY-MM-DDTHH:MM[:SS]`
//! - a bare time `HH:MM[:SS]` (today)
//!
//! Date-only forms resolve to local midnight in the time zone of `now`.

use chrono::{
    DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc, Weekday,
};
use once_cell::sync::Lazy;
use regex::Regex;

static RELATIVE_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^in\s+(\d{1,4})\s*(minutes?|mins?|hours?|hrs?|h|days?|d|weeks?|w)$")
        .expect("valid relative offset regex")
});
static NAMED_DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]+)(?:\s+(?:at\s+)?(\d{1,2}:\d{2}(?::\d{2})?))?$")
        .expect("valid named day regex")
});
static CLOCK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}:\d{2}(?::\d{2})?$").expect("valid clock regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses a date expression relative to `now`.
///
/// Returns `None` when the segment is empty or matches no accepted form, or
/// when the local time does not exist in `now`'s zone (DST gap).
pub fn parse_date<Tz: TimeZone>(segment: &str, now: &DateTime<Tz>) -> Option<DateTime<Utc>> {
    let normalized = WHITESPACE_RE
        .replace_all(segment.trim(), " ")
        .to_ascii_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(offset) = parse_relative_offset(&normalized) {
        return Some(now.with_timezone(&Utc) + offset);
    }

    let local = parse_named_day(&normalized, now)
        .or_else(|| parse_clock(&normalized).map(|time| now.date_naive().and_time(time)))
        .or_else(|| parse_absolute(&normalized))?;

    now.timezone()
        .from_local_datetime(&local)
        .earliest()
        .map(|resolved| resolved.with_timezone(&Utc))
}

fn parse_relative_offset(value: &str) -> Option<Duration> {
    let captures = RELATIVE_OFFSET_RE.captures(value)?;
    let amount: i64 = captures.get(1)?.as_str().parse().ok()?;
    let unit = captures.get(2)?.as_str();
    match unit.chars().next()? {
        'm' => Some(Duration::minutes(amount)),
        'h' => Some(Duration::hours(amount)),
        'd' => Some(Duration::days(amount)),
        'w' => Some(Duration::weeks(amount)),
        _ => None,
    }
}

fn parse_named_day<Tz: TimeZone>(value: &str, now: &DateTime<Tz>) -> Option<NaiveDateTime> {
    let captures = NAMED_DAY_RE.captures(value)?;
    let today = now.date_naive();
    let day = match captures.get(1)?.as_str() {
        "today" | "tonight" => today,
        "tomorrow" => today.succ_opt()?,
        "yesterday" => today.pred_opt()?,
        other => next_weekday(today, other.parse::<Weekday>().ok()?)?,
    };
    let time = match captures.get(2) {
        Some(clock) => parse_clock(clock.as_str())?,
        None => NaiveTime::MIN,
    };
    Some(day.and_time(time))
}

/// Next occurrence of `weekday` strictly after `today`.
fn next_weekday(today: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let current = i64::from(today.weekday().num_days_from_monday());
    let target = i64::from(weekday.num_days_from_monday());
    let mut ahead = (target - current).rem_euclid(7);
    if ahead == 0 {
        ahead = 7;
    }
    today.checked_add_signed(Duration::days(ahead))
}

fn parse_clock(value: &str) -> Option<NaiveTime> {
    if !CLOCK_RE.is_match(value) {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .ok()
}

fn parse_absolute(value: &str) -> Option<NaiveDateTime> {
    let upper = value.to_ascii_uppercase();
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(&upper, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
}
