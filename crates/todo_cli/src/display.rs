//! Human-readable listing lines.
//!
//! Layout: `{id:>3}{marker} {due} -- {text}` where marker is `X` for done,
//! `!` for overdue and a space for pending, and due is `YYYY-MM-DD HH:MM`
//! in the display zone or `whenever`.

use chrono::{Local, TimeZone};
use std::fmt::Display;
use todo_core::{Listed, Marker};

const DUE_FORMAT: &str = "%Y-%m-%d %H:%M";
const NO_DUE: &str = "whenever";

pub fn format_item(entry: &Listed) -> String {
    format_item_in(entry, &Local)
}

pub fn format_item_in<Tz>(entry: &Listed, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let id = entry
        .item
        .id
        .map_or_else(|| "?".to_string(), |id| id.to_string());
    let due = entry.item.due.map_or_else(
        || NO_DUE.to_string(),
        |due| due.with_timezone(zone).format(DUE_FORMAT).to_string(),
    );
    format!(
        "{id:>3}{} {due} -- {}",
        marker_char(entry.marker),
        entry.item.text
    )
}

fn marker_char(marker: Marker) -> char {
    match marker {
        Marker::Done => 'X',
        Marker::Overdue => '!',
        Marker::Pending => ' ',
    }
}
