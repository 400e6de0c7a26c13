use chrono::{ Local, NaiveDateTime, TimeZone, Utc };
use std::fmt::Display;

const DISPLAY_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: String,
    pub end: String,
    pub description: String,
}

impl CalendarEvent {
    fn is_empty(&self) -> bool {
        self.summary.is_empty() &&
            self.start.is_empty() &&
            self.end.is_empty() &&
            self.description.is_empty()
    }
}

fn set_once(field: &mut String, value: &str) {
    if field.is_empty() {
        *field = value.trim().to_string();
    }
}

/// Parses the first VEVENT block of an iCalendar document. Returns `None`
/// when no field of that block could be read.
pub fn parse_ics(content: &str) -> Option<CalendarEvent> {
    parse_ics_in(content, &Local)
}

pub fn parse_ics_in<Tz>(content: &str, tz: &Tz) -> Option<CalendarEvent>
    where Tz: TimeZone, Tz::Offset: Display
{
    let mut event = CalendarEvent::default();
    let mut in_event = false;

    for line in content.split('\n') {
        if line.starts_with("BEGIN:VEVENT") {
            in_event = true;
        } else if line.starts_with("END:VEVENT") {
            if in_event {
                break;
            }
        } else if in_event {
            if let Some(value) = line.strip_prefix("SUMMARY:") {
                set_once(&mut event.summary, value);
            } else if let Some(value) = line.strip_prefix("DTSTART:") {
                set_once(&mut event.start, value);
            } else if let Some(value) = line.strip_prefix("DTEND:") {
                set_once(&mut event.end, value);
            } else if let Some(value) = line.strip_prefix("DESCRIPTION:") {
                set_once(&mut event.description, value);
            }
        }
    }

    if event.is_empty() {
        return None;
    }
    if !event.start.is_empty() {
        event.start = format_ics_date_in(&event.start, tz);
    }
    if !event.end.is_empty() {
        event.end = format_ics_date_in(&event.end, tz);
    }
    Some(event)
}

fn parse_compact(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.strip_suffix('Z').unwrap_or(raw);
    let digits: String = if raw.len() == 15 && raw.as_bytes()[8] == b'T' {
        format!("{}{}", &raw[..8], &raw[9..])
    } else {
        raw.to_string()
    };
    if digits.len() != 14 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDateTime::parse_from_str(&digits, "%Y%m%d%H%M%S").ok()
}

/// Renders a compact UTC timestamp for display in `tz`. Anything that does
/// not parse is returned unchanged.
pub fn format_ics_date_in<Tz>(raw: &str, tz: &Tz) -> String
    where Tz: TimeZone, Tz::Offset: Display
{
    match parse_compact(raw) {
        Some(naive) =>
            Utc.from_utc_datetime(&naive).with_timezone(tz).format(DISPLAY_FORMAT).to_string(),
        None => raw.to_string(),
    }
}
