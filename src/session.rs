use chrono::{DateTime, Local};
use std::fmt::Write as _;

/// Format used for `Date:` lines and for sessions saved from the timer.
pub const DATE_FMT: &str = "%Y-%m-%d %H:%M:%S";
pub const TERMINATOR: &str = "----------------------------------------";

const DATE_PREFIX: &str = "Date:";
const NAME_PREFIX: &str = "Session:";
const DESCRIPTION_PREFIX: &str = "Description:";
const DURATION_PREFIX: &str = "Duration:";

/// Surrogate key handed out by the store. Not written to the log.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkSession {
    pub id: SessionId,
    pub name: String,
    pub description: String,
    pub date_string: String,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub duration_minutes: f64,
}

impl WorkSession {
    pub fn new(name: impl Into<String>, description: impl Into<String>, duration_minutes: f64) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            duration_minutes,
            ..Self::default()
        }
    }

    /// Recorded duration when positive, otherwise the span between start and end.
    pub fn duration_in_minutes(&self) -> f64 {
        if self.duration_minutes > 0.0 {
            return self.duration_minutes;
        }
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => (end - start).num_milliseconds() as f64 / 60_000.0,
            _ => 0.0,
        }
    }

    /// One-line summary used by the side panel and `--list`.
    pub fn subtitle(&self) -> String {
        let minutes = format!("{:.1} min", self.duration_in_minutes());
        if self.date_string.is_empty() {
            minutes
        } else {
            format!("{} • {}", self.date_string, minutes)
        }
    }
}

pub fn now_string() -> String {
    Local::now().format(DATE_FMT).to_string()
}

fn field<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
}

fn parse_minutes(rest: &str) -> f64 {
    rest.split_whitespace()
        .next()
        .and_then(|token| token.parse::<f64>().ok())
        .unwrap_or(0.0)
}

/// Parses a whole work log. Records without a name are dropped.
///
/// Ids are left at their default; the store assigns them.
pub fn parse_log(text: &str) -> Vec<WorkSession> {
    let mut sessions = Vec::new();
    let mut current = WorkSession::default();

    let mut flush = |current: &mut WorkSession| {
        let done = std::mem::take(current);
        if !done.name.is_empty() {
            sessions.push(done);
        }
    };

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(date) = field(line, DATE_PREFIX) {
            current.date_string = date.to_string();
        } else if let Some(name) = field(line, NAME_PREFIX) {
            current.name = name.to_string();
        } else if let Some(description) = field(line, DESCRIPTION_PREFIX) {
            current.description = description.to_string();
        } else if let Some(rest) = field(line, DURATION_PREFIX) {
            current.duration_minutes = parse_minutes(rest);
        } else if line.contains("---") {
            flush(&mut current);
        }
    }
    flush(&mut current);

    sessions
}

/// Appends one record. `date` replaces an empty `date_string`.
pub fn write_record(out: &mut String, session: &WorkSession, date: &str) {
    let date = if session.date_string.is_empty() { date } else { session.date_string.as_str() };
    let _ = writeln!(out, "{DATE_PREFIX} {date}");
    let _ = writeln!(out, "{NAME_PREFIX} {}", session.name);
    let _ = writeln!(out, "{DESCRIPTION_PREFIX} {}", session.description);
    let _ = writeln!(out, "{DURATION_PREFIX} {} minutes", session.duration_in_minutes());
    out.push_str(TERMINATOR);
    out.push('\n');
}

pub fn format_log(sessions: &[WorkSession], date: &str) -> String {
    let mut out = String::new();
    for session in sessions {
        write_record(&mut out, session, date);
    }
    out
}
