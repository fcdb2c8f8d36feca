use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

use crate::display::format_report_duration;
use crate::session::Mode;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of one session, built once when the loop terminates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub start: DateTime<Local>,
    pub end: DateTime<Local>,
    /// Effective elapsed time, pauses excluded.
    #[serde(rename = "duration_secs", serialize_with = "as_secs_f64")]
    pub duration: Duration,
    pub mode: Mode,
    pub finished: bool,
}

fn as_secs_f64<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

impl Summary {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = &self.name {
            writeln!(f, "Name: {name}")?;
        }
        writeln!(f, "Start: {}", self.start.format(TIMESTAMP_FORMAT))?;
        writeln!(f, "End: {}", self.end.format(TIMESTAMP_FORMAT))?;
        writeln!(f, "Duration: {}", format_report_duration(self.duration))?;
        writeln!(f, "Mode: {}", self.mode)?;
        write!(f, "Finished: {}", self.finished)
    }
}
