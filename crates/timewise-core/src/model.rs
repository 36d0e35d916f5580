//! Canonical timetable, attendance, and calendar types.
//!
//! These are the shapes the rest of the application consumes and persists.
//! JSON keys follow the camelCase layout the parse prompt asks the model for,
//! so an already-canonical response deserializes directly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The seven canonical day names, in week order.
pub const WEEKDAYS: [Day; 7] = [
    Day::Monday,
    Day::Tuesday,
    Day::Wednesday,
    Day::Thursday,
    Day::Friday,
    Day::Saturday,
    Day::Sunday,
];

/// Day-of-week label for a [`DaySchedule`].
///
/// Labels the model invents (e.g. "Weekend") are kept as [`Day::Other`]
/// rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
    Other(String),
}

impl Day {
    /// Map a raw day key of arbitrary case onto a canonical day.
    ///
    /// Full names and the usual abbreviations are recognised; anything else
    /// is capitalized and kept as [`Day::Other`].
    pub fn from_label(raw: &str) -> Self {
        let key = raw.trim().to_ascii_lowercase();
        match key.as_str() {
            "monday" | "mon" => Day::Monday,
            "tuesday" | "tue" | "tues" => Day::Tuesday,
            "wednesday" | "wed" => Day::Wednesday,
            "thursday" | "thu" | "thur" | "thurs" => Day::Thursday,
            "friday" | "fri" => Day::Friday,
            "saturday" | "sat" => Day::Saturday,
            "sunday" | "sun" => Day::Sunday,
            _ => Day::Other(capitalize(raw.trim())),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
            Day::Other(s) => s,
        }
    }

    /// Position in the week; unrecognised labels sort after Sunday.
    pub fn rank(&self) -> usize {
        WEEKDAYS.iter().position(|d| d == self).unwrap_or(WEEKDAYS.len())
    }

    /// Case-insensitive comparison against a raw label.
    pub fn matches(&self, raw: &str) -> bool {
        *self == Day::from_label(raw)
    }
}

impl From<String> for Day {
    fn from(s: String) -> Self {
        Day::from_label(&s)
    }
}

impl From<Day> for String {
    fn from(d: Day) -> Self {
        d.as_str().to_string()
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn capitalize(s: &str) -> String {
    let lower = s.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Session category shown on the weekly grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodKind {
    Lecture,
    Lab,
    Tutorial,
}

impl PeriodKind {
    /// Lenient parse of whatever the model wrote in a `type` field.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "lecture" | "lec" | "theory" | "l" => Some(Self::Lecture),
            "lab" | "laboratory" | "practical" | "p" => Some(Self::Lab),
            "tutorial" | "tut" | "t" => Some(Self::Tutorial),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lecture => "Lecture",
            Self::Lab => "Lab",
            Self::Tutorial => "Tutorial",
        }
    }
}

/// One scheduled session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassPeriod {
    pub id: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teacher: Option<String>,
    /// `HH:mm`, 24-hour.
    pub start_time: String,
    /// `HH:mm`, 24-hour.
    pub end_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<PeriodKind>,
}

/// A day label and its periods, ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Day,
    pub periods: Vec<ClassPeriod>,
}

impl DaySchedule {
    pub fn new(day: Day) -> Self {
        Self {
            day,
            periods: Vec::new(),
        }
    }

    /// Stable sort by start time. Valid because times are fixed-width `HH:mm`.
    pub fn sort_periods(&mut self) {
        self.periods.sort_by(|a, b| a.start_time.cmp(&b.start_time));
    }
}

/// The full weekly schedule: at most one [`DaySchedule`] per day.
pub type Timetable = Vec<DaySchedule>;

/// Per-subject attendance counts. Total is `attended + missed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub subject: String,
    pub attended: u32,
    pub missed: u32,
}

impl AttendanceRecord {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            attended: 0,
            missed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Holiday,
    Duty,
    Absence,
    Exam,
    Other,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Holiday => "Holiday",
            Self::Duty => "Duty",
            Self::Absence => "Absence",
            Self::Exam => "Exam",
            Self::Other => "Other",
        }
    }
}

/// A dated calendar entry (holiday, exam, duty...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    /// ISO 8601 date or timestamp string.
    pub date: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Move a subject's classes from one day to another.
///
/// Field names match the `reschedule_class` tool arguments, so a decoded
/// function call deserializes straight into this type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reschedule {
    pub subject: String,
    pub from_day: String,
    pub to_day: String,
}
