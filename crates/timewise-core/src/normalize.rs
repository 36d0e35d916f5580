//! Normalisation of raw model output into the canonical [`Timetable`].
//!
//! The model answers in whichever shape the prompt of the day coaxed out of
//! it. Two top-level shapes are accepted:
//!
//! - an array of `{ "day", "periods" }` objects (already canonical), and
//! - an object keyed by day name, each value an array of cell entries,
//!   optionally with a `legend` key describing course codes.
//!
//! Each cell entry is classified by which fields it carries:
//!
//! | Fields                   | Variant                    | Times from            |
//! |--------------------------|----------------------------|-----------------------|
//! | `start` + `end`          | [`RawEntry::Explicit`]     | the strings, normalised |
//! | `start_col` + `end_col`  | [`RawEntry::ColumnSpan`]   | [`grid::COLUMNS`]     |
//! | `slot`                   | [`RawEntry::Slot`]         | [`grid::slot_times`]  |
//!
//! Entries that cannot be read are dropped with a warning; only a wrong
//! top-level shape fails the whole pass.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::clock::{TimePolicy, is_canonical_time, normalize_time_with};
use crate::codes::split_course_codes;
use crate::grid;
use crate::model::{ClassPeriod, Day, DaySchedule, PeriodKind, Timetable};

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unexpected response shape: {0}")]
    Structure(String),
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeOptions {
    pub time_policy: TimePolicy,
}

const WRAPPER_KEYS: &[&str] = &["timetable", "schedule", "days"];
const LEGEND_KEY: &str = "legend";

const ID_KEYS: &[&str] = &["id"];
const CODE_KEYS: &[&str] = &["code", "subject", "course_code", "courseCode"];
const NAME_KEYS: &[&str] = &["name", "course_name", "courseName", "course"];
const TEACHER_KEYS: &[&str] = &["teacher", "teacher_name", "teacherName", "faculty"];
const ROOM_KEYS: &[&str] = &["room", "hall", "venue", "location"];
const KIND_KEYS: &[&str] = &["type", "kind", "category"];
const START_KEYS: &[&str] = &["start", "startTime", "start_time"];
const END_KEYS: &[&str] = &["end", "endTime", "end_time"];
const START_COL_KEYS: &[&str] = &["start_col", "startCol"];
const END_COL_KEYS: &[&str] = &["end_col", "endCol"];
const SLOT_KEYS: &[&str] = &["slot"];

/// Remove markdown code fences the model wraps around JSON despite being
/// told not to.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Parse and normalise the raw response text.
pub fn normalize_text(text: &str, opts: &NormalizeOptions) -> Result<Timetable, NormalizeError> {
    let cleaned = strip_code_fences(text);
    let value: Value = serde_json::from_str(&cleaned)?;
    normalize_value(&value, opts)
}

/// Normalise an already-parsed response.
pub fn normalize_value(value: &Value, opts: &NormalizeOptions) -> Result<Timetable, NormalizeError> {
    let raw = RawTimetable::detect(value)?;
    let days = match raw {
        RawTimetable::Canonical(items) => from_canonical(items, opts)?,
        RawTimetable::DayKeyed { days, legend } => from_day_keyed(days, &legend, opts)?,
    };
    Ok(assemble(days))
}

// ── Top-level shape ──

enum RawTimetable<'a> {
    Canonical(&'a [Value]),
    DayKeyed {
        days: Vec<(&'a str, &'a Value)>,
        legend: Legend,
    },
}

impl<'a> RawTimetable<'a> {
    fn detect(value: &'a Value) -> Result<Self, NormalizeError> {
        match value {
            Value::Array(items) => Ok(Self::Canonical(items)),
            Value::Object(obj) => {
                if let Some(inner) = unwrap_wrapper(obj) {
                    let mut detected = Self::detect(inner)?;
                    if let Self::DayKeyed { legend, .. } = &mut detected
                        && legend.is_empty()
                    {
                        *legend = Legend::from_value(obj.get(LEGEND_KEY));
                    }
                    return Ok(detected);
                }
                let days: Vec<(&str, &Value)> = obj
                    .iter()
                    .filter(|(k, _)| k.as_str() != LEGEND_KEY)
                    .map(|(k, v)| (k.as_str(), v))
                    .collect();
                if days.is_empty() {
                    return Err(NormalizeError::Structure(
                        "object has no day entries".to_string(),
                    ));
                }
                Ok(Self::DayKeyed {
                    days,
                    legend: Legend::from_value(obj.get(LEGEND_KEY)),
                })
            }
            other => Err(NormalizeError::Structure(format!(
                "expected an array of days or a day-keyed object, got {}",
                json_kind(other)
            ))),
        }
    }
}

/// `{"timetable": ...}` style wrappers, unless the object also has day keys.
fn unwrap_wrapper(obj: &Map<String, Value>) -> Option<&Value> {
    let has_day_key = obj
        .keys()
        .any(|k| !matches!(Day::from_label(k), Day::Other(_)));
    if has_day_key {
        return None;
    }
    WRAPPER_KEYS
        .iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| v.is_array() || v.is_object())
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── Legend ──

#[derive(Debug, Clone, Default)]
struct LegendEntry {
    name: Option<String>,
    teacher: Option<String>,
}

/// Per-code course name and teacher, keyed by [`legend_key`].
#[derive(Debug, Clone, Default)]
struct Legend(HashMap<String, LegendEntry>);

impl Legend {
    /// Accepts `{"CODE": {"name", "teacher"}}`, `{"CODE": "name"}`, or
    /// `[{"code", "name", "teacher"}]`.
    fn from_value(value: Option<&Value>) -> Self {
        let mut map = HashMap::new();
        match value {
            Some(Value::Object(obj)) => {
                for (code, v) in obj {
                    let entry = match v {
                        Value::String(name) => LegendEntry {
                            name: non_empty(name),
                            teacher: None,
                        },
                        Value::Object(fields) => LegendEntry {
                            name: str_field(fields, NAME_KEYS),
                            teacher: str_field(fields, TEACHER_KEYS),
                        },
                        _ => continue,
                    };
                    map.insert(legend_key(code), entry);
                }
            }
            Some(Value::Array(items)) => {
                for fields in items.iter().filter_map(Value::as_object) {
                    let Some(code) = str_field(fields, CODE_KEYS) else {
                        continue;
                    };
                    map.insert(
                        legend_key(&code),
                        LegendEntry {
                            name: str_field(fields, NAME_KEYS),
                            teacher: str_field(fields, TEACHER_KEYS),
                        },
                    );
                }
            }
            _ => {}
        }
        Self(map)
    }

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn get(&self, code: &str) -> Option<&LegendEntry> {
        self.0.get(&legend_key(code))
    }
}

/// Uppercase with whitespace removed, so "cedx 01" finds "CEDX01".
fn legend_key(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

// ── Cell entries ──

/// Descriptive fields shared by every entry shape.
#[derive(Debug, Clone)]
struct Cell {
    id: Option<String>,
    code: String,
    name: Option<String>,
    teacher: Option<String>,
    room: Option<String>,
    kind: Option<PeriodKind>,
}

#[derive(Debug, Clone)]
enum RawEntry {
    Explicit {
        cell: Cell,
        start: String,
        end: String,
    },
    ColumnSpan {
        cell: Cell,
        start_col: u32,
        end_col: u32,
    },
    Slot {
        cell: Cell,
        slot: u32,
    },
}

impl RawEntry {
    /// Classify an entry by the fields present. `Err` carries the reason it
    /// was unreadable.
    fn classify(value: &Value) -> Result<Self, String> {
        let fields = value
            .as_object()
            .ok_or_else(|| format!("entry is {}, not an object", json_kind(value)))?;
        let code = str_field(fields, CODE_KEYS).ok_or("entry has no course code")?;
        let cell = Cell {
            id: str_field(fields, ID_KEYS),
            code,
            name: str_field(fields, NAME_KEYS),
            teacher: str_field(fields, TEACHER_KEYS),
            room: str_field(fields, ROOM_KEYS),
            kind: str_field(fields, KIND_KEYS).and_then(|k| PeriodKind::parse_loose(&k)),
        };

        if let (Some(start), Some(end)) = (time_field(fields, START_KEYS), time_field(fields, END_KEYS))
        {
            return Ok(Self::Explicit { cell, start, end });
        }
        if let (Some(start_col), Some(end_col)) =
            (u32_field(fields, START_COL_KEYS), u32_field(fields, END_COL_KEYS))
        {
            return Ok(Self::ColumnSpan {
                cell,
                start_col,
                end_col,
            });
        }
        if let Some(slot) = u32_field(fields, SLOT_KEYS) {
            return Ok(Self::Slot { cell, slot });
        }
        Err(format!("entry for {} has no start/end, columns, or slot", cell.code))
    }
}

/// Whether an entry came from a canonical array (codes and well-formed
/// times are kept verbatim) or from a day-keyed grid dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Canonical,
    Grid,
}

fn from_canonical(
    items: &[Value],
    opts: &NormalizeOptions,
) -> Result<Vec<(Day, Vec<ClassPeriod>)>, NormalizeError> {
    let mut days = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        let fields = item.as_object().ok_or_else(|| {
            NormalizeError::Structure(format!("day {i} is {}, not an object", json_kind(item)))
        })?;
        let label = fields
            .get("day")
            .and_then(Value::as_str)
            .ok_or_else(|| NormalizeError::Structure(format!("day {i} has no \"day\" label")))?;
        let day = Day::from_label(label);
        let entries: &[Value] = match fields.get("periods") {
            Some(Value::Array(entries)) => entries.as_slice(),
            None | Some(Value::Null) => &[],
            Some(other) => {
                return Err(NormalizeError::Structure(format!(
                    "periods for {day} is {}, not an array",
                    json_kind(other)
                )));
            }
        };
        let periods = expand_entries(&day, entries, Origin::Canonical, &Legend::default(), opts);
        days.push((day, periods));
    }
    Ok(days)
}

fn from_day_keyed(
    raw_days: Vec<(&str, &Value)>,
    legend: &Legend,
    opts: &NormalizeOptions,
) -> Result<Vec<(Day, Vec<ClassPeriod>)>, NormalizeError> {
    let mut days = Vec::with_capacity(raw_days.len());
    for (key, value) in raw_days {
        let Some(entries) = value.as_array() else {
            warn!(key, kind = json_kind(value), "day value is not an array, skipping");
            continue;
        };
        let day = Day::from_label(key);
        let periods = expand_entries(&day, entries, Origin::Grid, legend, opts);
        days.push((day, periods));
    }
    if days.is_empty() {
        return Err(NormalizeError::Structure(
            "no key holds an array of entries".to_string(),
        ));
    }
    Ok(days)
}

fn expand_entries(
    day: &Day,
    entries: &[Value],
    origin: Origin,
    legend: &Legend,
    opts: &NormalizeOptions,
) -> Vec<ClassPeriod> {
    let mut periods = Vec::new();
    for value in entries {
        match RawEntry::classify(value) {
            Ok(entry) => periods.extend(expand_entry(day, entry, origin, legend, opts)),
            Err(reason) => warn!(day = %day, reason = %reason, "dropping timetable entry"),
        }
    }
    periods
}

fn expand_entry(
    day: &Day,
    entry: RawEntry,
    origin: Origin,
    legend: &Legend,
    opts: &NormalizeOptions,
) -> Vec<ClassPeriod> {
    let (cell, times) = match entry {
        RawEntry::Explicit { cell, start, end } => {
            let times = explicit_times(&start, &end, origin, &opts.time_policy);
            if times.is_none() {
                warn!(day = %day, code = %cell.code, start = %start, end = %end, "unreadable time, dropping entry");
            }
            (cell, times)
        }
        RawEntry::ColumnSpan {
            cell,
            start_col,
            end_col,
        } => {
            let times = column_times(start_col, end_col);
            if times.is_none() {
                debug!(day = %day, code = %cell.code, start_col, end_col, "entry touches a break column, skipping");
            }
            (cell, times)
        }
        RawEntry::Slot { cell, slot } => {
            let times = grid::slot_times(slot).map(|(s, e)| (s.to_string(), e.to_string()));
            if times.is_none() {
                debug!(day = %day, code = %cell.code, slot, "unknown slot, skipping");
            }
            (cell, times)
        }
    };

    let Some((start_time, end_time)) = times else {
        return Vec::new();
    };
    if start_time >= end_time {
        warn!(day = %day, code = %cell.code, start = %start_time, end = %end_time, "start is not before end, dropping entry");
        return Vec::new();
    }

    let codes = match origin {
        Origin::Canonical => vec![cell.code.clone()],
        Origin::Grid => split_course_codes(&cell.code),
    };
    let keep_id = codes.len() == 1;

    codes
        .into_iter()
        .map(|code| {
            let known = legend.get(&code);
            ClassPeriod {
                id: cell
                    .id
                    .clone()
                    .filter(|_| keep_id)
                    .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
                course_name: known
                    .and_then(|l| l.name.clone())
                    .or_else(|| cell.name.clone()),
                teacher: known
                    .and_then(|l| l.teacher.clone())
                    .or_else(|| cell.teacher.clone()),
                subject: code,
                start_time: start_time.clone(),
                end_time: end_time.clone(),
                room: cell.room.clone(),
                kind: cell.kind,
            }
        })
        .collect()
}

fn explicit_times(
    start: &str,
    end: &str,
    origin: Origin,
    policy: &TimePolicy,
) -> Option<(String, String)> {
    let one = |raw: &str| {
        let raw = raw.trim();
        if origin == Origin::Canonical && is_canonical_time(raw) {
            Some(raw.to_string())
        } else {
            normalize_time_with(raw, policy)
        }
    };
    Some((one(start)?, one(end)?))
}

fn column_times(start_col: u32, end_col: u32) -> Option<(String, String)> {
    let start = grid::column_start(start_col)?;
    let end = grid::column_end(end_col)?;
    Some((start.to_string(), end.to_string()))
}

// ── Assembly ──

/// Merge repeated day labels, sort each day by start time, and order days
/// Monday..Sunday with unrecognised labels last in first-seen order.
/// Repeated ids are replaced so every id in the pass is unique.
fn assemble(raw_days: Vec<(Day, Vec<ClassPeriod>)>) -> Timetable {
    let mut timetable: Timetable = Vec::new();
    for (day, periods) in raw_days {
        match timetable.iter_mut().find(|d| d.day == day) {
            Some(existing) => existing.periods.extend(periods),
            None => timetable.push(DaySchedule { day, periods }),
        }
    }
    for schedule in &mut timetable {
        schedule.sort_periods();
    }
    timetable.sort_by_key(|d| d.day.rank());

    // Models sometimes echo one placeholder id for every period.
    let mut seen = HashSet::new();
    for period in timetable.iter_mut().flat_map(|d| d.periods.iter_mut()) {
        if !seen.insert(period.id.clone()) {
            period.id = uuid::Uuid::new_v4().to_string();
            seen.insert(period.id.clone());
        }
    }
    timetable
}

// ── Field access ──

fn str_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match fields.get(*k)? {
        Value::String(s) => non_empty(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Like [`str_field`], but a fractional number is read as `hour.minute`
/// with two minute digits, so `9.3` means 09:30.
fn time_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| match fields.get(*k)? {
        Value::Number(n) if n.is_f64() => n.as_f64().map(|f| format!("{f:.2}")),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => non_empty(s),
        _ => None,
    })
}

fn u32_field(fields: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    keys.iter().find_map(|k| match fields.get(*k)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn normalize(v: Value) -> Timetable {
        normalize_value(&v, &NormalizeOptions::default()).expect("normalize failed")
    }

    fn subjects(day: &DaySchedule) -> Vec<&str> {
        day.periods.iter().map(|p| p.subject.as_str()).collect()
    }

    #[test]
    fn multi_code_cell_splits() {
        let tt = normalize(json!({
            "monday": [{
                "code": "CEDX 01/07", "name": "X", "teacher": "Y",
                "start": "9:00", "end": "9:50", "hall": "Z"
            }]
        }));
        assert_eq!(tt.len(), 1);
        let monday = &tt[0];
        assert_eq!(monday.day, Day::Monday);
        assert_eq!(subjects(monday), vec!["CEDX 01", "CEDX 07"]);
        for p in &monday.periods {
            assert_eq!(p.start_time, "09:00");
            assert_eq!(p.end_time, "09:50");
            assert_eq!(p.course_name.as_deref(), Some("X"));
            assert_eq!(p.teacher.as_deref(), Some("Y"));
            assert_eq!(p.room.as_deref(), Some("Z"));
        }
        assert_ne!(monday.periods[0].id, monday.periods[1].id);
    }

    #[test]
    fn column_span_uses_lookup() {
        let tt = normalize(json!({
            "tuesday": [{ "code": "MATH 2", "start_col": 4, "end_col": 5 }]
        }));
        let p = &tt[0].periods[0];
        assert_eq!(p.start_time, "11:00");
        assert_eq!(p.end_time, "12:40");
    }

    #[test]
    fn column_numbers_as_strings() {
        let tt = normalize(json!({
            "tuesday": [{ "code": "MATH 2", "startCol": "7", "endCol": "8" }]
        }));
        assert_eq!(tt[0].periods[0].start_time, "13:30");
        assert_eq!(tt[0].periods[0].end_time, "15:10");
    }

    #[test]
    fn break_columns_emit_nothing() {
        let tt = normalize(json!({
            "wednesday": [
                { "code": "BRK", "start_col": 3, "end_col": 3 },
                { "code": "LUNCH", "start_col": 5, "end_col": 6 },
                { "code": "OUT", "start_col": 11, "end_col": 12 },
                { "code": "PHY 1", "start_col": 1, "end_col": 2 }
            ]
        }));
        assert_eq!(subjects(&tt[0]), vec!["PHY 1"]);
    }

    #[test]
    fn slot_numbers_use_tables() {
        let tt = normalize(json!({
            "fri": [
                { "code": "CHEM", "slot": 5 },
                { "code": "BIO", "slot": 1 },
                { "code": "NOPE", "slot": 12 }
            ]
        }));
        let friday = &tt[0];
        assert_eq!(friday.day, Day::Friday);
        assert_eq!(subjects(friday), vec!["BIO", "CHEM"]);
        assert_eq!(friday.periods[1].start_time, "13:30");
        assert_eq!(friday.periods[1].end_time, "14:20");
    }

    #[test]
    fn legend_supplies_per_code_details() {
        let tt = normalize(json!({
            "monday": [{ "code": "CEDX 01+07", "name": "Shared", "slot": 1 }],
            "legend": {
                "CEDX 07": { "name": "Design Studio", "teacher": "Dr. Rao" },
                "cedx01": "Engineering Drawing"
            }
        }));
        let monday = &tt[0];
        assert_eq!(monday.periods.len(), 2);
        let by_code: HashMap<&str, &ClassPeriod> =
            monday.periods.iter().map(|p| (p.subject.as_str(), p)).collect();
        assert_eq!(by_code["CEDX 01"].course_name.as_deref(), Some("Engineering Drawing"));
        assert_eq!(by_code["CEDX 07"].course_name.as_deref(), Some("Design Studio"));
        assert_eq!(by_code["CEDX 07"].teacher.as_deref(), Some("Dr. Rao"));
    }

    #[test]
    fn legend_as_array() {
        let tt = normalize(json!({
            "Monday": [{ "code": "ECO 3", "slot": 2 }],
            "legend": [{ "code": "ECO 3", "name": "Economics", "teacher": "Ms. Iyer" }]
        }));
        assert_eq!(tt[0].periods[0].course_name.as_deref(), Some("Economics"));
        assert_eq!(tt[0].periods[0].teacher.as_deref(), Some("Ms. Iyer"));
    }

    #[test]
    fn wrapper_object_unwrapped() {
        let tt = normalize(json!({
            "timetable": { "thursday": [{ "code": "HIST", "start": "2:00", "end": "2:50" }] }
        }));
        assert_eq!(tt[0].day, Day::Thursday);
        assert_eq!(tt[0].periods[0].start_time, "14:00");
    }

    #[test]
    fn days_merge_and_sort_in_week_order() {
        let tt = normalize(json!({
            "FRIDAY": [{ "code": "A", "slot": 2 }],
            "monday": [{ "code": "B", "slot": 3 }],
            "Monday": [{ "code": "C", "slot": 1 }],
            "weekend": [{ "code": "D", "slot": 1 }]
        }));
        let days: Vec<&str> = tt.iter().map(|d| d.day.as_str()).collect();
        assert_eq!(days, vec!["Monday", "Friday", "Weekend"]);
        assert_eq!(subjects(&tt[0]), vec!["C", "B"]);
    }

    #[test]
    fn canonical_array_passes_through() {
        let tt = normalize(json!([
            {
                "day": "tuesday",
                "periods": [
                    { "id": "p2", "subject": "Physics", "startTime": "11:00", "endTime": "12:00", "type": "Lab" },
                    { "id": "p1", "subject": "Math/Stats", "startTime": "09:00", "endTime": "10:00", "room": "101" }
                ]
            }
        ]));
        assert_eq!(tt[0].day, Day::Tuesday);
        assert_eq!(subjects(&tt[0]), vec!["Math/Stats", "Physics"]);
        assert_eq!(tt[0].periods[0].id, "p1");
        assert_eq!(tt.len(), 1);
        assert_eq!(tt[0].periods[1].kind, Some(PeriodKind::Lab));
    }

    #[test]
    fn canonical_keeps_valid_early_times() {
        let tt = normalize(json!([
            { "day": "Monday", "periods": [
                { "subject": "Night lab", "startTime": "02:00", "endTime": "04:00" },
                { "subject": "Sloppy", "startTime": "2:00", "endTime": "2:50" }
            ]}
        ]));
        assert_eq!(tt[0].periods[0].start_time, "02:00");
        assert_eq!(tt[0].periods[1].start_time, "14:00");
    }

    #[test]
    fn canonical_assigns_missing_ids() {
        let tt = normalize(json!([
            { "day": "Monday", "periods": [
                { "subject": "A", "startTime": "09:00", "endTime": "10:00" },
                { "subject": "B", "startTime": "10:00", "endTime": "11:00" }
            ]}
        ]));
        let ids: Vec<&str> = tt[0].periods.iter().map(|p| p.id.as_str()).collect();
        assert!(ids.iter().all(|id| !id.is_empty()));
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn canonical_normalization_is_idempotent() {
        let raw = json!([
            { "day": "wed", "periods": [
                { "subject": "Z", "startTime": "3:00", "endTime": "3:50" },
                { "subject": "Y", "startTime": "09:00", "endTime": "09:50", "room": "B2" }
            ]},
            { "day": "MONDAY", "periods": [] }
        ]);
        let once = normalize(raw);
        let twice = normalize(serde_json::to_value(&once).unwrap());
        assert_eq!(once, twice);
    }

    #[test]
    fn unreadable_entries_dropped() {
        let tt = normalize(json!({
            "monday": [
                { "name": "no code", "start": "9:00", "end": "9:50" },
                { "code": "BAD", "start": "noon", "end": "1:00" },
                { "code": "BACKWARDS", "start": "11:00", "end": "10:00" },
                { "code": "NOTIME" },
                "free period",
                { "code": "OK", "start": "10:00", "end": "10:50" }
            ]
        }));
        assert_eq!(subjects(&tt[0]), vec!["OK"]);
    }

    #[test]
    fn text_with_code_fences() {
        let text = "```json\n{\"monday\": [{\"code\": \"A\", \"slot\": 1}]}\n```";
        let tt = normalize_text(text, &NormalizeOptions::default()).unwrap();
        assert_eq!(subjects(&tt[0]), vec!["A"]);
    }

    #[test]
    fn invalid_json_is_error() {
        let err = normalize_text("Sorry, I cannot read this image.", &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Json(_)));
    }

    #[test]
    fn wrong_shapes_are_structural_errors() {
        let opts = NormalizeOptions::default();
        for v in [
            json!("just text"),
            json!(42),
            json!({}),
            json!({ "error": "could not parse" }),
            json!([{ "periods": [] }]),
            json!([1, 2, 3]),
        ] {
            let err = normalize_value(&v, &opts).unwrap_err();
            assert!(matches!(err, NormalizeError::Structure(_)), "{v} -> {err:?}");
        }
    }

    #[test]
    fn non_array_day_values_skipped() {
        let tt = normalize(json!({
            "monday": [{ "code": "CEDX 01/07", "start": "9:00", "end": "9:50" }],
            "saturday": null,
            "sunday": "No classes"
        }));
        assert_eq!(tt.len(), 1);
        assert_eq!(subjects(&tt[0]), vec!["CEDX 01", "CEDX 07"]);

        let err = normalize_value(&json!({ "status": "unreadable" }), &NormalizeOptions::default())
            .unwrap_err();
        assert!(matches!(err, NormalizeError::Structure(_)));
    }

    #[test]
    fn repeated_ids_replaced() {
        let tt = normalize(json!([
            { "day": "Monday", "periods": [
                { "id": "uuid", "subject": "A", "startTime": "09:00", "endTime": "10:00" },
                { "id": "uuid", "subject": "B", "startTime": "10:00", "endTime": "11:00" }
            ]},
            { "day": "Tuesday", "periods": [
                { "id": "uuid", "subject": "C", "startTime": "09:00", "endTime": "10:00" }
            ]}
        ]));
        let ids: HashSet<&str> = tt
            .iter()
            .flat_map(|d| &d.periods)
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(ids.len(), 3);
        assert_eq!(tt[0].periods[0].id, "uuid");
    }

    #[test]
    fn numeric_times_keep_minutes() {
        let tt = normalize(json!({
            "monday": [
                { "code": "A", "start": 9.30, "end": 10.20 },
                { "code": "B", "start": 11, "end": 12 }
            ]
        }));
        let times: Vec<(&str, &str)> = tt[0]
            .periods
            .iter()
            .map(|p| (p.start_time.as_str(), p.end_time.as_str()))
            .collect();
        assert_eq!(times, vec![("09:30", "10:20"), ("11:00", "12:00")]);
    }

    #[test]
    fn empty_array_is_empty_timetable() {
        assert!(normalize(json!([])).is_empty());
    }

    #[test]
    fn literal_policy_reaches_entries() {
        let opts = NormalizeOptions {
            time_policy: TimePolicy::literal(),
        };
        let v = json!({ "monday": [{ "code": "EARLY", "start": "5:00", "end": "5:50" }] });
        let tt = normalize_value(&v, &opts).unwrap();
        assert_eq!(tt[0].periods[0].start_time, "05:00");
    }

    proptest! {
        #[test]
        fn periods_sorted_within_day(
            starts in proptest::collection::vec((0u8..23, 0u8..59), 1..12)
        ) {
            let entries: Vec<Value> = starts
                .iter()
                .enumerate()
                .map(|(i, (h, m))| json!({
                    "code": format!("C{i}"),
                    "start": format!("{h:02}:{m:02}"),
                    "end": format!("{:02}:{m:02}", h + 1),
                }))
                .collect();
            let tt = normalize_value(&json!({ "monday": entries }), &NormalizeOptions {
                time_policy: TimePolicy::literal(),
            }).unwrap();
            for day in &tt {
                for pair in day.periods.windows(2) {
                    prop_assert!(pair[0].start_time <= pair[1].start_time);
                }
            }
        }

        #[test]
        fn break_column_entries_emit_nothing(
            start_col in prop_oneof![Just(3u32), Just(6u32), 11u32..100],
            end_col in 1u32..100,
        ) {
            let v = json!({ "monday": [{ "code": "X", "start_col": start_col, "end_col": end_col }] });
            let tt = normalize_value(&v, &NormalizeOptions::default()).unwrap();
            prop_assert!(tt.iter().all(|d| d.periods.is_empty()));
        }
    }
}
