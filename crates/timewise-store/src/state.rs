//! The persisted application state and its pure transitions.
//!
//! Every mutation takes `&self` and returns the next state, so a caller
//! holding an older snapshot never observes a half-applied change.

use serde::{Deserialize, Serialize};
use timewise_core::{AttendanceRecord, CalendarEvent, Day, DaySchedule, Reschedule, Timetable};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub timetable: Timetable,
    #[serde(default)]
    pub attendance: Vec<AttendanceRecord>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
}

/// Outcome of a single class for attendance marking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Present,
    Absent,
}

impl AppState {
    pub fn with_timetable(&self, timetable: Timetable) -> Self {
        Self {
            timetable,
            ..self.clone()
        }
    }

    pub fn attendance_for(&self, subject: &str) -> Option<&AttendanceRecord> {
        self.attendance.iter().find(|r| r.subject == subject)
    }

    /// Count one class for `subject`, creating its record on first use.
    pub fn with_attendance_mark(&self, subject: &str, mark: Mark) -> Self {
        let mut next = self.clone();
        let record = match next.attendance.iter().position(|r| r.subject == subject) {
            Some(i) => &mut next.attendance[i],
            None => {
                next.attendance.push(AttendanceRecord::new(subject));
                let last = next.attendance.len() - 1;
                &mut next.attendance[last]
            }
        };
        match mark {
            Mark::Present => record.attended = record.attended.saturating_add(1),
            Mark::Absent => record.missed = record.missed.saturating_add(1),
        }
        next
    }

    pub fn without_attendance(&self, subject: &str) -> Self {
        let mut next = self.clone();
        next.attendance.retain(|r| r.subject != subject);
        next
    }

    /// Overwrite both counts, creating the record if needed.
    pub fn with_attendance_edit(&self, subject: &str, attended: u32, missed: u32) -> Self {
        let mut next = self.clone();
        match next.attendance.iter_mut().find(|r| r.subject == subject) {
            Some(r) => {
                r.attended = attended;
                r.missed = missed;
            }
            None => next.attendance.push(AttendanceRecord {
                subject: subject.to_string(),
                attended,
                missed,
            }),
        }
        next
    }

    /// Add a zeroed record for every timetable subject that has none yet.
    /// Existing counts are left alone.
    pub fn with_synced_attendance(&self) -> Self {
        let mut next = self.clone();
        for period in self.timetable.iter().flat_map(|d| &d.periods) {
            if next.attendance_for(&period.subject).is_none() {
                next.attendance.push(AttendanceRecord::new(period.subject.clone()));
            }
        }
        next
    }

    pub fn with_event(&self, event: CalendarEvent) -> Self {
        let mut next = self.clone();
        next.events.push(event);
        next
    }

    pub fn without_event(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.events.retain(|e| e.id != id);
        next
    }

    /// Move every period on `from_day` whose subject matches into
    /// `to_day`.
    ///
    /// Days match case-insensitively. A period matches when either subject
    /// contains the other, ignoring case, so "physics" finds "Physics Lab".
    /// Returns an unchanged copy when the source day is missing, nothing
    /// matches, or source and destination are the same day. The destination
    /// is created if needed and re-sorted by start time.
    pub fn with_rescheduled_class(&self, change: &Reschedule) -> Self {
        let needle = change.subject.trim().to_lowercase();
        let from = Day::from_label(&change.from_day);
        let to = Day::from_label(&change.to_day);
        if needle.is_empty() || from == to {
            return self.clone();
        }
        let Some(from_idx) = self.timetable.iter().position(|d| d.day == from) else {
            debug!(day = %from, "reschedule source day not in timetable");
            return self.clone();
        };

        let mut next = self.clone();
        let (moving, staying): (Vec<_>, Vec<_>) = next.timetable[from_idx]
            .periods
            .drain(..)
            .partition(|p| subject_matches(&p.subject, &needle));
        next.timetable[from_idx].periods = staying;
        if moving.is_empty() {
            return self.clone();
        }
        debug!(count = moving.len(), from = %from, to = %to, "moving periods");

        let to_idx = match next.timetable.iter().position(|d| d.day == to) {
            Some(i) => i,
            None => {
                let at = next
                    .timetable
                    .iter()
                    .position(|d| d.day.rank() > to.rank())
                    .unwrap_or(next.timetable.len());
                next.timetable.insert(at, DaySchedule::new(to));
                at
            }
        };
        let dest = &mut next.timetable[to_idx];
        dest.periods.extend(moving);
        dest.sort_periods();
        next
    }
}

fn subject_matches(subject: &str, needle: &str) -> bool {
    let subject = subject.to_lowercase();
    !subject.is_empty() && (subject.contains(needle) || needle.contains(&subject))
}
