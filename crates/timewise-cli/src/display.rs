//! Plain-text rendering of the timetable, attendance cards, and events.

use timewise_core::{AttendanceRecord, CalendarEvent, ClassPeriod, Standing, Timetable};

// ── Public API ──

pub fn print_timetable(timetable: &Timetable) {
    if timetable.iter().all(|d| d.periods.is_empty()) {
        println!("No timetable yet. Run `timewise parse <IMAGE>` first.");
        return;
    }
    for day in timetable {
        if day.periods.is_empty() {
            continue;
        }
        println!("{}", day.day);
        for period in &day.periods {
            println!("  {}", period_line(period));
        }
    }
}

pub fn print_attendance(records: &[AttendanceRecord], target: u32) {
    if records.is_empty() {
        println!("No attendance records. Run `timewise attendance sync` after parsing a timetable.");
        return;
    }
    for record in records {
        println!("{}", attendance_line(record, target));
    }
}

pub fn print_events(events: &[&CalendarEvent]) {
    if events.is_empty() {
        println!("No events.");
        return;
    }
    for event in events {
        print!("{}  {:<8} {}", event.date, event.kind.as_str(), event.title);
        match &event.description {
            Some(desc) => println!("  ({desc})"),
            None => println!(),
        }
        println!("    id: {}", event.id);
    }
}

// ── Line formatting ──

fn period_line(p: &ClassPeriod) -> String {
    let mut line = format!("{}-{}  {:<12}", p.start_time, p.end_time, p.subject);
    if let Some(name) = &p.course_name {
        line.push_str(&format!(" {name}"));
    }
    if let Some(kind) = p.kind {
        line.push_str(&format!(" [{}]", kind.as_str()));
    }
    if let Some(teacher) = &p.teacher {
        line.push_str(&format!(" / {teacher}"));
    }
    if let Some(room) = &p.room {
        line.push_str(&format!(" @ {room}"));
    }
    line
}

fn attendance_line(r: &AttendanceRecord, target: u32) -> String {
    let standing = r.standing(target);
    let advice = match standing {
        Standing::Critical => match r.classes_to_recover(target) {
            Some(n) => format!("attend {n} more in a row to reach {target}%"),
            None => format!("{target}% is out of reach"),
        },
        _ => match r.safe_skips(target) {
            0 => "cannot skip any".to_string(),
            n => format!("can skip {n}"),
        },
    };
    format!(
        "{:<16} {:>3}/{:<3} {:>3}%  {:<8} {}",
        r.subject,
        r.attended,
        r.total(),
        r.percentage(),
        standing.as_str(),
        advice
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use timewise_core::PeriodKind;

    #[test]
    fn period_line_includes_optional_fields() {
        let p = ClassPeriod {
            id: "x".into(),
            subject: "CEDX 01".into(),
            course_name: Some("Design".into()),
            teacher: Some("Dr. Iyer".into()),
            start_time: "11:00".into(),
            end_time: "12:40".into(),
            room: Some("LH-2".into()),
            kind: Some(PeriodKind::Lab),
        };
        assert_eq!(
            period_line(&p),
            "11:00-12:40  CEDX 01      Design [Lab] / Dr. Iyer @ LH-2"
        );
    }

    #[test]
    fn attendance_advice() {
        let low = AttendanceRecord {
            subject: "Maths".into(),
            attended: 1,
            missed: 3,
        };
        assert!(attendance_line(&low, 75).ends_with("attend 8 more in a row to reach 75%"));

        let ok = AttendanceRecord {
            subject: "Maths".into(),
            attended: 9,
            missed: 1,
        };
        let line = attendance_line(&ok, 75);
        assert!(line.contains(" 90%"));
        assert!(line.ends_with("can skip 2"));
    }
}
