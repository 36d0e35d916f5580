//! Fixed lookup tables for the printed timetable grid.
//!
//! The grid has ten numbered columns. Columns 3 (short break) and 6 (lunch)
//! are breaks and are deliberately absent from [`COLUMNS`]; anything the
//! model places in them is dropped. Slot numbers count teaching periods
//! only, so slot 3 is column 4.

/// A teaching column: `(column number, start, end)`.
pub type ColumnSpan = (u32, &'static str, &'static str);

pub const COLUMNS: &[ColumnSpan] = &[
    (1, "09:00", "09:50"),
    (2, "09:50", "10:40"),
    (4, "11:00", "11:50"),
    (5, "11:50", "12:40"),
    (7, "13:30", "14:20"),
    (8, "14:20", "15:10"),
    (9, "15:10", "16:00"),
    (10, "16:00", "16:50"),
];

/// Break columns, for the prompt text only.
pub const BREAK_COLUMNS: &[ColumnSpan] = &[(3, "10:40", "11:00"), (6, "12:40", "13:30")];

pub const SLOT_STARTS: &[(u32, &str)] = &[
    (1, "09:00"),
    (2, "09:50"),
    (3, "11:00"),
    (4, "11:50"),
    (5, "13:30"),
    (6, "14:20"),
    (7, "15:10"),
    (8, "16:00"),
];

pub const SLOT_ENDS: &[(u32, &str)] = &[
    (1, "09:50"),
    (2, "10:40"),
    (3, "11:50"),
    (4, "12:40"),
    (5, "14:20"),
    (6, "15:10"),
    (7, "16:00"),
    (8, "16:50"),
];

/// Start time of a teaching column; `None` for breaks and unknown columns.
pub fn column_start(col: u32) -> Option<&'static str> {
    COLUMNS.iter().find(|(c, _, _)| *c == col).map(|(_, s, _)| *s)
}

/// End time of a teaching column; `None` for breaks and unknown columns.
pub fn column_end(col: u32) -> Option<&'static str> {
    COLUMNS.iter().find(|(c, _, _)| *c == col).map(|(_, _, e)| *e)
}

/// `(start, end)` for a slot number, if both tables define it.
pub fn slot_times(slot: u32) -> Option<(&'static str, &'static str)> {
    let start = SLOT_STARTS.iter().find(|(s, _)| *s == slot)?.1;
    let end = SLOT_ENDS.iter().find(|(s, _)| *s == slot)?.1;
    Some((start, end))
}
