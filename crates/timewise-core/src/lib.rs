//! Core types for TimeWise: the canonical timetable model, raw model-output
//! normalization, and attendance arithmetic.

pub mod attendance;
pub mod clock;
pub mod codes;
pub mod grid;
pub mod model;
pub mod normalize;

pub use attendance::{DEFAULT_TARGET_PERCENT, Standing};
pub use clock::{TimePolicy, normalize_time};
pub use codes::split_course_codes;
pub use model::{
    AttendanceRecord, CalendarEvent, ClassPeriod, Day, DaySchedule, EventKind, PeriodKind,
    Reschedule, Timetable,
};
pub use normalize::{NormalizeError, NormalizeOptions, normalize_text, normalize_value};
