//! Attendance arithmetic against a minimum-percentage rule.
//!
//! Institutions typically require 75% attendance per subject. For a record
//! with `a` attended out of `t` total and target `p`%:
//!
//! - safe skips: largest `m` with `100a >= p(t + m)`
//! - classes to recover: smallest `k` with `100(a + k) >= p(t + k)`
//!
//! Everything is integer arithmetic so results never wobble on rounding.

use crate::model::AttendanceRecord;

pub const DEFAULT_TARGET_PERCENT: u32 = 75;

/// Margin above the target still shown as a warning.
const WARNING_MARGIN: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// Below target.
    Critical,
    /// At or above target but within the warning margin.
    Warning,
    Good,
}

impl Standing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Warning => "warning",
            Self::Good => "good",
        }
    }
}

impl AttendanceRecord {
    /// Widened so `u32::MAX` counts cannot overflow.
    pub fn total(&self) -> u64 {
        self.attended as u64 + self.missed as u64
    }

    /// Attendance rounded to the nearest whole percent; 0 with no classes.
    pub fn percentage(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        ((self.attended as u64 * 200 + total) / (total * 2)) as u32
    }

    /// Classes that can still be missed while staying at `target`%.
    pub fn safe_skips(&self, target: u32) -> u32 {
        if target == 0 {
            return u32::MAX;
        }
        let attended = self.attended as u64 * 100;
        let required = target as u64 * self.total();
        if attended < required {
            return 0;
        }
        ((attended - required) / target as u64).min(u32::MAX as u64) as u32
    }

    /// Consecutive classes to attend to climb back to `target`%.
    ///
    /// `None` when the target is 100% and a class has already been missed.
    pub fn classes_to_recover(&self, target: u32) -> Option<u32> {
        let attended = self.attended as u64 * 100;
        let required = target as u64 * self.total();
        if attended >= required {
            return Some(0);
        }
        if target >= 100 {
            return None;
        }
        let deficit = required - attended;
        let gain_per_class = 100 - target as u64;
        Some(deficit.div_ceil(gain_per_class).min(u32::MAX as u64) as u32)
    }

    pub fn standing(&self, target: u32) -> Standing {
        let pct = self.percentage();
        if pct < target {
            Standing::Critical
        } else if pct < target.saturating_add(WARNING_MARGIN) {
            Standing::Warning
        } else {
            Standing::Good
        }
    }
}
