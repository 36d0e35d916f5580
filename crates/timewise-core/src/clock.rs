//! Wall-clock normalisation for times read off timetable photos.
//!
//! Source images mix 12-hour and 24-hour notation and rarely carry an AM/PM
//! marker, so this is a heuristic, not a strict parser.
//!
//! # Rules
//!
//! 1. Strip all whitespace; `.` is treated as `:` ("9.30" == "9:30")
//! 2. Parse hour and minute; a bare hour means minute 0, trailing seconds
//!    are dropped
//! 3. An explicit trailing `am`/`pm` is honoured
//! 4. Otherwise, an hour inside [`TimePolicy::pm_shift`] (default 1..=5)
//!    is assumed to be afternoon and gains 12
//! 5. Render as zero-padded `HH:mm`

use std::ops::RangeInclusive;

/// Controls the "small hour means afternoon" guess.
///
/// The default shifts 1..=5 to 13..=17. A genuine 01:00-05:59 class is
/// misread under the default; set `pm_shift` to `None` for such sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimePolicy {
    pub pm_shift: Option<RangeInclusive<u8>>,
}

impl Default for TimePolicy {
    fn default() -> Self {
        Self {
            pm_shift: Some(1..=5),
        }
    }
}

impl TimePolicy {
    /// No shifting: every hour is taken as written.
    pub fn literal() -> Self {
        Self { pm_shift: None }
    }
}

/// Normalise a raw time using the default [`TimePolicy`].
///
/// Returns `None` when the input is not recognisably a time.
pub fn normalize_time(raw: &str) -> Option<String> {
    normalize_time_with(raw, &TimePolicy::default())
}

/// Normalise a raw time into `HH:mm` under the given policy.
pub fn normalize_time_with(raw: &str, policy: &TimePolicy) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == '.' { ':' } else { c })
        .collect::<String>()
        .to_ascii_lowercase();

    let (body, meridiem) = if let Some(rest) = compact.strip_suffix("am") {
        (rest, Some(false))
    } else if let Some(rest) = compact.strip_suffix("pm") {
        (rest, Some(true))
    } else {
        (compact.as_str(), None)
    };

    let (hour_part, mut minute_part) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None => (body, "0"),
    };
    // Seconds are accepted and dropped.
    if let Some((m, sec)) = minute_part.split_once(':') {
        if sec.len() != 2 || !sec.bytes().all(|b| b.is_ascii_digit()) || sec > "59" {
            return None;
        }
        minute_part = m;
    }
    if hour_part.is_empty()
        || minute_part.is_empty()
        || !hour_part.bytes().all(|b| b.is_ascii_digit())
        || !minute_part.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }

    let mut hour: u8 = hour_part.parse().ok()?;
    let minute: u8 = minute_part.parse().ok()?;
    if minute > 59 {
        return None;
    }

    match meridiem {
        Some(is_pm) => {
            if hour == 0 || hour > 12 {
                return None;
            }
            hour = match (is_pm, hour) {
                (false, 12) => 0,
                (true, 12) => 12,
                (true, h) => h + 12,
                (false, h) => h,
            };
        }
        None => {
            if let Some(range) = &policy.pm_shift
                && range.contains(&hour)
            {
                hour += 12;
            }
        }
    }

    if hour > 23 {
        return None;
    }
    Some(format!("{hour:02}:{minute:02}"))
}

/// True when `s` is already a valid zero-padded 24-hour `HH:mm`.
pub fn is_canonical_time(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return false;
    }
    let digits = [bytes[0], bytes[1], bytes[3], bytes[4]];
    if !digits.iter().all(u8::is_ascii_digit) {
        return false;
    }
    let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
    let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
    hour < 24 && minute < 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn afternoon_hours_shifted() {
        assert_eq!(normalize_time("2:30").as_deref(), Some("14:30"));
        assert_eq!(normalize_time("1:00").as_deref(), Some("13:00"));
        assert_eq!(normalize_time("5:59").as_deref(), Some("17:59"));
    }

    #[test]
    fn morning_and_24h_pass_through() {
        assert_eq!(normalize_time("9:00").as_deref(), Some("09:00"));
        assert_eq!(normalize_time("12:40").as_deref(), Some("12:40"));
        assert_eq!(normalize_time("16:50").as_deref(), Some("16:50"));
        assert_eq!(normalize_time("0:15").as_deref(), Some("00:15"));
        assert_eq!(normalize_time("6:00").as_deref(), Some("06:00"));
    }

    #[test]
    fn dot_separator_and_whitespace() {
        assert_eq!(normalize_time(" 9.30 ").as_deref(), Some("09:30"));
        assert_eq!(normalize_time("3 . 10").as_deref(), Some("15:10"));
    }

    #[test]
    fn bare_hour() {
        assert_eq!(normalize_time("11").as_deref(), Some("11:00"));
        assert_eq!(normalize_time("2").as_deref(), Some("14:00"));
    }

    #[test]
    fn explicit_meridiem_wins() {
        assert_eq!(normalize_time("2:30 am").as_deref(), Some("02:30"));
        assert_eq!(normalize_time("2:30PM").as_deref(), Some("14:30"));
        assert_eq!(normalize_time("12:00 am").as_deref(), Some("00:00"));
        assert_eq!(normalize_time("12:10 pm").as_deref(), Some("12:10"));
        assert_eq!(normalize_time("7 pm").as_deref(), Some("19:00"));
    }

    #[test]
    fn literal_policy_disables_shift() {
        let policy = TimePolicy::literal();
        assert_eq!(normalize_time_with("2:30", &policy).as_deref(), Some("02:30"));
    }

    #[test]
    fn custom_shift_range() {
        let policy = TimePolicy {
            pm_shift: Some(1..=7),
        };
        assert_eq!(normalize_time_with("7:00", &policy).as_deref(), Some("19:00"));
        assert_eq!(normalize_time_with("8:00", &policy).as_deref(), Some("08:00"));
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(normalize_time(""), None);
        assert_eq!(normalize_time("noon"), None);
        assert_eq!(normalize_time("25:00"), None);
        assert_eq!(normalize_time("10:75"), None);
        assert_eq!(normalize_time(":30"), None);
        assert_eq!(normalize_time("13:00 pm"), None);
    }

    #[test]
    fn seconds_dropped() {
        assert_eq!(normalize_time("09:00:00").as_deref(), Some("09:00"));
        assert_eq!(normalize_time("2:30:15 pm").as_deref(), Some("14:30"));
        assert_eq!(normalize_time("09:00:60"), None);
        assert_eq!(normalize_time("09:00:5"), None);
        assert_eq!(normalize_time("09:00:00:00"), None);
    }

    #[test]
    fn canonical_time_check() {
        assert!(is_canonical_time("09:00"));
        assert!(is_canonical_time("23:59"));
        assert!(!is_canonical_time("9:00"));
        assert!(!is_canonical_time("24:00"));
        assert!(!is_canonical_time("09.00"));
    }

    proptest! {
        #[test]
        fn small_hours_gain_twelve(hour in 1u8..=5, minute in 0u8..60) {
            let raw = format!("{hour}:{minute:02}");
            let expected = format!("{:02}:{minute:02}", hour + 12);
            prop_assert_eq!(normalize_time(&raw), Some(expected));
        }

        #[test]
        fn other_hours_unchanged(hour in prop_oneof![Just(0u8), 6u8..=23], minute in 0u8..60) {
            let raw = format!("{hour}:{minute:02}");
            let expected = format!("{hour:02}:{minute:02}");
            prop_assert_eq!(normalize_time(&raw), Some(expected));
        }

        #[test]
        fn output_is_canonical(hour in 0u8..=23, minute in 0u8..60) {
            let raw = format!("{hour}.{minute}");
            let out = normalize_time(&raw).unwrap();
            prop_assert!(is_canonical_time(&out));
        }
    }
}
