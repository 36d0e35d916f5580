//! Splitting of grid cells that list several course codes.
//!
//! A cell such as "CEDX 01/07" names two sections sharing one slot. Later
//! fragments usually drop the department prefix, so it is copied from the
//! first fragment: "CEDX 01/07" -> ["CEDX 01", "CEDX 07"].

/// Split a course-code cell on `/` and `+`.
///
/// Empty fragments are dropped. A fragment that does not start with a
/// letter inherits the alphabetic prefix of the first fragment, together
/// with any whitespace that followed the prefix there ("CS101+102" ->
/// "CS102", "CEDX 01/07" -> "CEDX 07").
pub fn split_course_codes(raw: &str) -> Vec<String> {
    let fragments: Vec<&str> = raw
        .split(['/', '+'])
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .collect();

    let Some(first) = fragments.first() else {
        return Vec::new();
    };
    let prefix = alphabetic_prefix(first);

    fragments
        .iter()
        .map(|frag| {
            let starts_alpha = frag.chars().next().is_some_and(char::is_alphabetic);
            if starts_alpha || prefix.is_empty() {
                frag.to_string()
            } else {
                format!("{prefix}{frag}")
            }
        })
        .collect()
}

/// Leading letters plus the whitespace directly after them.
fn alphabetic_prefix(s: &str) -> &str {
    let letters_end = s
        .char_indices()
        .find(|(_, c)| !c.is_alphabetic())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    if letters_end == 0 {
        return "";
    }
    let rest = &s[letters_end..];
    let gap = rest.len() - rest.trim_start().len();
    &s[..letters_end + gap]
}
