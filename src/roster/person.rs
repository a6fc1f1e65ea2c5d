/// Marker the rotation export appends after a person's name
pub const PERSON_MARKER: &str = " (user)";

/// Person identifier from an event summary, e.g. `"Alice (user)"` -> `"Alice"`.
pub fn extract(summary: &str) -> &str {
    extract_with_marker(summary, PERSON_MARKER)
}

/// Everything before the first `marker`, or the whole summary when absent
pub fn extract_with_marker<'a>(summary: &'a str, marker: &str) -> &'a str {
    match summary.find(marker) {
        Some(idx) if !marker.is_empty() => &summary[..idx],
        _ => summary,
    }
}
