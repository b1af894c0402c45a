//! Thread open/closed detection from the title's leading marker

use serde::Serialize;

/// A thread whose title starts with this glyph is closed
pub const CLOSED_MARKER: char = '🔒';

/// Result of comparing a thread title before and after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadTransition {
    Reopened,
    Closed,
    NoChange,
}

/// Whether `name` carries the closed marker
pub fn is_closed(name: &str) -> bool {
    name.starts_with(CLOSED_MARKER)
}

/// Classify a title change
pub fn classify(old_name: &str, new_name: &str) -> ThreadTransition {
    match (is_closed(old_name), is_closed(new_name)) {
        (true, false) => ThreadTransition::Reopened,
        (false, true) => ThreadTransition::Closed,
        _ => ThreadTransition::NoChange,
    }
}
