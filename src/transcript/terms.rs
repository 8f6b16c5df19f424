//! Known term labels, oldest first.

pub const KNOWN_TERMS: [&str; 10] = [
    "2023-Fall",
    "2024-Winter",
    "2024-Fall",
    "2025-Winter",
    "2025-Fall",
    "2026-Winter",
    "2026-Fall",
    "2027-Winter",
    "2027-Fall",
    "2028-Winter",
];

/// Term given to records whose source names none: the last known label.
pub fn fallback_term() -> &'static str {
    KNOWN_TERMS[KNOWN_TERMS.len() - 1]
}
