use crate::transcript::terms::fallback_term;

/// Tunables shared by every transcript parser.
#[derive(Clone, Debug, PartialEq)]
pub struct IngestOptions {
    /// Term used when a row names none and before the first term header of free text.
    pub fallback_term: String,

    /// Credit weight used when a table cell (or free-text fallback layout) has no positive credit value.
    pub default_credits: f64,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            fallback_term: fallback_term().to_owned(),
            default_credits: 1.0,
        }
    }
}
