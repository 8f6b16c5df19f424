use crate::grading::scale::grade_point_for;
use crate::grading::scale::letter_for;
use chrono::Utc;
use regex::Regex;
use std::borrow::Cow;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;
use std::sync::LazyLock;

/// Leading decimal number of a field, e.g. "85" in "85%" or " 0.50 cr".
static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").expect("Hardcode regex pattern")
});

/// Parses the leading number of a field, ignoring any trailing text.
/// Returns `None` when the field does not start with a finite number.
pub fn parse_number(value: &str) -> Option<f64> {
    LEADING_NUMBER
        .find(value)
        .and_then(|matched| matched.as_str().trim().parse::<f64>().ok())
        .filter(|number| number.is_finite())
}

/// Shortest text form of a number: 85 for 85.0, 0.5 for 0.50.
pub fn format_number(value: f64) -> String {
    value.to_string()
}

/// Raw field values extracted from one row or line, before validation.
#[derive(Clone, Debug, PartialEq)]
pub struct Candidate<'a> {
    pub name: Cow<'a, str>,
    pub percentage: Cow<'a, str>,
    pub credits: Cow<'a, str>,
    pub term: Cow<'a, str>,
}

/// A validated course taken from a transcript.
///
/// `percentage` and `credits` keep the decimal text shown to the user; use
/// [`CourseRecord::percentage_value`] and [`CourseRecord::credits_value`] for arithmetic.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseRecord {
    pub id: i64,
    pub name: String,
    pub percentage: String,
    pub credits: String,
    pub term: String,
    /// Always true for parsed records; editors may clear it on rows they invalidate.
    pub is_valid: bool,
}

impl CourseRecord {
    /// The empty starter row offered for manual entry.
    pub fn blank(id: i64, term: &str) -> Self {
        Self {
            id,
            name: String::new(),
            percentage: String::new(),
            credits: "1.0".to_owned(),
            term: term.to_owned(),
            is_valid: true,
        }
    }

    pub fn percentage_value(&self) -> Option<f64> {
        parse_number(&self.percentage)
    }

    pub fn credits_value(&self) -> Option<f64> {
        parse_number(&self.credits)
    }

    pub fn grade_point(&self) -> Option<f64> {
        self.percentage_value().and_then(grade_point_for)
    }

    pub fn letter(&self) -> Option<&'static str> {
        self.percentage_value().and_then(letter_for)
    }
}

/// Validates candidates into records.
pub struct CourseRecordBuilder;

impl CourseRecordBuilder {
    /// Builds a record, or `None` when the name is blank, the percentage is not a number
    /// in 0..=100, or the credits are not a positive number.
    pub fn build(candidate: &Candidate<'_>, id: i64) -> Option<CourseRecord> {
        let name = candidate.name.trim();
        if name.is_empty() {
            return None;
        }
        let percentage = parse_number(&candidate.percentage).filter(|p| (0.0..=100.0).contains(p))?;
        let credits = parse_number(&candidate.credits).filter(|c| *c > 0.0)?;
        Some(CourseRecord {
            id,
            name: name.to_owned(),
            percentage: format_number(percentage),
            credits: format_number(credits),
            term: candidate.term.trim().to_owned(),
            is_valid: true,
        })
    }
}

/// Collects the records of one ingestion, numbering accepted records from 1.
#[derive(Debug, Default)]
pub(crate) struct RecordCollector {
    records: Vec<CourseRecord>,
}

impl RecordCollector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Offers a candidate; returns whether it was accepted.
    pub(crate) fn offer(&mut self, candidate: &Candidate<'_>) -> bool {
        let id = self.records.len() as i64 + 1;
        match CourseRecordBuilder::build(candidate, id) {
            Some(record) => {
                self.records.push(record);
                true
            }
            None => false,
        }
    }

    pub(crate) fn into_records(self) -> Vec<CourseRecord> {
        self.records
    }
}

static LAST_INTERACTIVE_ID: AtomicI64 = AtomicI64::new(0);

/// Id for a row added by hand: the current time in milliseconds, bumped when needed so
/// that ids handed out by this process strictly increase.
pub fn next_interactive_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_INTERACTIVE_ID
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
        .unwrap_or_else(|last| last);
    now.max(previous + 1)
}
