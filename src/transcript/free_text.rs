//! Line-oriented parser for unstructured transcripts: plain text files and text
//! extracted from PDF pages.
//!
//! Each line is either blank, boilerplate, a term header, or a candidate course line.
//! Course lines are matched against [`LAYOUTS`] in order and the first layout that
//! matches decides the fields, even if those fields then fail validation.

use crate::transcript::options::IngestOptions;
use crate::transcript::record::format_number;
use crate::transcript::record::parse_number;
use crate::transcript::record::Candidate;
use crate::transcript::record::CourseRecord;
use crate::transcript::record::RecordCollector;
use regex::Captures;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use tracing::debug;

/// Lines containing any of these (case-insensitive) are transcript furniture, not courses.
const BOILERPLATE_KEYWORDS: [&str; 14] = [
    "student name",
    "print date",
    "manitoba grade",
    "basis of admission",
    "page",
    "faculty of",
    "beginning of undergraduate record",
    "program:",
    "plan:",
    "honor:",
    "term honor:",
    "scholarships and grants",
    "end of western university unofficial transcript",
    "the following table:",
];

/// A year starting with "20" followed by a season, e.g. "2024 Fall" or "2023 Fall/Winter".
static TERM_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(20\d{2})\s*(Fall/Winter|Fall|Winter|Summer)").expect("Hardcode regex pattern")
});

/// One recognised course-line shape.
/// Every pattern captures `name`, `credits` and `percentage` groups.
pub struct Layout {
    pub name: &'static str,
    pattern: Regex,
    /// Whether a credit value that is not positive falls back to the default weight
    defaults_credits: bool,
}

impl Layout {
    fn new(name: &'static str, pattern: &str, defaults_credits: bool) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Hardcode regex pattern"),
            defaults_credits,
        }
    }

    /// Extracts the raw fields when the line has this layout.
    pub fn captures<'l>(&self, line: &'l str) -> Option<Captures<'l>> {
        self.pattern.captures(line)
    }
}

/// Course-line layouts in priority order.
pub static LAYOUTS: LazyLock<[Layout; 4]> = LazyLock::new(|| {
    [
        // CODE 1234X  Description  0.50  0.50  85
        Layout::new(
            "transcript",
            r"(?P<name>[A-Z]{2,10}\s+\d{3,4}[A-Z]*)\s+(?P<description>.+?)\s+(?P<credits>\d+\.\d+)\s+(?P<attempted>\d+\.\d+)\s+(?P<percentage>\d{1,3})\s*$",
            false,
        ),
        // CODE 1234  0.50  85
        Layout::new(
            "code-credits-grade",
            r"^(?P<name>[A-Z]{2,10}\s+\d{3,4}[A-Z]*)\s+(?P<credits>\d+\.\d+)\s+(?P<percentage>\d{1,3}(?:\.\d+)?)\s*$",
            true,
        ),
        // CODE 1234  85  0.50
        Layout::new(
            "code-grade-credits",
            r"^(?P<name>[A-Z]{2,10}\s+\d{3,4}[A-Z]*)\s+(?P<percentage>\d{1,3}(?:\.\d+)?)\s+(?P<credits>\d+\.\d+)\s*$",
            true,
        ),
        // "Course name", 85, 0.50
        Layout::new(
            "comma-separated",
            r#"^"?(?P<name>.*?)"?,\s*(?P<percentage>\d{1,3}(?:\.\d*)?),\s*(?P<credits>\d+\.\d+)\s*$"#,
            true,
        ),
    ]
});

/// What a single line turned out to be.
#[derive(Debug, PartialEq)]
pub enum LineKind<'l> {
    Blank,
    Boilerplate,
    /// A term header; carries the normalized term label
    TermHeader(String),
    /// A course line matched by the named layout
    Course { layout: &'static str, candidate: Candidate<'l> },
    Unrecognized,
}

/// Parses free-form transcript text line by line.
pub struct FreeTextTranscriptParser<'o> {
    options: &'o IngestOptions,
}

impl<'o> FreeTextTranscriptParser<'o> {
    pub fn new(options: &'o IngestOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, text: &str) -> Vec<CourseRecord> {
        let (_, collector) = text.split('\n').enumerate().fold(
            (self.options.fallback_term.to_owned(), RecordCollector::new()),
            |(term, mut collector), (index, line)| {
                let (term, kind) = self.step(term, line);
                match kind {
                    LineKind::Course { layout, candidate } => {
                        if !collector.offer(&candidate) {
                            debug!(line = index + 1, layout, "matched line failed validation");
                        }
                    }
                    LineKind::Unrecognized => debug!(line = index + 1, "unrecognized line"),
                    _ => (),
                }
                (term, collector)
            },
        );
        collector.into_records()
    }

    /// Classifies one line under the current term and returns the term for the next line.
    pub fn step<'l>(&self, term: String, line: &'l str) -> (String, LineKind<'l>) {
        let line = line.trim();
        if line.is_empty() {
            return (term, LineKind::Blank);
        }
        if is_boilerplate(line) {
            return (term, LineKind::Boilerplate);
        }
        if let Some(header) = term_header(line) {
            return (header.clone(), LineKind::TermHeader(header));
        }
        let kind = match self.match_layouts(line, &term) {
            Some((layout, candidate)) => LineKind::Course { layout, candidate },
            None => LineKind::Unrecognized,
        };
        (term, kind)
    }

    /// Tries each layout in order; the first that matches wins.
    fn match_layouts<'l>(&self, line: &'l str, term: &str) -> Option<(&'static str, Candidate<'l>)> {
        LAYOUTS.iter().find_map(|layout| {
            let captures = layout.captures(line)?;
            let group = |name: &str| captures.name(name).map(|m| m.as_str()).unwrap_or("");
            let credits = group("credits");
            let credits = if layout.defaults_credits && !parse_number(credits).is_some_and(|value| value > 0.0) {
                Cow::Owned(format_number(self.options.default_credits))
            } else {
                Cow::Borrowed(credits)
            };
            Some((
                layout.name,
                Candidate {
                    name: Cow::Borrowed(group("name")),
                    percentage: Cow::Borrowed(group("percentage")),
                    credits,
                    term: Cow::Owned(term.to_owned()),
                },
            ))
        })
    }
}

/// Boilerplate lines, plus column-header lines naming course, grade and credits together.
fn is_boilerplate(line: &str) -> bool {
    let lower = line.to_lowercase();
    BOILERPLATE_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
        || (lower.contains("course") && lower.contains("grade") && lower.contains("credits"))
}

/// Normalized term label of a term-header line: "2024 Fall" becomes "2024-Fall" and
/// "2023 Fall/Winter" becomes "2023-Fall-Winter".
pub fn term_header(line: &str) -> Option<String> {
    let captures = TERM_HEADER.captures(line)?;
    Some(format!("{}-{}", &captures[1], captures[2].replace("/Winter", "-Winter")))
}
