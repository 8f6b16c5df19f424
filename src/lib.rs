//! # Transcript GPA
//!
//! Reads academic transcripts and turns them into course records and GPA statistics.
//!
//! ## Features
//!
//! - **Several input formats**: comma-separated text (`.csv`), Excel workbooks (`.xlsx`),
//!   plain text (`.txt`) and text extracted from PDF transcripts
//! - **Column inference**: header rows are optional; columns are located by synonyms such
//!   as "course", "grade" or "credits" in any order
//! - **Noise tolerant**: page headers, boilerplate and unparseable rows are skipped without
//!   aborting the parse
//! - **Term tracking**: term headers such as "2024 Fall" in free text assign later courses
//!   to that term
//! - **GPA statistics**: credit-weighted cumulative and per-term GPA on the 4.0 scale, plus
//!   a projection of the grade needed to reach a target GPA
//! - **Snapshots**: JSON save and export format for record lists
//!
//! ## Example
//!
//! ```
//! use transcript_gpa::grading::GpaSummary;
//! use transcript_gpa::transcript::ingest_delimited_text;
//!
//! let ingestion = ingest_delimited_text("Course,Grade,Credits\nCALC 1000,85,0.5\n");
//! assert_eq!(ingestion.status.to_string(), "parsed 1 records");
//!
//! let summary = GpaSummary::from_records(&ingestion.records);
//! assert_eq!(summary.gpa, Some(3.9));
//! ```

mod error;
mod helpers;

pub mod grading;
pub mod snapshot;
pub mod spreadsheet;
pub mod transcript;

pub use error::TranscriptError;
pub use helpers::text::decode_text;
pub use snapshot::Snapshot;
pub use transcript::CourseRecord;
pub use transcript::FileKind;
pub use transcript::IngestOptions;
pub use transcript::Ingestion;
pub use transcript::IngestStatus;
pub use transcript::Payload;
pub use transcript::TranscriptIngestor;
