//! # Transcript Module
//!
//! Converts transcripts in loosely structured formats into [`CourseRecord`]s.
//!
//! Tabular input (comma-separated text and spreadsheet grids) goes through the
//! [`DelimitedTableParser`], which locates columns from an optional header row.
//! Unstructured input (plain text and text extracted from PDF pages) goes through the
//! [`FreeTextTranscriptParser`], which tracks term headers and matches course lines
//! against an ordered list of layouts. [`TranscriptIngestor`] picks between them.
//!
//! Rows and lines that do not yield a valid course are skipped silently; only the
//! number of accepted records is reported.

pub mod columns;
pub mod free_text;
pub mod ingest;
pub mod options;
pub mod record;
pub mod table;
pub mod terms;

pub use columns::ColumnMap;
pub use columns::Field;
pub use free_text::FreeTextTranscriptParser;
pub use ingest::ingest_delimited_text;
pub use ingest::ingest_free_text;
pub use ingest::ingest_grid;
pub use ingest::FileKind;
pub use ingest::IngestStatus;
pub use ingest::Ingestion;
pub use ingest::Payload;
pub use ingest::PdfTextExtractor;
pub use ingest::TranscriptIngestor;
pub use options::IngestOptions;
pub use record::next_interactive_id;
pub use record::Candidate;
pub use record::CourseRecord;
pub use record::CourseRecordBuilder;
pub use table::DelimitedTableParser;
pub use terms::fallback_term;
pub use terms::KNOWN_TERMS;
