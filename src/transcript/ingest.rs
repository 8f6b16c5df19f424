//! Format dispatch: picks the parser for a declared file type and reports the outcome.

use crate::error::TranscriptError;
use crate::helpers::text::decode_text;
use crate::spreadsheet::RawCell;
use crate::spreadsheet::SheetDecoder;
use crate::spreadsheet::XlsxDecoder;
use crate::transcript::free_text::FreeTextTranscriptParser;
use crate::transcript::options::IngestOptions;
use crate::transcript::record::CourseRecord;
use crate::transcript::table::DelimitedTableParser;
use std::ffi::OsStr;
use std::fmt;
use std::path::Path;
use tracing::info;
use tracing::warn;

/// The transcript formats we know how to read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Csv,
    Spreadsheet,
    Pdf,
    PlainText,
}

impl FileKind {
    /// Detects the kind from a declared media type, falling back to the file extension.
    ///
    /// # Arguments
    ///
    /// * `media_type` - MIME type declared by the uploader, if any
    /// * `file_name` - Name or path of the file
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptError::UnsupportedFormat`] when neither identifies a known format.
    pub fn detect(media_type: Option<&str>, file_name: &str) -> Result<Self, TranscriptError> {
        if let Some(kind) = media_type.and_then(Self::from_media_type) {
            return Ok(kind);
        }
        let extension = Path::new(file_name)
            .extension()
            .and_then(OsStr::to_str)
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("csv") => Ok(Self::Csv),
            // .xls is accepted here and fails later as unreadable: only zip workbooks decode
            Some("xlsx") | Some("xlsm") | Some("xls") => Ok(Self::Spreadsheet),
            Some("pdf") => Ok(Self::Pdf),
            Some("txt") => Ok(Self::PlainText),
            _ => Err(TranscriptError::UnsupportedFormat { name: file_name.to_owned() }),
        }
    }

    fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
        match essence.as_str() {
            "text/csv" => Some(Self::Csv),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            | "application/vnd.ms-excel" => Some(Self::Spreadsheet),
            "application/pdf" => Some(Self::Pdf),
            "text/plain" => Some(Self::PlainText),
            _ => None,
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Spreadsheet => "spreadsheet",
            Self::Pdf => "pdf",
            Self::PlainText => "text",
        };
        f.write_str(name)
    }
}

/// The input handed over by the caller.
#[derive(Clone, Copy, Debug)]
pub enum Payload<'a> {
    /// Already decoded text (CSV, plain text, or text extracted from a PDF)
    Text(&'a str),
    /// Raw file contents
    Bytes(&'a [u8]),
    /// A sheet already decoded by an external reader
    Grid(&'a [Vec<RawCell>]),
}

/// External service turning PDF bytes into the text of all pages, joined by newlines.
pub trait PdfTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, TranscriptError>;
}

/// Count-based outcome of an ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestStatus {
    Parsed(usize),
    NoRecords,
}

impl IngestStatus {
    fn from_count(count: usize) -> Self {
        match count {
            0 => Self::NoRecords,
            n => Self::Parsed(n),
        }
    }
}

impl fmt::Display for IngestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parsed(count) => write!(f, "parsed {} records", count),
            Self::NoRecords => f.write_str("no records found"),
        }
    }
}

/// Records of one ingestion. Each ingestion replaces whatever the caller held before.
#[derive(Clone, Debug, PartialEq)]
pub struct Ingestion {
    pub records: Vec<CourseRecord>,
    pub status: IngestStatus,
}

impl From<Vec<CourseRecord>> for Ingestion {
    fn from(records: Vec<CourseRecord>) -> Self {
        let status = IngestStatus::from_count(records.len());
        Self { records, status }
    }
}

/// Turns transcript files of any supported kind into course records.
pub struct TranscriptIngestor {
    options: IngestOptions,
    sheet_decoder: Box<dyn SheetDecoder>,
    pdf_extractor: Option<Box<dyn PdfTextExtractor>>,
}

impl Default for TranscriptIngestor {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

impl TranscriptIngestor {
    pub fn new(options: IngestOptions) -> Self {
        Self {
            options,
            sheet_decoder: Box::new(XlsxDecoder),
            pdf_extractor: None,
        }
    }

    pub fn with_sheet_decoder(mut self, decoder: impl SheetDecoder + 'static) -> Self {
        self.sheet_decoder = Box::new(decoder);
        self
    }

    pub fn with_pdf_extractor(mut self, extractor: impl PdfTextExtractor + 'static) -> Self {
        self.pdf_extractor = Some(Box::new(extractor));
        self
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    /// Parses a payload of the given kind.
    ///
    /// # Errors
    ///
    /// * [`TranscriptError::UnsupportedFormat`] when the payload does not fit the kind
    /// * [`TranscriptError::MissingExtractor`] for PDF bytes without a configured extractor
    /// * an unreadable-input error when bytes cannot be decoded
    ///
    /// Input that decodes but holds no courses is not an error; it yields
    /// [`IngestStatus::NoRecords`].
    pub fn ingest(&self, kind: FileKind, payload: Payload<'_>) -> Result<Ingestion, TranscriptError> {
        let result = self.dispatch(kind, payload);
        match &result {
            Ok(ingestion) => info!(%kind, status = %ingestion.status, "transcript ingested"),
            Err(error) => warn!(%kind, %error, "transcript could not be ingested"),
        }
        result
    }

    fn dispatch(&self, kind: FileKind, payload: Payload<'_>) -> Result<Ingestion, TranscriptError> {
        match (kind, payload) {
            (FileKind::Csv, Payload::Text(text)) => Ok(self.ingest_delimited_text(text)),
            (FileKind::Csv, Payload::Bytes(bytes)) => Ok(self.ingest_delimited_text(&decode_text(bytes)?)),
            (FileKind::Spreadsheet, Payload::Grid(grid)) => Ok(self.ingest_grid(grid)),
            (FileKind::Spreadsheet, Payload::Bytes(bytes)) => {
                let grid = self.sheet_decoder.decode_first_sheet(bytes)?;
                Ok(self.ingest_grid(&grid))
            }
            (FileKind::PlainText | FileKind::Pdf, Payload::Text(text)) => Ok(self.ingest_free_text(text)),
            (FileKind::PlainText, Payload::Bytes(bytes)) => Ok(self.ingest_free_text(&decode_text(bytes)?)),
            (FileKind::Pdf, Payload::Bytes(bytes)) => {
                let extractor = self
                    .pdf_extractor
                    .as_ref()
                    .ok_or_else(|| TranscriptError::MissingExtractor { kind: kind.to_string() })?;
                Ok(self.ingest_free_text(&extractor.extract_text(bytes)?))
            }
            (kind, payload) => Err(TranscriptError::UnsupportedFormat {
                name: format!("{} given as {}", kind, payload_name(&payload)),
            }),
        }
    }

    /// Comma-separated text, with or without a header row.
    pub fn ingest_delimited_text(&self, text: &str) -> Ingestion {
        DelimitedTableParser::new(&self.options).parse_text(text).into()
    }

    /// The first sheet of a spreadsheet, already decoded into cells.
    pub fn ingest_grid(&self, grid: &[Vec<RawCell>]) -> Ingestion {
        DelimitedTableParser::new(&self.options).parse_grid(grid).into()
    }

    /// Plain text or text extracted from a PDF.
    pub fn ingest_free_text(&self, text: &str) -> Ingestion {
        FreeTextTranscriptParser::new(&self.options).parse(text).into()
    }
}

fn payload_name(payload: &Payload<'_>) -> &'static str {
    match payload {
        Payload::Text(_) => "text",
        Payload::Bytes(_) => "bytes",
        Payload::Grid(_) => "grid",
    }
}

/// Parses comma-separated text with default options.
pub fn ingest_delimited_text(text: &str) -> Ingestion {
    TranscriptIngestor::default().ingest_delimited_text(text)
}

/// Parses a decoded sheet with default options.
pub fn ingest_grid(grid: &[Vec<RawCell>]) -> Ingestion {
    TranscriptIngestor::default().ingest_grid(grid)
}

/// Parses free-form transcript text with default options.
pub fn ingest_free_text(text: &str) -> Ingestion {
    TranscriptIngestor::default().ingest_free_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::xlsx::tests::transcript_xlsx;
    use crate::spreadsheet::Grid;

    fn tuples(ingestion: &Ingestion) -> Vec<(String, String, String, String)> {
        ingestion
            .records
            .iter()
            .map(|r| (r.name.clone(), r.percentage.clone(), r.credits.clone(), r.term.clone()))
            .collect()
    }

    struct FixedText(&'static str);

    impl PdfTextExtractor for FixedText {
        fn extract_text(&self, _bytes: &[u8]) -> Result<String, TranscriptError> {
            Ok(self.0.to_owned())
        }
    }

    struct OneRowGrid;

    impl SheetDecoder for OneRowGrid {
        fn decode_first_sheet(&self, _bytes: &[u8]) -> Result<Grid, TranscriptError> {
            Ok(vec![vec![RawCell::from("PHIL 1020"), RawCell::Number(74.0), RawCell::Number(1.0)]])
        }
    }

    #[test]
    fn detect_by_extension() {
        assert_eq!(FileKind::detect(None, "grades.csv").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect(None, "Grades.XLSX").unwrap(), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect(None, "old.xls").unwrap(), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect(None, "/tmp/transcript.pdf").unwrap(), FileKind::Pdf);
        assert_eq!(FileKind::detect(None, "notes.txt").unwrap(), FileKind::PlainText);
    }

    #[test]
    fn media_type_wins_over_extension() {
        assert_eq!(FileKind::detect(Some("text/csv; charset=utf-8"), "upload.bin").unwrap(), FileKind::Csv);
        assert_eq!(FileKind::detect(Some("application/pdf"), "upload.txt").unwrap(), FileKind::Pdf);
        // unknown media types fall through to the extension
        assert_eq!(FileKind::detect(Some("application/octet-stream"), "a.txt").unwrap(), FileKind::PlainText);
    }

    #[test]
    fn unsupported_kinds() {
        let error = FileKind::detect(None, "essay.docx").unwrap_err();
        assert!(matches!(error, TranscriptError::UnsupportedFormat { .. }));
        assert!(!error.is_unreadable());
        assert!(FileKind::detect(None, "README").is_err());
    }

    #[test]
    fn status_messages() {
        assert_eq!(IngestStatus::Parsed(3).to_string(), "parsed 3 records");
        assert_eq!(IngestStatus::NoRecords.to_string(), "no records found");
        assert_eq!(ingest_free_text("nothing here").status, IngestStatus::NoRecords);
    }

    #[test]
    fn csv_bytes_and_text_agree() {
        let text = "Course,Grade,Credits\nCALC1000,85,0.5\n";
        let ingestor = TranscriptIngestor::default();
        let from_text = ingestor.ingest(FileKind::Csv, Payload::Text(text)).unwrap();
        let from_bytes = ingestor.ingest(FileKind::Csv, Payload::Bytes(text.as_bytes())).unwrap();
        assert_eq!(from_text, from_bytes);
        assert_eq!(from_text.status, IngestStatus::Parsed(1));
        assert_eq!(
            tuples(&from_text),
            vec![("CALC1000".to_owned(), "85".to_owned(), "0.5".to_owned(), "2028-Winter".to_owned())]
        );
    }

    #[test]
    fn xlsx_bytes() {
        let ingestion = TranscriptIngestor::default()
            .ingest(FileKind::Spreadsheet, Payload::Bytes(&transcript_xlsx()))
            .unwrap();
        assert_eq!(ingestion.status, IngestStatus::Parsed(3));
        let names: Vec<&str> = ingestion.records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["CALC 1000", "Writing & Rhetoric", "BIOL 1001A"]);
        assert_eq!(ingestion.records[1].percentage, "77.5");
        assert_eq!(ingestion.records[1].credits, "1");
        assert_eq!(ingestion.records[2].percentage, "91");
    }

    #[test]
    fn corrupt_spreadsheet_is_unreadable_not_empty() {
        let error = TranscriptIngestor::default()
            .ingest(FileKind::Spreadsheet, Payload::Bytes(b"PK\x03\x04 truncated"))
            .unwrap_err();
        assert!(error.is_unreadable());
    }

    #[test]
    fn custom_sheet_decoder() {
        let ingestion = TranscriptIngestor::default()
            .with_sheet_decoder(OneRowGrid)
            .ingest(FileKind::Spreadsheet, Payload::Bytes(b"anything"))
            .unwrap();
        assert_eq!(
            tuples(&ingestion),
            vec![("PHIL 1020".to_owned(), "74".to_owned(), "1".to_owned(), "2028-Winter".to_owned())]
        );
    }

    #[test]
    fn pdf_needs_an_extractor_for_bytes() {
        let error = TranscriptIngestor::default()
            .ingest(FileKind::Pdf, Payload::Bytes(b"%PDF-1.7"))
            .unwrap_err();
        assert!(matches!(error, TranscriptError::MissingExtractor { .. }));

        let ingestion = TranscriptIngestor::default()
            .with_pdf_extractor(FixedText("2024 Fall\nCALC 1000 Calculus 0.50 0.50 85\n"))
            .ingest(FileKind::Pdf, Payload::Bytes(b"%PDF-1.7"))
            .unwrap();
        assert_eq!(
            tuples(&ingestion),
            vec![("CALC 1000".to_owned(), "85".to_owned(), "0.5".to_owned(), "2024-Fall".to_owned())]
        );
    }

    #[test]
    fn pre_extracted_pdf_text() {
        let ingestion = TranscriptIngestor::default()
            .ingest(FileKind::Pdf, Payload::Text("MATH 1228 0.50 72"))
            .unwrap();
        assert_eq!(ingestion.status, IngestStatus::Parsed(1));
    }

    #[test]
    fn mismatched_payload_is_unsupported() {
        let grid: Grid = vec![vec![RawCell::from("x")]];
        let error = TranscriptIngestor::default()
            .ingest(FileKind::Csv, Payload::Grid(&grid))
            .unwrap_err();
        assert!(matches!(error, TranscriptError::UnsupportedFormat { .. }));
    }

    #[test]
    fn undecodable_text_is_unreadable() {
        let error = TranscriptIngestor::default()
            .ingest(FileKind::PlainText, Payload::Bytes(&[0x43, 0xff, 0xfe, 0x41, 0x00, 0xc3]))
            .unwrap_err();
        assert!(error.is_unreadable());
    }

    #[test]
    fn ingestion_is_idempotent() {
        let text = "2024 Fall\nCALC 1000 Calculus 0.50 0.50 85\nMATH 1228 0.50 72\n";
        assert_eq!(tuples(&ingest_free_text(text)), tuples(&ingest_free_text(text)));
        let csv = "Course,Grade,Credits\nA 1000,70,0.5\nB 2000,80,1.0\n";
        assert_eq!(ingest_delimited_text(csv), ingest_delimited_text(csv));
    }

    #[test]
    fn grid_entry_point() {
        let grid = vec![
            vec![RawCell::from("Course"), RawCell::from("Grade")],
            vec![RawCell::from("CS 1026"), RawCell::Number(90.0)],
        ];
        let ingestion = ingest_grid(&grid);
        assert_eq!(ingestion.status, IngestStatus::Parsed(1));
        assert_eq!(ingestion.records[0].credits, "1");
    }
}
