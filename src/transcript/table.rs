//! Row/column extraction shared by delimited text and spreadsheet grids.

use crate::spreadsheet::RawCell;
use crate::transcript::columns::is_header_row;
use crate::transcript::columns::ColumnMap;
use crate::transcript::columns::Field;
use crate::transcript::options::IngestOptions;
use crate::transcript::record::format_number;
use crate::transcript::record::parse_number;
use crate::transcript::record::Candidate;
use crate::transcript::record::CourseRecord;
use crate::transcript::record::RecordCollector;
use csv::ReaderBuilder;
use csv::Trim;
use std::borrow::Cow;
use tracing::debug;

/// Parses transcripts laid out as a table with one course per row.
///
/// The first row is a header when any of its text cells mentions "course", "name" or
/// "grade"; columns are then located by header synonyms. Without a header, or for a
/// field the header does not name, columns 0, 1 and 2 hold name, percentage and credits.
pub struct DelimitedTableParser<'o> {
    options: &'o IngestOptions,
}

impl<'o> DelimitedTableParser<'o> {
    pub fn new(options: &'o IngestOptions) -> Self {
        Self { options }
    }

    /// Parses comma-separated text. Surrounding quotes are removed from every field.
    pub fn parse_text(&self, text: &str) -> Vec<CourseRecord> {
        self.parse_rows(&split_delimited(text))
    }

    /// Parses a decoded sheet grid.
    pub fn parse_grid(&self, grid: &[Vec<RawCell>]) -> Vec<CourseRecord> {
        self.parse_rows(grid)
    }

    fn parse_rows(&self, rows: &[Vec<RawCell>]) -> Vec<CourseRecord> {
        let (columns, data_start) = match rows.first() {
            Some(first) if is_header_row(first) => (ColumnMap::from_header(first), 1),
            _ => (ColumnMap::default(), 0),
        };
        debug!(?columns, has_header = data_start == 1, "resolved transcript columns");

        let mut collector = RecordCollector::new();
        for (index, row) in rows.iter().enumerate().skip(data_start) {
            if row.iter().all(RawCell::is_empty) {
                continue;
            }
            let candidate = self.candidate(&columns, row);
            if !collector.offer(&candidate) {
                debug!(row = index + 1, name = %candidate.name, percentage = %candidate.percentage, "skipped row");
            }
        }
        collector.into_records()
    }

    fn candidate<'r>(&self, columns: &ColumnMap, row: &'r [RawCell]) -> Candidate<'r> {
        let credits = match read_field(row, columns, Field::Credits) {
            Some(credits) if parse_number(&credits).is_some_and(|value| value > 0.0) => credits,
            _ => Cow::Owned(format_number(self.options.default_credits)),
        };
        Candidate {
            name: read_field(row, columns, Field::Name).unwrap_or_default(),
            percentage: read_field(row, columns, Field::Percentage).unwrap_or_default(),
            credits,
            term: read_field(row, columns, Field::Term)
                .unwrap_or_else(|| Cow::Owned(self.options.fallback_term.to_owned())),
        }
    }
}

/// Reads the mapped column, falling back to the field's fixed position when the column is
/// unresolved or the mapped cell is blank.
fn read_field<'r>(row: &'r [RawCell], columns: &ColumnMap, field: Field) -> Option<Cow<'r, str>> {
    let cell_text = |index: usize| row.get(index).and_then(RawCell::to_text);
    columns
        .get(field)
        .and_then(cell_text)
        .or_else(|| field.fallback_position().and_then(cell_text))
}

/// Splits comma-separated text into rows of text cells, one row per line.
/// Each line gets its own reader, so an unbalanced quote cannot swallow the lines after it.
fn split_delimited(text: &str) -> Vec<Vec<RawCell>> {
    text.lines()
        .enumerate()
        .map(|(index, line)| {
            split_line(line).unwrap_or_else(|error| {
                debug!(line = index + 1, %error, "skipped malformed line");
                Vec::new()
            })
        })
        .collect()
}

/// Splits one line into cells; quoted fields keep their commas.
fn split_line(line: &str) -> Result<Vec<RawCell>, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(line.as_bytes());
    let record = match reader.records().next() {
        Some(record) => record?,
        None => return Ok(Vec::new()),
    };
    Ok(record
        .iter()
        .map(|field| RawCell::from(field.trim_matches('"').trim()))
        .collect())
}
