//! # Spreadsheet Module
//!
//! Turns a spreadsheet buffer into the grid of raw cell values that the table parser
//! consumes. Only the first worksheet of a workbook is ever read.
//!
//! The [`SheetDecoder`] trait is the seam for plugging in another reader; the bundled
//! [`XlsxDecoder`] handles Office Open XML workbooks (.xlsx, .xlsm).
use crate::error::TranscriptError;

pub(crate) mod cell;
pub(crate) mod reference;
pub(crate) mod sheet;
pub(crate) mod xlsx;

pub(crate) use cell::Cell;
pub use cell::RawCell;
pub(crate) use sheet::Sheet;
pub use xlsx::XlsxDecoder;

/// Rows of raw cells; rows may have different lengths.
pub type Grid = Vec<Vec<RawCell>>;

/// Decodes the first sheet of a spreadsheet buffer into a grid.
///
/// # Errors
///
/// Returns [`TranscriptError::UnreadableInput`] (or a wrapped archive/XML error) when the
/// buffer is not a readable workbook.
pub trait SheetDecoder {
    fn decode_first_sheet(&self, bytes: &[u8]) -> Result<Grid, TranscriptError>;
}
