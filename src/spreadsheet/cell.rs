use crate::error::TranscriptError;
use crate::spreadsheet::reference::index_to_reference;
use std::borrow::Cow;
use std::fmt::Display;

/// Types of cell data found in a worksheet part.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// ISO 8601 date/time strings, kept as text
    IsoDateTime,
    /// Inline or formula string values
    InlineString,
    /// Shared string table references
    SharedString,
    /// Error values (#N/A, #DIV/0!, ...)
    Error,
}

impl CellType {
    /// Maps the `t` attribute of a `<c>` element.
    pub(crate) fn parse_type_attribute(value: Option<&str>) -> Self {
        match value {
            Some("inlineStr") | Some("str") => Self::InlineString,
            Some("s") => Self::SharedString,
            Some("d") => Self::IsoDateTime,
            Some("b") => Self::Boolean,
            Some("e") => Self::Error,
            _ => Self::Number,
        }
    }
}

/// A positioned cell as it was read from the worksheet part.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    pub(crate) kind: CellType,
    /// Raw cell value; for shared strings this is the table index
    pub(crate) value: String,
}

impl Cell {
    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Resolves the cell into the raw value handed to the table parser.
    pub(crate) fn resolve(&self, shared_strings: &[String]) -> Result<RawCell, TranscriptError> {
        let cell = match self.kind {
            CellType::Empty | CellType::Error => RawCell::Empty,
            CellType::Boolean => RawCell::Boolean(self.value == "1"),
            CellType::Number => match self.value.trim().parse::<f64>() {
                Ok(number) => RawCell::Number(number),
                Err(_) => RawCell::Text(self.value.to_owned()),
            },
            CellType::IsoDateTime | CellType::InlineString => RawCell::Text(self.value.to_owned()),
            CellType::SharedString => {
                let index = self.value.trim().parse::<usize>()?;
                let text = shared_strings.get(index).ok_or_else(|| {
                    TranscriptError::UnreadableInput(format!(
                        "shared string {} referenced at {} does not exist",
                        index,
                        self.reference()
                    ))
                })?;
                RawCell::Text(text.to_owned())
            }
        };
        Ok(cell)
    }
}

/// One cell of a decoded sheet grid, as handed over by a spreadsheet reader.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RawCell {
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl RawCell {
    /// The string content, only for text cells.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// The value as text, `None` for empty cells and blank strings.
    pub fn to_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Empty => None,
            Self::Boolean(value) => Some(Cow::Owned(value.to_string())),
            Self::Number(value) => Some(Cow::Owned(value.to_string())),
            Self::Text(text) if text.trim().is_empty() => None,
            Self::Text(text) => Some(Cow::Borrowed(text.trim())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_text().is_none()
    }
}

impl From<&str> for RawCell {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for RawCell {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for RawCell {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for RawCell {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl<T: Into<RawCell>> From<Option<T>> for RawCell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

impl Display for RawCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.to_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 2, col: 1, kind, value: value.to_owned() }
    }

    #[test]
    fn number_text_drops_trailing_zero() {
        assert_eq!(RawCell::Number(85.0).to_text().as_deref(), Some("85"));
        assert_eq!(RawCell::Number(0.5).to_text().as_deref(), Some("0.5"));
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(RawCell::from("   ").is_empty());
        assert!(RawCell::Empty.is_empty());
        assert!(!RawCell::Number(0.0).is_empty());
        assert_eq!(RawCell::from(None::<&str>), RawCell::Empty);
    }

    #[test]
    fn resolve_shared_string() {
        let shared = vec!["Course".to_owned(), "Grade".to_owned()];
        assert_eq!(cell(CellType::SharedString, "1").resolve(&shared).unwrap(), RawCell::from("Grade"));
        assert!(cell(CellType::SharedString, "7").resolve(&shared).is_err());
    }

    #[test]
    fn resolve_scalars() {
        assert_eq!(cell(CellType::Number, "85").resolve(&[]).unwrap(), RawCell::Number(85.0));
        assert_eq!(cell(CellType::Boolean, "1").resolve(&[]).unwrap(), RawCell::Boolean(true));
        assert_eq!(cell(CellType::Error, "#N/A").resolve(&[]).unwrap(), RawCell::Empty);
        assert_eq!(cell(CellType::Number, "n/a").resolve(&[]).unwrap(), RawCell::from("n/a"));
    }

    #[test]
    fn cell_reference() {
        assert_eq!(cell(CellType::Number, "1").reference(), "B3");
    }
}
