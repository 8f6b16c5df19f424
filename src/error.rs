use thiserror::Error;

/// Main error type for transcript ingestion.
/// Only whole-input failures are represented here; a malformed row is skipped, never reported.
#[derive(Error, Debug)]
pub enum TranscriptError {
    #[error("{0}")]
    WithContextError(String),

    /// The declared media type or extension is not a transcript format we read
    #[error("Unsupported file type '{name}', expected a .pdf, .txt, .csv or .xlsx file")]
    UnsupportedFormat { name: String },

    /// The buffer could not be decoded as the declared format
    #[error("Unreadable input: {0}")]
    UnreadableInput(String),

    /// A PDF arrived as raw bytes and no text extractor was configured
    #[error("No text extractor configured for {kind} input")]
    MissingExtractor { kind: String },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),
}

impl TranscriptError {
    /// True when the input itself could not be read, as opposed to an unsupported type.
    /// Callers must keep this apart from an ingestion that simply found no records.
    pub fn is_unreadable(&self) -> bool {
        !matches!(
            self,
            Self::UnsupportedFormat { .. } | Self::MissingExtractor { .. }
        )
    }
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, TranscriptError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| TranscriptError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_is_not_unreadable() {
        let error = TranscriptError::UnsupportedFormat { name: "notes.docx".to_owned() };
        assert!(!error.is_unreadable());

        let error = TranscriptError::UnreadableInput("truncated archive".to_owned());
        assert!(error.is_unreadable());
    }

    #[test]
    fn prefix_is_prepended() {
        let result: Result<(), TranscriptError> = Err(TranscriptError::UnreadableInput("bad".to_owned()));
        let message = result.with_prefix("xl/workbook.xml").unwrap_err().to_string();
        assert_eq!(message, "xl/workbook.xml: Unreadable input: bad");
    }
}
