//! Byte-to-text decoding for delimited and plain-text transcripts.

use crate::error::TranscriptError;
use encoding_rs::Encoding;
use encoding_rs::UTF_8;
use std::borrow::Cow;

/// Decodes a text transcript.
/// A UTF-8 or UTF-16 byte order mark selects the encoding, otherwise the bytes must be valid UTF-8.
pub fn decode_text(bytes: &[u8]) -> Result<String, TranscriptError> {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        if had_errors {
            Err(TranscriptError::UnreadableInput(format!("malformed {} text", encoding.name())))?
        }
        return Ok(text.into_owned());
    }
    UTF_8
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(Cow::into_owned)
        .ok_or_else(|| TranscriptError::UnreadableInput("text is not valid UTF-8".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_utf8() {
        assert_eq!(decode_text(b"CALC 1000,85,0.5").unwrap(), "CALC 1000,85,0.5");
    }

    #[test]
    fn strips_utf8_bom() {
        assert_eq!(decode_text(b"\xEF\xBB\xBFCourse,Grade").unwrap(), "Course,Grade");
    }

    #[test]
    fn utf16_le_with_bom() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "Grade".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        assert_eq!(decode_text(&bytes).unwrap(), "Grade");
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let error = decode_text(&[0x43, 0xFF, 0xFE, 0x41, 0x80]).unwrap_err();
        assert!(matches!(error, TranscriptError::UnreadableInput(_)));
    }
}
