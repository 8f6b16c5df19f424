//! Excel-style A1 cell references.

/// Columns in a worksheet (A..XFD).
pub(crate) const MAX_COLUMNS: usize = 16_384;

/// Rows in a worksheet.
pub(crate) const MAX_ROWS: usize = 1_048_576;

/// Converts column letters ("A", "AB") to a 0-based column index.
/// Returns `None` past column XFD.
pub(crate) fn col_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }
    letters
        .chars()
        .try_fold(0usize, |index, letter| {
            if !letter.is_ascii_uppercase() {
                return None;
            }
            index.checked_mul(26)?.checked_add(letter as usize - 'A' as usize + 1)
        })
        .filter(|column| *column <= MAX_COLUMNS)
        .map(|column| column - 1)
}

/// Converts a 1-based row number to a 0-based row index.
/// Returns `None` for row 0 and past the last worksheet row.
pub(crate) fn row_to_index(digits: &str) -> Option<usize> {
    digits
        .parse::<usize>()
        .ok()
        .filter(|row| (1..=MAX_ROWS).contains(row))
        .map(|row| row - 1)
}

/// Parses a reference such as "B3" into (row, col), both 0-based.
pub(crate) fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let reference = reference.to_ascii_uppercase().replace('$', "");
    let split = reference.find(|c: char| c.is_ascii_digit())?;
    let (letters, digits) = reference.split_at(split);
    Some((row_to_index(digits)?, col_to_index(letters)?))
}

/// Formats a 0-based (row, col) pair as an A1 reference.
pub(crate) fn index_to_reference(row: usize, col: usize) -> String {
    let mut column = col + 1;
    let mut letters = String::new();
    while column > 0 {
        column -= 1;
        letters.insert(0, (b'A' + (column % 26) as u8) as char);
        column /= 26;
    }
    format!("{}{}", letters, row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_references() {
        assert_eq!(reference_to_index("A1"), Some((0, 0)));
        assert_eq!(reference_to_index("B3"), Some((2, 1)));
        assert_eq!(reference_to_index("aa10"), Some((9, 26)));
        assert_eq!(reference_to_index("$C$4"), Some((3, 2)));
        assert_eq!(reference_to_index("12"), None);
        assert_eq!(reference_to_index("A0"), None);
        assert_eq!(reference_to_index("A"), None);
    }

    #[test]
    fn references_outside_the_worksheet() {
        assert_eq!(reference_to_index("XFD1048576"), Some((1_048_575, 16_383)));
        assert_eq!(reference_to_index("XFE1"), None);
        assert_eq!(reference_to_index("A1048577"), None);
        assert_eq!(reference_to_index("AAAAAAAAAAAAAAAA1"), None);
        assert_eq!(reference_to_index("A99999999999999999999999"), None);
        assert_eq!(col_to_index("ZZZZZZZZZZZZZZZZZZZZ"), None);
    }

    #[test]
    fn format_references() {
        assert_eq!(index_to_reference(0, 0), "A1");
        assert_eq!(index_to_reference(9, 26), "AA10");
        assert_eq!(index_to_reference(0, 701), "ZZ1");
    }
}
