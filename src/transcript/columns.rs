//! Header-based column inference for tabular transcripts.

use crate::spreadsheet::RawCell;

/// Words whose presence in the first row marks it as a header row.
const HEADER_MARKERS: [&str; 3] = ["course", "name", "grade"];

/// The semantic fields a transcript table can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Name,
    Percentage,
    Credits,
    Term,
}

impl Field {
    /// Header synonyms in priority order.
    pub const fn synonyms(&self) -> &'static [&'static str] {
        match self {
            Self::Name => &["course", "name", "subject"],
            Self::Percentage => &["percentage", "grade", "mark"],
            Self::Credits => &["credits", "credit", "weight"],
            Self::Term => &["semester", "term", "session"],
        }
    }

    /// Column read when no header names this field. The term has no fixed position.
    pub const fn fallback_position(&self) -> Option<usize> {
        match self {
            Self::Name => Some(0),
            Self::Percentage => Some(1),
            Self::Credits => Some(2),
            Self::Term => None,
        }
    }
}

/// Returns the index of the first header containing a synonym, case-insensitively.
///
/// Synonyms are tried in order and the first one found anywhere wins; within a synonym the
/// leftmost matching header wins. "Final Grade %" therefore matches the synonym "grade".
pub fn index_of<S: AsRef<str>>(headers: &[S], synonyms: &[&str]) -> Option<usize> {
    let headers: Vec<String> = headers.iter().map(|header| header.as_ref().to_lowercase()).collect();
    synonyms.iter().find_map(|synonym| {
        let synonym = synonym.to_lowercase();
        headers.iter().position(|header| header.contains(&synonym))
    })
}

/// True when any text cell of the row contains one of the header marker words.
pub fn is_header_row(row: &[RawCell]) -> bool {
    row.iter()
        .filter_map(RawCell::as_str)
        .map(str::to_lowercase)
        .any(|text| HEADER_MARKERS.iter().any(|marker| text.contains(marker)))
}

/// Resolved column index per field; `None` means positional fallback.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ColumnMap {
    pub name: Option<usize>,
    pub percentage: Option<usize>,
    pub credits: Option<usize>,
    pub term: Option<usize>,
}

impl ColumnMap {
    /// Maps fields from a header row. Non-text header cells count as blank headers.
    pub fn from_header(row: &[RawCell]) -> Self {
        let headers: Vec<&str> = row
            .iter()
            .map(|cell| cell.as_str().map(str::trim).unwrap_or(""))
            .collect();
        let resolve = |field: Field| index_of(headers.as_slice(), field.synonyms());
        Self {
            name: resolve(Field::Name),
            percentage: resolve(Field::Percentage),
            credits: resolve(Field::Credits),
            term: resolve(Field::Term),
        }
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        match field {
            Field::Name => self.name,
            Field::Percentage => self.percentage,
            Field::Credits => self.credits,
            Field::Term => self.term,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<RawCell> {
        cells.iter().map(|cell| RawCell::from(*cell)).collect()
    }

    #[test]
    fn substring_and_case_insensitive() {
        assert_eq!(index_of(&["Code", "Final Grade %", "Weight"], &["percentage", "grade", "mark"]), Some(1));
        assert_eq!(index_of(&["COURSE TITLE", "x"], &["course"]), Some(0));
    }

    #[test]
    fn synonym_priority_beats_position() {
        // "grade" appears first, but "percentage" is the higher-priority synonym
        let headers = ["Grade Level", "Percentage"];
        assert_eq!(index_of(&headers, &["percentage", "grade", "mark"]), Some(1));
    }

    #[test]
    fn leftmost_column_within_synonym() {
        let headers = ["Course Code", "Course Title"];
        assert_eq!(index_of(&headers, &["course", "name"]), Some(0));
    }

    #[test]
    fn not_found() {
        assert_eq!(index_of(&["a", "b"], &["course"]), None);
        assert_eq!(index_of::<&str>(&[], &["course"]), None);
    }

    #[test]
    fn header_detection() {
        assert!(is_header_row(&row(&["Course", "Grade", "Credits"])));
        assert!(is_header_row(&row(&["Student NAME"])));
        assert!(!is_header_row(&row(&["CALC1000", "85", "0.5"])));
        assert!(!is_header_row(&[RawCell::Number(85.0), RawCell::Empty]));
    }

    #[test]
    fn map_from_header() {
        let map = ColumnMap::from_header(&row(&["Semester", "Subject", "Mark", "Weight"]));
        assert_eq!(map, ColumnMap { name: Some(1), percentage: Some(2), credits: Some(3), term: Some(0) });
    }

    #[test]
    fn name_synonym_matches_course_before_grade_column() {
        // "Course Grade" contains "course", so the name resolves to it before "Name"
        let map = ColumnMap::from_header(&row(&["Course Grade", "Name"]));
        assert_eq!(map.get(Field::Name), Some(0));
        assert_eq!(map.get(Field::Percentage), Some(0));
        assert_eq!(map.get(Field::Credits), None);
    }
}
