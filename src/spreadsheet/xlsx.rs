use crate::error::ResultMessage;
use crate::error::TranscriptError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::reference::row_to_index;
use crate::spreadsheet::reference::MAX_COLUMNS;
use crate::spreadsheet::reference::MAX_ROWS;
use crate::spreadsheet::Cell;
use crate::spreadsheet::Grid;
use crate::spreadsheet::Sheet;
use crate::spreadsheet::SheetDecoder;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use tracing::debug;
use zip::ZipArchive;

// XML element names (local part) used by the XLSX parts we read
const TAG_RELATIONSHIP: &[u8] = b"Relationship"; // Workbook relationship entry
const TAG_SHARED_STRING_ITEM: &[u8] = b"si";      // Shared string table item
const TAG_PHONETIC_TEXT: &[u8] = b"rPh";          // Phonetic text for Asian languages
const TAG_TEXT: &[u8] = b"t";                     // Text content within strings
const TAG_SHEET: &[u8] = b"sheet";                // Worksheet definition
const TAG_ROW: &[u8] = b"row";                    // Row in worksheet
const TAG_CELL: &[u8] = b"c";                     // Cell in worksheet
const TAG_INLINE_STRING: &[u8] = b"is";           // Inline string value
const TAG_VALUE: &[u8] = b"v";                    // Cell value content

/// Reads the first worksheet of an Office Open XML workbook (.xlsx, .xlsm).
#[derive(Clone, Copy, Debug, Default)]
pub struct XlsxDecoder;

impl SheetDecoder for XlsxDecoder {
    fn decode_first_sheet(&self, bytes: &[u8]) -> Result<Grid, TranscriptError> {
        let mut zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|error| TranscriptError::UnreadableInput(format!("not an xlsx workbook: {}", error)))?;
        let (sheet_name, zip_path) = load_first_sheet(&mut zip)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        let sheet = read_sheet(&mut zip, &sheet_name, &zip_path).with_prefix(&zip_path)?;
        debug!(sheet = %sheet.name, cells = sheet.cells.len(), "decoded first worksheet");
        sheet.into_grid(&shared_strings)
    }
}

/// Finds the first worksheet listed in the workbook and its part path.
fn load_first_sheet<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<(String, String), TranscriptError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| TranscriptError::UnreadableInput("missing xl/workbook.xml".to_owned()))?;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    return Ok((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Err(TranscriptError::UnreadableInput("workbook contains no worksheet".to_owned()))
}

/// Loads worksheet relationships: relationship id to part path.
fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, TranscriptError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| TranscriptError::UnreadableInput(format!("missing {}", path)))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the shared string table; a workbook without one has no shared strings.
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, TranscriptError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Reads every cell of a worksheet part.
/// Cells without an `r` attribute are placed by their order within the row; a reference
/// outside the worksheet makes the whole part unreadable.
fn read_sheet<RS: Read + Seek>(zip: &mut ZipArchive<RS>, sheet_name: &str, zip_path: &str) -> Result<Sheet, TranscriptError> {
    let mut sheet = Sheet::new(sheet_name);
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = CellType::default();
    let mut value = String::new();
    let mut reader = zip.xml_reader(zip_path)?
        .ok_or_else(|| TranscriptError::UnreadableInput(format!("missing worksheet part {}", zip_path)))?;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_ROW => {
            if let Some(number) = event.get_attribute_value("r")? {
                row_count = row_to_index(&number).ok_or_else(|| invalid_reference(&number))?;
            }
        }
        Event::End(event) if event.local_name().as_ref() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_CELL => {
            (row, col) = match event.get_attribute_value("r")? {
                Some(reference) => {
                    reference_to_index(&reference).ok_or_else(|| invalid_reference(&reference))?
                }
                None if row_count < MAX_ROWS && col_count < MAX_COLUMNS => (row_count, col_count),
                None => Err(invalid_reference(&index_to_reference(row_count, col_count)))?,
            };
            col_count = col + 1;
            kind = CellType::parse_type_attribute(event.get_attribute_value("t")?.as_deref());
            value.clear();
        }
        Event::Start(event) if kind != CellType::Empty && event.local_name().as_ref() == TAG_INLINE_STRING => {
            value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
        }
        Event::Start(event) if kind != CellType::Empty && event.local_name().as_ref() == TAG_VALUE => {
            value = read_string_value(&mut reader, TAG_VALUE, true)?;
        }
        Event::End(event) if event.local_name().as_ref() == TAG_CELL => {
            if kind != CellType::Empty && !value.is_empty() {
                sheet.push(Cell {
                    row,
                    col,
                    kind,
                    value: value.to_owned(),
                });
            }
            kind = CellType::default();
            value.clear();
        }
    });
    Ok(sheet)
}

fn invalid_reference(reference: &str) -> TranscriptError {
    TranscriptError::UnreadableInput(format!("invalid cell reference '{}'", reference))
}

/// Reads string content up to `end_tag`, skipping phonetic annotations.
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: &[u8],
    is_text_content: bool,
) -> Result<String, TranscriptError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.local_name().as_ref() == end_tag => break,
        Event::Start(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.local_name().as_ref() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.local_name().as_ref() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}

/// Normalizes a relationship target to a path inside the archive.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{}", path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::spreadsheet::RawCell;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<sheets><sheet name="Transcript" sheetId="1" r:id="rId1"/><sheet name="Notes" sheetId="2" r:id="rId2"/></sheets>
</workbook>"#;

    const RELATIONSHIPS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet2.xml"/>
<Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#;

    const SHARED_STRINGS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="5" uniqueCount="5">
<si><t>Course</t></si><si><t>Final Grade %</t></si><si><t>Credits</t></si><si><t>CALC 1000</t></si><si><r><t>Writing </t></r><r><t>&amp; Rhetoric</t></r></si>
</sst>"#;

    const SHEET1: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c><c r="C1" t="s"><v>2</v></c></row>
<row r="2"><c r="A2" t="s"><v>3</v></c><c r="B2"><v>85</v></c><c r="C2"><v>0.5</v></c></row>
<row r="3"><c r="A3" t="s"><v>4</v></c><c r="B3"><v>77.5</v></c><c r="C3" t="e"><v>#N/A</v></c></row>
<row r="4"><c r="A4" t="inlineStr"><is><t>BIOL 1001A</t></is></c><c r="B4" t="str"><v>91</v></c></row>
</sheetData>
</worksheet>"#;

    const SHEET2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>
<row r="1"><c r="A1" t="inlineStr"><is><t>ignored</t></is></c></row>
</sheetData></worksheet>"#;

    pub(crate) fn build_xlsx(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, content) in parts {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    pub(crate) fn transcript_xlsx() -> Vec<u8> {
        build_xlsx(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/sharedStrings.xml", SHARED_STRINGS),
            ("xl/worksheets/sheet1.xml", SHEET1),
            ("xl/worksheets/sheet2.xml", SHEET2),
        ])
    }

    #[test]
    fn decode_first_sheet_only() {
        let grid = XlsxDecoder.decode_first_sheet(&transcript_xlsx()).unwrap();
        assert_eq!(grid.len(), 4);
        assert_eq!(grid[0], vec![RawCell::from("Course"), RawCell::from("Final Grade %"), RawCell::from("Credits")]);
        assert_eq!(grid[1], vec![RawCell::from("CALC 1000"), RawCell::Number(85.0), RawCell::Number(0.5)]);
        assert_eq!(grid[2], vec![RawCell::from("Writing & Rhetoric"), RawCell::Number(77.5), RawCell::Empty]);
        assert_eq!(grid[3], vec![RawCell::from("BIOL 1001A"), RawCell::from("91")]);
    }

    #[test]
    fn not_a_zip_is_unreadable() {
        let error = XlsxDecoder.decode_first_sheet(b"Course,Grade\nCALC,85").unwrap_err();
        assert!(matches!(error, TranscriptError::UnreadableInput(_)));
    }

    #[test]
    fn workbook_without_sheets_is_unreadable() {
        let bytes = build_xlsx(&[
            ("xl/workbook.xml", r#"<workbook><sheets/></workbook>"#),
            ("xl/_rels/workbook.xml.rels", r#"<Relationships/>"#),
        ]);
        let error = XlsxDecoder.decode_first_sheet(&bytes).unwrap_err();
        assert!(error.is_unreadable());
    }

    fn with_sheet(sheet: &str) -> Vec<u8> {
        build_xlsx(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELATIONSHIPS),
            ("xl/worksheets/sheet1.xml", sheet),
        ])
    }

    #[test]
    fn overflowing_reference_is_unreadable() {
        let bytes = with_sheet(
            r#"<worksheet><sheetData><row r="1"><c r="AAAAAAAAAAAAAAAA1" t="inlineStr"><is><t>x</t></is></c></row></sheetData></worksheet>"#,
        );
        let error = XlsxDecoder.decode_first_sheet(&bytes).unwrap_err();
        assert!(error.is_unreadable());
        assert!(error.to_string().contains("invalid cell reference 'AAAAAAAAAAAAAAAA1'"));
    }

    #[test]
    fn out_of_range_references_are_unreadable() {
        for sheet in [
            r#"<worksheet><sheetData><row r="1"><c r="XFE1"><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="1"><c r="A1048577"><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="0"><c><v>1</v></c></row></sheetData></worksheet>"#,
            r#"<worksheet><sheetData><row r="1"><c r="B?"><v>1</v></c></row></sheetData></worksheet>"#,
        ] {
            let error = XlsxDecoder.decode_first_sheet(&with_sheet(sheet)).unwrap_err();
            assert!(error.is_unreadable(), "{}", sheet);
        }
    }

    #[test]
    fn cells_without_references_follow_row_order() {
        let bytes = with_sheet(
            r#"<worksheet><sheetData><row r="2"><c t="inlineStr"><is><t>CS 1026</t></is></c><c><v>90</v></c></row></sheetData></worksheet>"#,
        );
        let grid = XlsxDecoder.decode_first_sheet(&bytes).unwrap();
        assert_eq!(grid, vec![vec![RawCell::from("CS 1026"), RawCell::Number(90.0)]]);
    }

    #[test]
    fn zip_paths() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }
}
