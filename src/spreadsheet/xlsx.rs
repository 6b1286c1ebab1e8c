use crate::error::VolumeSheetError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_SHEET: QName = QName(b"sheet");             // Worksheet definition
const TAG_ROW: QName = QName(b"row");                 // Row in worksheet
const TAG_CELL: QName = QName(b"c");                  // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");        // Inline string value
const TAG_VALUE: QName = QName(b"v");                 // Cell value content
const TAG_FORMULA: QName = QName(b"f");               // Cell formula

/// Reads every worksheet of an XLSX file into memory.
///
/// Only cell content survives: values, shared/inline strings and formula text.
/// Formulas without text (shared formula followers) fall back to their cached value.
///
/// # Arguments
/// * `path` - Path to the XLSX file
///
/// # Returns
/// The workbook with sheets in tab order
pub(crate) fn read_workbook(path: &Path) -> Result<Workbook, VolumeSheetError> {
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(BufReader::new(file))?;
    let sheets = load_workbook(&mut zip)?;
    let shared_strings = load_shared_strings(&mut zip)?;

    let mut workbook = Workbook::default();
    for (sheet_name, zip_path) in &sheets {
        let sheet = read_sheet(&mut zip, sheet_name, zip_path, &shared_strings)?;
        workbook.sheets.push(sheet);
    }
    Ok(workbook)
}

/// Loads workbook structure from the XLSX file
///
/// Parses the workbook.xml file to extract worksheet names and their corresponding
/// XML file paths.
///
/// # Returns
/// Worksheets as (name, zip_path) pairs in tab order
fn load_workbook<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<(String, String)>, VolumeSheetError> {
    let relationships = load_relationships(zip, excel::PART_WORKBOOK_RELATIONSHIPS)?;
    let mut reader = zip.xml_reader(excel::PART_WORKBOOK)?
        .ok_or_else(|| SpreadsheetError::MissingPartError(excel::PART_WORKBOOK.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
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
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table, empty when the package has none
fn load_shared_strings<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<Vec<String>, VolumeSheetError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader(excel::PART_SHARED_STRINGS)? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Reads one worksheet part into a sheet
fn read_sheet<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    sheet_name: &str,
    zip_path: &str,
    shared_strings: &[String],
) -> Result<Sheet, VolumeSheetError> {
    let mut sheet = Sheet::new(sheet_name);
    let mut reader = zip.xml_reader(zip_path)?
        .ok_or_else(|| SpreadsheetError::MissingPartError(zip_path.to_string()))?;
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut current = None::<Cell>;
    match_xml_events!(reader => {
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            let (row, col) = event.get_attribute_value("r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row_count, col_count));
            // Rows without `r` continue after the last explicit position
            row_count = row;
            col_count = col + 1;
            let kind = CellType::parse(event.get_attribute_value("t")?.as_deref());
            current = Some(Cell {
                row,
                col,
                kind,
                value: String::new(),
                formula: None,
            });
        }
        Event::Start(event) if event.name() == TAG_FORMULA => {
            let formula = read_string_value(&mut reader, TAG_FORMULA, true)?;
            if let Some(cell) = current.as_mut() {
                cell.formula = Some(formula);
            }
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            let value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            if let Some(cell) = current.as_mut() {
                cell.value = value;
            }
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            let value = read_string_value(&mut reader, TAG_VALUE, true)?;
            if let Some(cell) = current.as_mut() {
                cell.value = value;
            }
        }
        Event::End(event) if event.name() == TAG_CELL => {
            if let Some(cell) = current.take() {
                let value = cell.to_value(shared_strings).map_err(|message| {
                    SpreadsheetError::CellValueError(sheet_name.to_owned(), cell.reference(), message)
                })?;
                if let Some(value) = value {
                    sheet.set(cell.row, cell.col, value);
                }
            }
        }
    });
    Ok(sheet)
}

/// Reads string value from XML content, handling text and CDATA sections
///
/// Extracts string content from XML elements, skipping phonetic text annotations
/// and properly handling both text nodes and CDATA sections.
///
/// # Arguments
/// * `reader` - XML reader positioned at the start of the string content
/// * `end_tag` - XML tag that marks the end of the string content
/// * `is_text_content` - Whether to treat the content as text by default
///
/// # Returns
/// Extracted string value
fn read_string_value<R: BufRead>(
    reader: &mut XmlReader<R>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, VolumeSheetError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_bytes_text(&event)?,
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
