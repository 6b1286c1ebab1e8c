//! XLSX package writer.
//!
//! Produces the minimal set of parts a spreadsheet application needs: content
//! types, package and workbook relationships, the workbook, a default style
//! sheet and one worksheet per sheet. Strings are written inline and formulas
//! without cached values; the workbook asks for a full recalculation on load.

use crate::error::VolumeSheetError;
use crate::helpers::xml::XmlWriter;
use crate::helpers::zip::ZipWriterHelper;
use crate::spreadsheet::cell::CellValue;
use crate::spreadsheet::excel;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Workbook;
use std::fs;
use std::io::Cursor;
use std::path::Path;
use zip::ZipWriter;

const CONTENT_TYPE_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";
const CONTENT_TYPE_XML: &str = "application/xml";
const CONTENT_TYPE_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CONTENT_TYPE_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CONTENT_TYPE_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

/// Serializes the workbook and replaces the file at `path`.
///
/// The package is assembled in memory first so a failure never leaves a
/// truncated file behind.
pub(crate) fn write_workbook(workbook: &Workbook, path: &Path) -> Result<(), VolumeSheetError> {
    let bytes = to_bytes(workbook)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Serializes the workbook into XLSX bytes.
pub(crate) fn to_bytes(workbook: &Workbook) -> Result<Vec<u8>, VolumeSheetError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let sheets = workbook.sheets();
    zip.write_part(excel::PART_CONTENT_TYPES, &content_types(sheets.len())?)?;
    zip.write_part(excel::PART_ROOT_RELATIONSHIPS, &root_relationships()?)?;
    zip.write_part(excel::PART_WORKBOOK, &workbook_part(sheets)?)?;
    zip.write_part(excel::PART_WORKBOOK_RELATIONSHIPS, &workbook_relationships(sheets.len())?)?;
    zip.write_part(excel::PART_STYLES, &styles()?)?;
    for (index, sheet) in sheets.iter().enumerate() {
        zip.write_part(&excel::worksheet_path(index + 1), &worksheet(sheet)?)?;
    }
    Ok(zip.finish()?.into_inner())
}

fn content_types(sheet_count: usize) -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("Types", &[("xmlns", excel::NS_CONTENT_TYPES)])?;
    writer.empty("Default", &[("Extension", "rels"), ("ContentType", CONTENT_TYPE_RELATIONSHIPS)])?;
    writer.empty("Default", &[("Extension", "xml"), ("ContentType", CONTENT_TYPE_XML)])?;
    writer.empty("Override", &[("PartName", "/xl/workbook.xml"), ("ContentType", CONTENT_TYPE_WORKBOOK)])?;
    writer.empty("Override", &[("PartName", "/xl/styles.xml"), ("ContentType", CONTENT_TYPE_STYLES)])?;
    for number in 1..=sheet_count {
        let part_name = format!("/{}", excel::worksheet_path(number));
        writer.empty("Override", &[("PartName", part_name.as_str()), ("ContentType", CONTENT_TYPE_WORKSHEET)])?;
    }
    writer.end("Types")?;
    Ok(writer.into_inner())
}

fn root_relationships() -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("Relationships", &[("xmlns", excel::NS_PACKAGE_RELATIONSHIPS)])?;
    writer.empty("Relationship", &[
        ("Id", "rId1"),
        ("Type", excel::REL_OFFICE_DOCUMENT),
        ("Target", excel::PART_WORKBOOK),
    ])?;
    writer.end("Relationships")?;
    Ok(writer.into_inner())
}

fn workbook_part(sheets: &[Sheet]) -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("workbook", &[("xmlns", excel::NS_MAIN), ("xmlns:r", excel::NS_RELATIONSHIPS)])?;
    writer.start("sheets", &[])?;
    for (index, sheet) in sheets.iter().enumerate() {
        let sheet_id = (index + 1).to_string();
        let relationship_id = format!("rId{}", index + 1);
        writer.empty("sheet", &[
            ("name", sheet.name.as_str()),
            ("sheetId", sheet_id.as_str()),
            ("r:id", relationship_id.as_str()),
        ])?;
    }
    writer.end("sheets")?;
    writer.empty("calcPr", &[("calcId", "0"), ("fullCalcOnLoad", "1")])?;
    writer.end("workbook")?;
    Ok(writer.into_inner())
}

fn workbook_relationships(sheet_count: usize) -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("Relationships", &[("xmlns", excel::NS_PACKAGE_RELATIONSHIPS)])?;
    for number in 1..=sheet_count {
        let id = format!("rId{number}");
        let target = format!("worksheets/sheet{number}.xml");
        writer.empty("Relationship", &[("Id", id.as_str()), ("Type", excel::REL_WORKSHEET), ("Target", target.as_str())])?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    writer.empty("Relationship", &[("Id", styles_id.as_str()), ("Type", excel::REL_STYLES), ("Target", "styles.xml")])?;
    writer.end("Relationships")?;
    Ok(writer.into_inner())
}

/// The smallest style sheet spreadsheet applications accept: one font, the two
/// mandatory fills, one border and one cell format.
fn styles() -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("styleSheet", &[("xmlns", excel::NS_MAIN)])?;

    writer.start("fonts", &[("count", "1")])?;
    writer.start("font", &[])?;
    writer.empty("sz", &[("val", "11")])?;
    writer.empty("name", &[("val", "Calibri")])?;
    writer.end("font")?;
    writer.end("fonts")?;

    writer.start("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        writer.start("fill", &[])?;
        writer.empty("patternFill", &[("patternType", pattern)])?;
        writer.end("fill")?;
    }
    writer.end("fills")?;

    writer.start("borders", &[("count", "1")])?;
    writer.start("border", &[])?;
    for side in ["left", "right", "top", "bottom", "diagonal"] {
        writer.empty(side, &[])?;
    }
    writer.end("border")?;
    writer.end("borders")?;

    writer.start("cellStyleXfs", &[("count", "1")])?;
    writer.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
    writer.end("cellStyleXfs")?;
    writer.start("cellXfs", &[("count", "1")])?;
    writer.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0"), ("xfId", "0")])?;
    writer.end("cellXfs")?;

    writer.end("styleSheet")?;
    Ok(writer.into_inner())
}

fn worksheet(sheet: &Sheet) -> Result<Vec<u8>, VolumeSheetError> {
    let mut writer = XmlWriter::new(Vec::new())?;
    writer.start("worksheet", &[("xmlns", excel::NS_MAIN), ("xmlns:r", excel::NS_RELATIONSHIPS)])?;
    let dimension = match sheet.dimension() {
        Some(((first_row, first_col), (last_row, last_col))) => format!(
            "{}:{}",
            index_to_reference(first_row, first_col),
            index_to_reference(last_row, last_col)
        ),
        None => "A1".to_owned(),
    };
    writer.empty("dimension", &[("ref", dimension.as_str())])?;
    writer.start("sheetData", &[])?;
    for (row, cells) in sheet.rows() {
        let row_number = (row + 1).to_string();
        writer.start("row", &[("r", row_number.as_str())])?;
        for (col, value) in cells {
            write_cell(&mut writer, &index_to_reference(row, col), value)?;
        }
        writer.end("row")?;
    }
    writer.end("sheetData")?;
    writer.end("worksheet")?;
    Ok(writer.into_inner())
}

fn write_cell(writer: &mut XmlWriter<Vec<u8>>, reference: &str, value: &CellValue) -> Result<(), VolumeSheetError> {
    match value {
        CellValue::Number(number) => {
            writer.start("c", &[("r", reference)])?;
            writer.text_element("v", &[], &number.to_string())?;
        }
        CellValue::Bool(flag) => {
            writer.start("c", &[("r", reference), ("t", "b")])?;
            writer.text_element("v", &[], if *flag { "1" } else { "0" })?;
        }
        CellValue::Text(text) => {
            writer.start("c", &[("r", reference), ("t", "inlineStr")])?;
            writer.start("is", &[])?;
            if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                writer.text_element("t", &[("xml:space", "preserve")], text)?;
            } else {
                writer.text_element("t", &[], text)?;
            }
            writer.end("is")?;
        }
        CellValue::Formula(formula) => {
            writer.start("c", &[("r", reference)])?;
            writer.text_element("f", &[], formula)?;
        }
    }
    writer.end("c")
}
