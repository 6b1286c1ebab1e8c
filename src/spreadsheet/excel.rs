//! Microsoft Office Excel package helpers
use crate::error::VolumeSheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

// Package part names shared by the reader and the writer
pub(crate) const PART_CONTENT_TYPES: &str = "[Content_Types].xml";
pub(crate) const PART_ROOT_RELATIONSHIPS: &str = "_rels/.rels";
pub(crate) const PART_WORKBOOK: &str = "xl/workbook.xml";
pub(crate) const PART_WORKBOOK_RELATIONSHIPS: &str = "xl/_rels/workbook.xml.rels";
pub(crate) const PART_STYLES: &str = "xl/styles.xml";
pub(crate) const PART_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

// Namespaces and relationship types
pub(crate) const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
pub(crate) const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
pub(crate) const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
pub(crate) const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
pub(crate) const REL_OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub(crate) const REL_WORKSHEET: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub(crate) const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";

/// Loads worksheet relationships from an Excel package
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML file within the archive
///
/// # Returns
/// Mapping of relationship IDs to worksheet paths
pub(super) fn load_relationships<RS: Read + Seek>(zip: &mut ZipArchive<RS>, path: &str) -> Result<HashMap<String, String>, VolumeSheetError> {
    let mut reader = zip.xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::MissingPartError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships are of interest
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path within the Excel zip archive
///
/// # Arguments
/// * `path` - Original path from relationship or reference
///
/// # Returns
/// Normalized path suitable for accessing files within the zip archive
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    if let Some(stripped) = path.strip_prefix("/xl/") {
        format!("xl/{stripped}")
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

/// Returns the package path of the n-th (1-based) worksheet as written by this crate
pub(crate) fn worksheet_path(number: usize) -> String {
    format!("xl/worksheets/sheet{number}.xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zip_paths_are_normalized() {
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet2.xml")), "xl/worksheets/sheet2.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet3.xml")), "xl/worksheets/sheet3.xml");
        assert_eq!(worksheet_path(4), "xl/worksheets/sheet4.xml");
    }
}
