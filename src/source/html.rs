//! HTML table extraction.
//!
//! Every `<table>` element becomes one [`RawTable`], in document order, nested
//! tables included. Only the direct rows of a table are read (also through
//! `thead`/`tbody`/`tfoot`), so the rows of a nested table never leak into its
//! parent. Spanned cells are expanded by repeating their text.

use crate::source::RawTable;
use encoding_rs::Encoding;
use encoding_rs::WINDOWS_1252;
use scraper::ElementRef;
use scraper::Html;
use scraper::Selector;

/// Upper bound for `colspan`/`rowspan` attributes.
const MAX_SPAN: usize = 1000;

/// Decodes HTML bytes: byte order mark first, then UTF-8, then Windows-1252.
pub(crate) fn decode_html(bytes: &[u8]) -> String {
    if let Some((encoding, bom_length)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_length..]);
        return text.into_owned();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_owned(),
        Err(_) => WINDOWS_1252.decode_without_bom_handling(bytes).0.into_owned(),
    }
}

/// Parses a document and returns its tables in document order.
pub(crate) fn extract_tables(html: &str) -> Vec<RawTable> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("table").expect("Hardcode selector");
    document.select(&selector).map(|table| read_table(&table)).collect()
}

fn read_table(table: &ElementRef) -> RawTable {
    // Pending rowspans per column: (rows still covered, text)
    let mut pending: Vec<(usize, String)> = Vec::new();
    let mut rows = Vec::new();

    for row in get_direct_rows(table) {
        let mut cells = Vec::new();
        let mut col = 0;
        for cell in get_direct_cells(&row) {
            col = fill_pending(&mut pending, &mut cells, col, false);
            let text = cell_text(&cell);
            let (colspan, rowspan) = get_cell_spans(&cell);
            for _ in 0..colspan {
                if pending.len() <= col {
                    pending.resize(col + 1, (0, String::new()));
                }
                if rowspan > 1 {
                    pending[col] = (rowspan - 1, text.clone());
                }
                cells.push(text.clone());
                col += 1;
            }
        }
        fill_pending(&mut pending, &mut cells, col, true);
        rows.push(cells);
    }
    RawTable::new(rows)
}

/// Emits the cells covered by rowspans from earlier rows, starting at `col`.
/// With `trailing` set, gaps before a later covered column are filled with
/// empty strings. Returns the next free column.
fn fill_pending(pending: &mut [(usize, String)], cells: &mut Vec<String>, mut col: usize, trailing: bool) -> usize {
    while col < pending.len() {
        if pending[col].0 > 0 {
            pending[col].0 -= 1;
            cells.push(pending[col].1.clone());
        } else if trailing && pending[col..].iter().any(|(remaining, _)| *remaining > 0) {
            cells.push(String::new());
        } else {
            break;
        }
        col += 1;
    }
    col
}

/// Get direct child rows from a table element (not nested table rows)
fn get_direct_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let mut rows = Vec::new();
    for child in table.children() {
        if let Some(element) = ElementRef::wrap(child) {
            match element.value().name() {
                "tr" => rows.push(element),
                "thead" | "tbody" | "tfoot" => {
                    for inner in element.children() {
                        if let Some(inner) = ElementRef::wrap(inner) {
                            if inner.value().name() == "tr" {
                                rows.push(inner);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    rows
}

/// Get direct `td`/`th` children of a row
fn get_direct_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|element| matches!(element.value().name(), "td" | "th"))
        .collect()
}

fn get_cell_spans(cell: &ElementRef) -> (usize, usize) {
    let span = |name: &str| {
        cell.value()
            .attr(name)
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|value| *value > 0)
            .map_or(1, |value| value.min(MAX_SPAN))
    };
    (span("colspan"), span("rowspan"))
}

/// Cell text with runs of whitespace (including non-breaking spaces) collapsed.
fn cell_text(cell: &ElementRef) -> String {
    let text = cell.text().collect::<String>();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_in_document_order() {
        let html = r#"
            <html><body>
            <table><tr><td>PROYECTO</td></tr><tr><td>CARRETERA: RUTA 5</td></tr></table>
            <table>
              <thead><tr><th>Station</th><th>Cut Area (Sq.m.)</th></tr></thead>
              <tbody>
                <tr><td>&nbsp;</td><td>(Sq.m.)</td></tr>
                <tr><td> 0+000 </td><td>5.00</td></tr>
              </tbody>
            </table>
            </body></html>"#;
        let tables = extract_tables(html);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows(), &[vec!["PROYECTO".to_owned()], vec!["CARRETERA: RUTA 5".to_owned()]]);
        assert_eq!(tables[1].len(), 3);
        assert_eq!(tables[1].cell(0, 1), Some("Cut Area (Sq.m.)"));
        assert_eq!(tables[1].cell(1, 0), Some(""));
        assert_eq!(tables[1].cell(2, 0), Some("0+000"));
    }

    #[test]
    fn nested_tables_stay_separate() {
        let html = "<table><tr><td>a</td><td><table><tr><td>x</td></tr><tr><td>y</td></tr></table></td></tr></table>";
        let tables = extract_tables(html);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].len(), 1);
        assert_eq!(tables[1].len(), 2);
        assert_eq!(tables[1].cell(1, 0), Some("y"));
    }

    #[test]
    fn spans_are_expanded() {
        let html = r#"<table>
            <tr><td rowspan="2">0+000</td><td colspan="2">area</td></tr>
            <tr><td>1</td><td>2</td></tr>
            <tr><td>a</td><td>b</td><td rowspan="2">c</td></tr>
            <tr><td>d</td></tr>
        </table>"#;
        let table = &extract_tables(html)[0];
        assert_eq!(table.rows()[0], vec!["0+000", "area", "area"]);
        assert_eq!(table.rows()[1], vec!["0+000", "1", "2"]);
        assert_eq!(table.rows()[2], vec!["a", "b", "c"]);
        assert_eq!(table.rows()[3], vec!["d", "", "c"]);
    }

    #[test]
    fn legacy_encodings_are_decoded() {
        assert_eq!(decode_html(b"\xC1rea"), "Área");
        assert_eq!(decode_html("Área".as_bytes()), "Área");
        assert_eq!(decode_html(b"\xEF\xBB\xBFkm"), "km");
        assert_eq!(decode_html(b"\xFF\xFEk\x00m\x00"), "km");
    }
}
