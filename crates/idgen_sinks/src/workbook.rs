//! Minimal SpreadsheetML writer.
//!
//! Produces a single-sheet workbook with inline strings, a bold shaded
//! header row and fitted column widths. The archive is deterministic: fixed
//! entry order and 1980-01-01 timestamps.

use anyhow::Context;
use idgen_protocol::defaults::{ID_COLUMN, NAME_COLUMN, XLSX_SHEET_NAME};
use idgen_protocol::IdentifierRecord;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::{SinkError, SinkResult};

const MAX_COLUMN_WIDTH: usize = 50;
const HEADER_FILL: &str = "FFDDDDDD";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

/// Render records into an `.xlsx` archive.
pub(crate) fn render_xlsx(records: &[IdentifierRecord]) -> SinkResult<Vec<u8>> {
    let timestamp = zip::DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
        .map_err(|e| SinkError::message(format!("Invalid archive timestamp: {:?}", e)))?;
    let options = SimpleFileOptions::default()
        .last_modified_time(timestamp)
        .compression_method(zip::CompressionMethod::Deflated);

    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES.to_string()),
        ("_rels/.rels", ROOT_RELS.to_string()),
        ("xl/workbook.xml", workbook_xml()),
        ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS.to_string()),
        ("xl/styles.xml", styles_xml()),
        ("xl/worksheets/sheet1.xml", sheet_xml(records)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, content) in &parts {
        zip.start_file(*path, options)
            .with_context(|| format!("Failed to add {} to workbook", path))?;
        zip.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write {}", path))?;
    }
    let cursor = zip.finish().context("Failed to finalize workbook archive")?;
    Ok(cursor.into_inner())
}

fn workbook_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#
        ),
        escape_xml(XLSX_SHEET_NAME)
    )
}

/// Style 0 is the default cell, style 1 the bold header on a grey fill.
fn styles_xml() -> String {
    format!(
        concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            "\n",
            r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
            r#"<fonts count="2"><font><sz val="11"/><name val="Calibri"/></font>"#,
            r#"<font><b/><sz val="11"/><name val="Calibri"/></font></fonts>"#,
            r#"<fills count="3"><fill><patternFill patternType="none"/></fill>"#,
            r#"<fill><patternFill patternType="gray125"/></fill>"#,
            r#"<fill><patternFill patternType="solid"><fgColor rgb="{fill}"/><bgColor rgb="{fill}"/></patternFill></fill></fills>"#,
            r#"<borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#,
            r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
            r#"<cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#,
            r#"<xf numFmtId="0" fontId="1" fillId="2" borderId="0" xfId="0" applyFont="1" applyFill="1"/></cellXfs>"#,
            r#"</styleSheet>"#
        ),
        fill = HEADER_FILL
    )
}

fn sheet_xml(records: &[IdentifierRecord]) -> String {
    let name_width = column_width(NAME_COLUMN, records.iter().map(|r| r.name.as_str()));
    let id_width = column_width(ID_COLUMN, records.iter().map(|r| r.id.as_str()));

    let mut xml = String::with_capacity(256 + records.len() * 96);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push('\n');
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    xml.push_str(&format!(
        r#"<cols><col min="1" max="1" width="{}" customWidth="1"/><col min="2" max="2" width="{}" customWidth="1"/></cols>"#,
        name_width, id_width
    ));
    xml.push_str("<sheetData>");

    push_row(&mut xml, 1, [NAME_COLUMN, ID_COLUMN], Some(1));
    for (idx, record) in records.iter().enumerate() {
        push_row(&mut xml, idx + 2, [record.name.as_str(), record.id.as_str()], None);
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn push_row(xml: &mut String, row: usize, values: [&str; 2], style: Option<u8>) {
    xml.push_str(&format!(r#"<row r="{}">"#, row));
    for (col, value) in ["A", "B"].iter().zip(values) {
        let style_attr = style.map(|s| format!(r#" s="{}""#, s)).unwrap_or_default();
        xml.push_str(&format!(
            r#"<c r="{}{}" t="inlineStr"{}><is><t xml:space="preserve">{}</t></is></c>"#,
            col,
            row,
            style_attr,
            escape_xml(value)
        ));
    }
    xml.push_str("</row>");
}

/// Longest cell (header included) plus padding, capped.
fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    let longest = values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0);
    (longest + 2).min(MAX_COLUMN_WIDTH)
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // XML 1.0 forbids most control characters
            c if (c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r') => {}
            c => out.push(c),
        }
    }
    out
}
