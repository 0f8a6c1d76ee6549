//! First-worksheet reader for `.xlsx` workbooks.
//!
//! Reads just enough SpreadsheetML to pull one column of strings: the
//! workbook's first sheet, the shared-string table and inline strings.
//! Elements are matched by local name, so prefixed markup (`<x:row>`) reads
//! the same as the default namespace. Styles, formulas and dates are ignored.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fmt;
use std::io::{Cursor, Read};
use zip::ZipArchive;

use super::text::pick_column;
use super::{Result, SourceError};

const WORKBOOK_PART: &str = "xl/workbook.xml";
const RELS_PART: &str = "xl/_rels/workbook.xml.rels";
const SHARED_PART: &str = "xl/sharedStrings.xml";
const FALLBACK_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Columns A through XFD.
const MAX_COLUMNS: usize = 16_384;

/// Non-empty cells of one row as (zero-based column, text).
type Row = Vec<(usize, String)>;

/// Cells of the name column below the header, plus the header text.
pub(super) fn read_name_column(bytes: &[u8]) -> Result<(Vec<String>, String)> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SourceError::Xlsx(format!("not a valid workbook: {}", e)))?;

    let sheet_path = first_sheet_path(&mut archive)?;
    let shared = match read_part(&mut archive, SHARED_PART)? {
        Some(xml) => shared_strings(&xml)?,
        None => Vec::new(),
    };
    let sheet = read_part(&mut archive, &sheet_path)?
        .ok_or_else(|| SourceError::Xlsx(format!("missing worksheet {}", sheet_path)))?;

    let mut rows = sheet_rows(&sheet, &sheet_path, &shared)?.into_iter();
    let header = rows.next().ok_or(SourceError::MissingColumn)?;
    let slot = pick_column(header.iter().map(|(_, text)| text.as_str()))
        .ok_or(SourceError::MissingColumn)?;
    let (position, column) = header[slot].clone();

    let names = rows
        .filter_map(|row| {
            row.into_iter()
                .find(|(column, _)| *column == position)
                .map(|(_, text)| text)
        })
        .filter(|cell| !cell.trim().is_empty())
        .collect();
    Ok((names, column.trim().to_string()))
}

fn read_part(archive: &mut ZipArchive<Cursor<&[u8]>>, name: &str) -> Result<Option<String>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(zip::result::ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(SourceError::Xlsx(format!("cannot open {}: {}", name, e))),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|e| SourceError::Xlsx(format!("cannot read {}: {}", name, e)))?;
    Ok(Some(content))
}

fn xml_error(part: &str, err: impl fmt::Display) -> SourceError {
    SourceError::Xlsx(format!("malformed {}: {}", part, err))
}

/// Unescaped value of the attribute with local name `name`.
fn attribute(element: &BytesStart<'_>, name: &[u8], part: &str) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| xml_error(part, e))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| xml_error(part, e))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// First element named `tag` for which `pick` returns a value.
fn find_element<T>(
    xml: &str,
    part: &str,
    tag: &[u8],
    mut pick: impl FnMut(&BytesStart<'_>) -> Result<Option<T>>,
) -> Result<Option<T>> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == tag => {
                if let Some(found) = pick(&e)? {
                    return Ok(Some(found));
                }
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Resolve the first `<sheet>` of the workbook through its relationship id.
fn first_sheet_path(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let Some(workbook) = read_part(archive, WORKBOOK_PART)? else {
        return Ok(FALLBACK_SHEET.to_string());
    };
    let rel_id = find_element(&workbook, WORKBOOK_PART, b"sheet", |sheet| {
        attribute(sheet, b"id", WORKBOOK_PART).map(Some)
    })?
    .flatten();
    let Some(rel_id) = rel_id else {
        return Ok(FALLBACK_SHEET.to_string());
    };
    let Some(rels) = read_part(archive, RELS_PART)? else {
        return Ok(FALLBACK_SHEET.to_string());
    };

    let target = find_element(&rels, RELS_PART, b"Relationship", |rel| {
        if attribute(rel, b"Id", RELS_PART)?.as_deref() == Some(rel_id.as_str()) {
            attribute(rel, b"Target", RELS_PART)
        } else {
            Ok(None)
        }
    })?;

    Ok(match target {
        Some(target) => match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        },
        None => FALLBACK_SHEET.to_string(),
    })
}

/// `<t>` text of a string item; phonetic runs (`<rPh>`) are skipped.
#[derive(Debug, Default)]
struct TextRuns {
    text: String,
    in_text: bool,
    phonetic: usize,
}

impl TextRuns {
    fn start(&mut self, tag: &[u8]) {
        match tag {
            b"t" => self.in_text = self.phonetic == 0,
            b"rPh" => self.phonetic += 1,
            _ => {}
        }
    }

    fn end(&mut self, tag: &[u8]) {
        match tag {
            b"t" => self.in_text = false,
            b"rPh" => self.phonetic = self.phonetic.saturating_sub(1),
            _ => {}
        }
    }

    fn push(&mut self, text: &str) {
        if self.in_text {
            self.text.push_str(text);
        }
    }
}

fn shared_strings(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);
    let mut strings = Vec::new();
    let mut item: Option<TextRuns> = None;

    loop {
        match reader.read_event().map_err(|e| xml_error(SHARED_PART, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"si" => item = Some(TextRuns::default()),
                tag => {
                    if let Some(runs) = item.as_mut() {
                        runs.start(tag);
                    }
                }
            },
            Event::Empty(e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(e) => match e.local_name().as_ref() {
                b"si" => strings.extend(item.take().map(|runs| runs.text)),
                tag => {
                    if let Some(runs) = item.as_mut() {
                        runs.end(tag);
                    }
                }
            },
            Event::Text(text) => {
                if let Some(runs) = item.as_mut() {
                    runs.push(&text.unescape().map_err(|e| xml_error(SHARED_PART, e))?);
                }
            }
            Event::CData(data) => {
                if let Some(runs) = item.as_mut() {
                    runs.push(&String::from_utf8_lossy(&data));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(strings)
}

/// A `<c>` element being read.
struct Cell {
    column: usize,
    kind: Option<String>,
    value: String,
    in_value: bool,
    runs: TextRuns,
}

impl Cell {
    fn open(element: &BytesStart<'_>, part: &str, next_column: usize) -> Result<Self> {
        let column = match attribute(element, b"r", part)? {
            Some(reference) => column_index(&reference)?.unwrap_or(next_column),
            None => next_column,
        };
        if column >= MAX_COLUMNS {
            return Err(SourceError::Xlsx(format!(
                "{} has a cell beyond column XFD",
                part
            )));
        }
        Ok(Self {
            column,
            kind: attribute(element, b"t", part)?,
            value: String::new(),
            in_value: false,
            runs: TextRuns::default(),
        })
    }

    fn push(&mut self, text: &str) {
        if self.in_value {
            self.value.push_str(text);
        } else {
            self.runs.push(text);
        }
    }

    fn text(self, shared: &[String]) -> String {
        match self.kind.as_deref() {
            Some("s") => self
                .value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| shared.get(idx).cloned())
                .unwrap_or_default(),
            Some("inlineStr") => self.runs.text,
            _ => self.value,
        }
    }
}

/// Rows of non-empty cells in document order. Only cells that carry text
/// are kept, so sparse references cost nothing.
fn sheet_rows(xml: &str, part: &str, shared: &[String]) -> Result<Vec<Row>> {
    let mut reader = Reader::from_str(xml);
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut next_column = 0;
    let mut cell: Option<Cell> = None;

    loop {
        match reader.read_event().map_err(|e| xml_error(part, e))? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"row" => {
                    row = Vec::new();
                    next_column = 0;
                }
                b"c" => cell = Some(Cell::open(&e, part, next_column)?),
                tag => match cell.as_mut() {
                    Some(open) if tag == b"v" => open.in_value = true,
                    Some(open) => open.runs.start(tag),
                    None => {}
                },
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"c" => next_column = Cell::open(&e, part, next_column)?.column + 1,
                _ => {}
            },
            Event::Text(text) => {
                if let Some(open) = cell.as_mut() {
                    open.push(&text.unescape().map_err(|e| xml_error(part, e))?);
                }
            }
            Event::CData(data) => {
                if let Some(open) = cell.as_mut() {
                    open.push(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(done) = cell.take() {
                        next_column = done.column + 1;
                        let column = done.column;
                        let text = done.text(shared);
                        if !text.is_empty() {
                            row.push((column, text));
                        }
                    }
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                tag => match cell.as_mut() {
                    Some(open) if tag == b"v" => open.in_value = false,
                    Some(open) => open.runs.end(tag),
                    None => {}
                },
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(rows)
}

/// Zero-based column of an `A1`-style reference; `None` without letters.
fn column_index(reference: &str) -> Result<Option<usize>> {
    let letters = reference.bytes().take_while(|b| b.is_ascii_alphabetic());
    let mut index = 0usize;
    for letter in letters {
        index = index * 26 + (letter.to_ascii_uppercase() - b'A') as usize + 1;
        if index > MAX_COLUMNS {
            return Err(SourceError::Xlsx(format!(
                "cell reference {} is beyond column XFD",
                reference
            )));
        }
    }
    Ok(index.checked_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const WORKBOOK: &str = r#"<workbook xmlns:r="rel"><sheets><sheet name="People" sheetId="7" r:id="rId3"/></sheets></workbook>"#;
    const RELS: &str = r#"<Relationships><Relationship Id="rId1" Target="styles.xml"/><Relationship Target="worksheets/people.xml" Id="rId3"/></Relationships>"#;

    fn workbook(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn single_sheet(rows: &str) -> Vec<u8> {
        let sheet = format!("<worksheet><sheetData>{}</sheetData></worksheet>", rows);
        workbook(&[(FALLBACK_SHEET, &sheet)])
    }

    #[test]
    fn test_shared_strings_and_priority() {
        let shared = r#"<sst><si><t>Trial</t></si><si><t>Subject</t></si><si><r><t>Ann </t></r><r><t>Lee</t></r></si><si><t>Bob &amp; Co</t></si><si><t>T1</t></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>
            <row r="2"><c r="A2" t="s"><v>4</v></c><c r="B2" t="s"><v>2</v></c></row>
            <row r="3"><c r="B3" t="s"><v>3</v></c></row>
            <row r="4"><c r="A4" t="s"><v>4</v></c></row>
        </sheetData></worksheet>"#;
        let bytes = workbook(&[
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/people.xml", sheet),
        ]);

        let (names, column) = read_name_column(&bytes).unwrap();
        assert_eq!(column, "Subject");
        assert_eq!(names, vec!["Ann Lee", "Bob & Co"]);
    }

    #[test]
    fn test_inline_strings_and_fallback_sheet() {
        let bytes = single_sheet(
            r#"<row r="1"><c r="A1" t="inlineStr"><is><t>ID</t></is></c><c r="C1" t="inlineStr"><is><t xml:space="preserve">NAME</t></is></c></row>
            <row r="2"><c r="A2"><v>17</v></c><c r="C2" t="inlineStr"><is><t>O&apos;Neil</t></is></c></row>
            <row r="3"><c r="C3" t="inlineStr"><is><t>&#201;lodie</t></is></c></row>"#,
        );

        let (names, column) = read_name_column(&bytes).unwrap();
        assert_eq!(column, "NAME");
        assert_eq!(names, vec!["O'Neil", "Élodie"]);
    }

    #[test]
    fn test_prefixed_elements() {
        let workbook_xml = r#"<x:workbook xmlns:x="main" xmlns:r="rel"><x:sheets><x:sheet name="S" sheetId="1" r:id="rId1"/></x:sheets></x:workbook>"#;
        let rels = r#"<Relationships><Relationship Id="rId1" Target="worksheets/data.xml"/></Relationships>"#;
        let shared = r#"<x:sst xmlns:x="main"><x:si><x:t>Name</x:t></x:si><x:si><x:t>Ann</x:t></x:si></x:sst>"#;
        let sheet = r#"<x:worksheet xmlns:x="main"><x:sheetData>
            <x:row r="1"><x:c r="A1" t="s"><x:v>0</x:v></x:c></x:row>
            <x:row r="2"><x:c r="A2" t="s"><x:v>1</x:v></x:c></x:row>
        </x:sheetData></x:worksheet>"#;
        let bytes = workbook(&[
            ("xl/workbook.xml", workbook_xml),
            ("xl/_rels/workbook.xml.rels", rels),
            ("xl/sharedStrings.xml", shared),
            ("xl/worksheets/data.xml", sheet),
        ]);

        let (names, column) = read_name_column(&bytes).unwrap();
        assert_eq!(column, "Name");
        assert_eq!(names, vec!["Ann"]);
    }

    #[test]
    fn test_cdata_comments_and_phonetic_runs() {
        let shared = r#"<sst><!-- header --><si><t><![CDATA[Name]]></t></si><si><r><t>Ken</t></r><rPh sb="0" eb="1"><t>ケン</t></rPh></si></sst>"#;
        let sheet = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c></row>
            <!-- <row r="2"><c r="A2" t="inlineStr"><is><t>Ghost</t></is></c></row> -->
            <row r="3"><c r="A3" t="s"><v>1</v></c></row>
            <row r="4"><c r="A4" t="inlineStr"><is><t><![CDATA[Lee & Co]]></t></is></c></row>
        </sheetData></worksheet>"#;
        let bytes = workbook(&[("xl/sharedStrings.xml", shared), (FALLBACK_SHEET, sheet)]);

        let (names, column) = read_name_column(&bytes).unwrap();
        assert_eq!(column, "Name");
        assert_eq!(names, vec!["Ken", "Lee & Co"]);
    }

    #[test]
    fn test_sparse_reference_far_from_header() {
        let bytes = single_sheet(
            r#"<row r="1"><c r="B1" t="inlineStr"><is><t>Name</t></is></c><c r="XFD1"><v>9</v></c></row>
            <row r="2"><c r="B2" t="inlineStr"><is><t>Ann</t></is></c></row>"#,
        );
        let (names, _) = read_name_column(&bytes).unwrap();
        assert_eq!(names, vec!["Ann"]);
    }

    #[test]
    fn test_reference_beyond_last_column_is_rejected() {
        for reference in ["ZZZZZZZZZZZZZ1", "ZZZZZZ1", "XFE1"] {
            let bytes = single_sheet(&format!(
                r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Name</t></is></c><c r="{}" t="inlineStr"><is><t>x</t></is></c></row>"#,
                reference
            ));
            assert!(
                matches!(read_name_column(&bytes), Err(SourceError::Xlsx(_))),
                "{}",
                reference
            );
        }
    }

    #[test]
    fn test_malformed_xml() {
        let bytes = single_sheet(r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Name</x></is></c></row>"#);
        assert!(matches!(read_name_column(&bytes), Err(SourceError::Xlsx(_))));
    }

    #[test]
    fn test_missing_column() {
        let bytes = single_sheet(r#"<row r="1"><c r="A1" t="inlineStr"><is><t>Age</t></is></c></row>"#);
        assert!(matches!(read_name_column(&bytes), Err(SourceError::MissingColumn)));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(read_name_column(b"Name\nAnn"), Err(SourceError::Xlsx(_))));
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1").unwrap(), Some(0));
        assert_eq!(column_index("C12").unwrap(), Some(2));
        assert_eq!(column_index("AA3").unwrap(), Some(26));
        assert_eq!(column_index("XFD9").unwrap(), Some(16_383));
        assert_eq!(column_index("12").unwrap(), None);
        assert!(column_index("XFE1").is_err());
    }
}
