use anyhow::Context;
use idgen_protocol::defaults::{ID_COLUMN, NAME_COLUMN};
use idgen_protocol::IdentifierRecord;

use crate::{SinkError, SinkResult};

/// Render records as delimited text with a `Name,ID` header.
pub(crate) fn render_csv(records: &[IdentifierRecord], delimiter: char) -> SinkResult<Vec<u8>> {
    if !delimiter.is_ascii() {
        return Err(SinkError::message(format!(
            "CSV delimiter must be ASCII, got {:?}",
            delimiter
        )));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());

    writer
        .write_record([NAME_COLUMN, ID_COLUMN])
        .context("Failed to write CSV header")?;
    for record in records {
        writer
            .write_record([record.name.as_str(), record.id.as_str()])
            .with_context(|| format!("Failed to write CSV row for {}", record.name))?;
    }

    writer
        .into_inner()
        .map_err(|e| SinkError::message(format!("Failed to flush CSV writer: {}", e.error())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_and_rows() {
        let records = vec![
            IdentifierRecord::new("Ann", "ID001"),
            IdentifierRecord::new("O'Neil, Jr", "ID002"),
        ];
        let bytes = render_csv(&records, ',').unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "Name,ID\nAnn,ID001\n\"O'Neil, Jr\",ID002\n");
    }

    #[test]
    fn test_custom_delimiter() {
        let records = vec![IdentifierRecord::new("Ann", "ID001")];
        let text = String::from_utf8(render_csv(&records, ';').unwrap()).unwrap();
        assert_eq!(text, "Name;ID\nAnn;ID001\n");
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        assert!(render_csv(&[], '§').is_err());
    }
}
