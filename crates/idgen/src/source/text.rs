//! Plain-text and CSV splitting.

use idgen_protocol::defaults::NAME_COLUMN_PRIORITY;

use super::{lines, Result};

/// Commas and newlines both separate names in a text file.
pub(super) fn split_txt(content: &str) -> Vec<String> {
    if content.contains(',') {
        content.split(',').flat_map(lines).collect()
    } else {
        lines(content).collect()
    }
}

/// Guess the CSV layout from separator counts.
///
/// More commas than newlines means a real table with a header row; the
/// name column is picked by header priority, else the first column. Files
/// dominated by newlines hold one name per line. Comma-only content is a
/// single comma-separated row without a header.
pub(super) fn split_csv(content: &str) -> Result<(Vec<String>, Option<String>)> {
    let commas = content.matches(',').count();
    let newlines = content.matches('\n').count();

    if commas > 0 && newlines > 0 {
        if commas > newlines {
            return read_table(content).map(|(names, column)| (names, Some(column)));
        }
        return Ok((lines(content).collect(), None));
    }
    if commas > 0 {
        let names = content
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        return Ok((names, None));
    }
    Ok((lines(content).collect(), None))
}

fn read_table(content: &str) -> Result<(Vec<String>, String)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let header_names: Vec<&str> = headers.iter().collect();
    let index = pick_column(header_names.iter().copied()).unwrap_or(0);
    let column = headers.get(index).unwrap_or_default().to_string();

    let mut names = Vec::new();
    for row in reader.records() {
        let row = row?;
        if let Some(value) = row.get(index) {
            if !value.is_empty() {
                names.push(value.to_string());
            }
        }
    }
    Ok((names, column))
}

/// Index of the highest-priority name header, compared case-insensitively.
pub(super) fn pick_column<'a>(headers: impl Iterator<Item = &'a str> + Clone) -> Option<usize> {
    NAME_COLUMN_PRIORITY.iter().find_map(|wanted| {
        headers
            .clone()
            .position(|h| h.trim().eq_ignore_ascii_case(wanted))
    })
}
