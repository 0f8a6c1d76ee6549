//! Extract command - show the raw names a file yields

use crate::cli::output::{print_json, print_table};
use crate::cli::read_names;
use idgen_protocol::IdGenConfig;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ExtractArgs {
    pub file: PathBuf,
    /// Rows to show; everything when `None`
    pub limit: Option<usize>,
    pub json: bool,
}

pub fn run(args: ExtractArgs, config: &IdGenConfig) -> anyhow::Result<()> {
    let extraction = read_names(&args.file, config)?;

    if args.json {
        return print_json(&extraction);
    }

    println!("{}", extraction.message);
    if let Some(column) = &extraction.column {
        println!("Column: {}", column);
    }
    if extraction.names.is_empty() {
        return Ok(());
    }

    let shown = args.limit.unwrap_or(extraction.names.len());
    let rows: Vec<Vec<String>> = extraction
        .names
        .iter()
        .take(shown)
        .enumerate()
        .map(|(idx, name)| vec![(idx + 1).to_string(), name.clone()])
        .collect();
    println!();
    print_table(&["#", "Raw entry"], rows);

    if shown < extraction.names.len() {
        println!("... and {} more", extraction.names.len() - shown);
    }
    Ok(())
}
