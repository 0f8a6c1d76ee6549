//! Analyze command - validity, duplicates and statistics for a name file

use crate::cli::output::{print_json, print_summary, print_table};
use crate::cli::read_names;
use idgen::names::{
    analyze, suggest_corrections, DuplicateSummary, InvalidEntry, NameGroup, NameStatistics,
};
use idgen_protocol::IdGenConfig;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug)]
pub struct AnalyzeArgs {
    pub file: PathBuf,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeReport {
    pub file: PathBuf,
    pub message: String,
    pub total_names: usize,
    pub unique_names: usize,
    pub invalid_entries: usize,
    pub duplicates: DuplicateSummary,
    pub groups: Vec<NameGroup>,
    pub invalid: Vec<InvalidEntry>,
    pub statistics: Option<NameStatistics>,
    pub suggestions: BTreeMap<String, Vec<String>>,
}

pub fn run(args: AnalyzeArgs, config: &IdGenConfig) -> anyhow::Result<()> {
    let extraction = read_names(&args.file, config)?;
    let analysis = analyze(&extraction.names);

    let report = AnalyzeReport {
        file: args.file.clone(),
        message: extraction.message,
        total_names: analysis.total(),
        unique_names: analysis.unique_count(),
        invalid_entries: analysis.invalid_count(),
        duplicates: analysis.duplicate_summary(),
        statistics: NameStatistics::compute(&analysis.valid_names),
        suggestions: suggest_corrections(&analysis.valid_names),
        groups: analysis.groups,
        invalid: analysis.invalid,
    };

    if args.json {
        return print_json(&report);
    }
    output_text(&report);
    Ok(())
}

fn output_text(report: &AnalyzeReport) {
    println!("{}", report.message);
    println!();
    print_summary(&[
        ("Valid names", report.total_names.to_string()),
        ("Appearing once", report.unique_names.to_string()),
        ("Duplicate groups", report.duplicates.duplicate_group_count.to_string()),
        ("Entries in duplicate groups", report.duplicates.total_duplicate_entries.to_string()),
        ("Rejected entries", report.invalid_entries.to_string()),
    ]);

    if !report.groups.is_empty() {
        println!();
        println!("Duplicate groups:");
        let rows = report
            .groups
            .iter()
            .map(|g| {
                let positions: Vec<String> =
                    g.positions.iter().map(|p| (p + 1).to_string()).collect();
                vec![g.name.to_string(), g.count.to_string(), positions.join(", ")]
            })
            .collect();
        print_table(&["Name", "Count", "Rows"], rows);
    }

    if !report.invalid.is_empty() {
        println!();
        println!("Rejected entries:");
        let rows = report
            .invalid
            .iter()
            .map(|e| vec![e.raw.clone(), e.reason.to_string()])
            .collect();
        print_table(&["Entry", "Reason"], rows);
    }

    if let Some(stats) = &report.statistics {
        println!();
        print_summary(&[
            ("Average length", format!("{:.1}", stats.average_length)),
            ("Shortest", format!("{} ({})", stats.shortest_name, stats.min_length)),
            ("Longest", format!("{} ({})", stats.longest_name, stats.max_length)),
            ("Single-word names", stats.single_word_names.to_string()),
            ("Multi-word names", stats.multi_word_names.to_string()),
        ]);
    }

    if !report.suggestions.is_empty() {
        println!();
        println!("Possible full names (not applied):");
        let rows = report
            .suggestions
            .iter()
            .map(|(name, options)| vec![name.clone(), options.join(" / ")])
            .collect();
        print_table(&["Name", "Suggestions"], rows);
    }
}
