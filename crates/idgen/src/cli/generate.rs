//! Generate command - extract, curate, assign identifiers and export

use crate::cli::output::{format_size, print_json, print_summary, print_table};
use crate::cli::{read_names, HelpfulError};
use anyhow::Context;
use idgen::names::{analyze, resolve_all, DuplicateChoice};
use idgen::pipeline::{generate_bounded, Generation};
use idgen_ids::{hash_statistics, HashStatistics, IdStrategy, StrategyKind};
use idgen_protocol::{ExportFormat, IdGenConfig};
use idgen_sinks::{preview, write_export, ExportArtifact, ExportOptions};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

const PREVIEW_ROWS: usize = 10;

#[derive(Debug, clap::Args)]
pub struct GenerateArgs {
    /// Name file (.csv, .txt or .xlsx)
    pub file: PathBuf,

    /// Output file; defaults to subject_id_mapping.<format> in the current directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Identifier strategy: hash, sequential or uuid (unknown values fall back to hash)
    #[arg(short, long, default_value = "hash")]
    pub strategy: String,

    /// Digest for the hash strategy: md5, sha1, sha256 or blake3
    #[arg(short, long, env = "IDGEN_HASH_ALGORITHM")]
    pub algorithm: Option<String>,

    /// Salt prefixed to every hash input (enables salting)
    #[arg(long, env = "IDGEN_SALT", hide_env_values = true)]
    pub salt: Option<String>,

    /// Export format; inferred from --output when omitted
    #[arg(short, long)]
    pub format: Option<ExportFormat>,

    /// What to do with repeated names: keep-all, keep-one or remove-all
    #[arg(long, default_value = "keep-all")]
    pub duplicates: DuplicateChoice,

    /// CSV field delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateReport {
    pub file: PathBuf,
    pub extraction_message: String,
    pub rejected_entries: usize,
    pub duplicate_handling: DuplicateChoice,
    pub generation: Generation,
    pub hash_statistics: Option<HashStatistics>,
    pub export: ExportArtifact,
}

pub fn run(args: GenerateArgs, config: &IdGenConfig) -> anyhow::Result<()> {
    let config = effective_config(&args, config)?;

    let extraction = read_names(&args.file, &config)?;
    let analysis = analyze(&extraction.names);
    if analysis.total() == 0 {
        return Err(HelpfulError::no_valid_names(&args.file, analysis.invalid_count()).into());
    }

    let curated = resolve_all(&analysis, args.duplicates);
    let strategy = IdStrategy::from_config(StrategyKind::parse_lenient(&args.strategy), &config);
    let generation = generate_bounded(curated.names(), &strategy, config.max_names_count)
        .with_context(|| format!("Failed to generate identifiers for {}", args.file.display()))?;

    let hash_statistics = match &strategy {
        IdStrategy::ContentHash(settings) => {
            let ids: Vec<&str> = generation.records.iter().map(|r| r.id.as_str()).collect();
            hash_statistics(&ids, settings)
        }
        _ => None,
    };

    let (output, format) = resolve_output(args.output.as_deref(), args.format);
    let export = write_export(
        &generation.records,
        &output,
        format,
        &ExportOptions::from_config(&config),
    )
    .with_context(|| format!("Failed to write {}", output.display()))?;
    info!(
        run_id = %generation.run_id,
        path = %export.path.display(),
        records = export.records,
        "Export written"
    );

    let report = GenerateReport {
        file: args.file.clone(),
        extraction_message: extraction.message,
        rejected_entries: analysis.invalid_count(),
        duplicate_handling: args.duplicates,
        generation,
        hash_statistics,
        export,
    };

    if args.json {
        return print_json(&report);
    }
    output_text(&report);
    Ok(())
}

/// Config file values with command-line overrides applied.
fn effective_config(args: &GenerateArgs, base: &IdGenConfig) -> anyhow::Result<IdGenConfig> {
    let mut config = base.clone();
    if let Some(algorithm) = &args.algorithm {
        config.hash_algorithm = algorithm.clone();
    }
    if let Some(salt) = &args.salt {
        config.salt_enabled = !salt.is_empty();
        config.default_salt = salt.clone();
    }
    if let Some(delimiter) = args.delimiter {
        config.csv_delimiter = delimiter;
    }
    config
        .validate()
        .map_err(|e| HelpfulError::invalid_config(None, &e.to_string()))?;
    Ok(config)
}

/// Output path and format. An explicit format wins; otherwise the output
/// extension decides, falling back to CSV.
fn resolve_output(output: Option<&Path>, format: Option<ExportFormat>) -> (PathBuf, ExportFormat) {
    let format = format
        .or_else(|| output.and_then(ExportFormat::from_path))
        .unwrap_or(ExportFormat::Csv);
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(format.default_filename()),
    };
    (path, format)
}

fn output_text(report: &GenerateReport) {
    let generation = &report.generation;
    println!("{}", report.extraction_message);
    println!();

    let mut summary = vec![
        ("Run", generation.run_id.to_string()),
        ("Strategy", generation.strategy.to_string()),
        ("Duplicates", report.duplicate_handling.to_string()),
        ("Records", generation.records.len().to_string()),
        ("Distinct IDs", generation.uniqueness.distinct_ids.to_string()),
        ("Rejected entries", report.rejected_entries.to_string()),
    ];
    if generation.stats.suffix_resolved > 0 || generation.stats.random_fallbacks > 0 {
        summary.push((
            "Collisions",
            format!(
                "{} resolved by suffix, {} random fallback",
                generation.stats.suffix_resolved, generation.stats.random_fallbacks
            ),
        ));
    }
    if let Some(hashes) = &report.hash_statistics {
        summary.push((
            "Hash",
            format!(
                "{} ({} hex chars{})",
                hashes.algorithm,
                hashes.max_length,
                if hashes.salt_enabled { ", salted" } else { "" }
            ),
        ));
    }
    summary.push((
        "Output",
        format!(
            "{} ({}, {})",
            report.export.path.display(),
            report.export.format,
            format_size(report.export.bytes as u64)
        ),
    ));
    print_summary(&summary);

    println!();
    let rows = preview(&generation.records, PREVIEW_ROWS)
        .into_iter()
        .map(|r| vec![r.name, r.id])
        .collect();
    print_table(&["Name", "ID"], rows);
    if generation.records.len() > PREVIEW_ROWS {
        println!("... and {} more", generation.records.len() - PREVIEW_ROWS);
    }

    if !generation.uniqueness.is_unique {
        println!();
        println!(
            "WARNING: {} identifiers are shared by different names",
            generation.uniqueness.conflicts.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output() {
        assert_eq!(
            resolve_output(None, None),
            (PathBuf::from("subject_id_mapping.csv"), ExportFormat::Csv)
        );
        assert_eq!(
            resolve_output(None, Some(ExportFormat::Xlsx)),
            (PathBuf::from("subject_id_mapping.xlsx"), ExportFormat::Xlsx)
        );
        assert_eq!(
            resolve_output(Some(Path::new("out/map.xlsx")), None),
            (PathBuf::from("out/map.xlsx"), ExportFormat::Xlsx)
        );
        assert_eq!(
            resolve_output(Some(Path::new("map.dat")), Some(ExportFormat::Csv)).1,
            ExportFormat::Csv
        );
    }
}
