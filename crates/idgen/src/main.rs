//! idgen command-line entry point
//!
//! Reads a list of names from CSV, TXT or XLSX, reports on its quality and
//! writes a Name/ID mapping with deterministic or random identifiers.

use clap::{Parser, Subcommand};
use idgen_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

mod cli;

#[derive(Parser, Debug)]
#[command(
    name = "idgen",
    version,
    about = "Turn lists of names into stable pseudonymous identifiers"
)]
struct Cli {
    /// Enable verbose logging (debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (defaults to ~/.idgen/config.toml when present)
    #[arg(long, global = true, env = "IDGEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the raw entries a file yields
    Extract {
        /// Name file (.csv, .txt or .xlsx)
        file: PathBuf,

        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report valid, rejected and duplicate names
    Analyze {
        /// Name file (.csv, .txt or .xlsx)
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Assign identifiers and export the mapping
    Generate(cli::generate::GenerateArgs),

    /// Show resolved configuration and paths
    Config(cli::config::ConfigArgs),
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Extract { json, .. } => *json,
        Commands::Analyze { json, .. } => *json,
        Commands::Generate(args) => args.json,
        Commands::Config(args) => args.json,
    }
}

fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = cli::load_config(cli.config.as_deref())?;
    debug!(
        hash_algorithm = %config.hash_algorithm,
        max_names = config.max_names_count,
        "Configuration resolved"
    );

    match cli.command {
        Commands::Extract { file, limit, json } => {
            cli::extract::run(cli::extract::ExtractArgs { file, limit, json }, &config)
        }
        Commands::Analyze { file, json } => {
            cli::analyze::run(cli::analyze::AnalyzeArgs { file, json }, &config)
        }
        Commands::Generate(args) => cli::generate::run(args, &config),
        Commands::Config(args) => cli::config::run(args, &config, cli.config.as_deref()),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    if let Err(err) = init_logging(LogConfig {
        app_name: "idgen",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: logging unavailable: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::error::print_json_error(&err);
            } else {
                eprintln!("{:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
