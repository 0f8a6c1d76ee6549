//! Config command - resolved settings and paths

use anyhow::Context;
use idgen_protocol::{default_config_path, default_logs_dir, idgen_home, IdGenConfig};
use std::path::{Path, PathBuf};

/// Arguments for the config command
#[derive(Debug, clap::Args)]
pub struct ConfigArgs {
    /// Show resolved configuration in JSON format
    #[arg(long)]
    pub json: bool,

    /// Write the resolved configuration to the config file if none exists
    #[arg(long)]
    pub init: bool,
}

/// Run the config command - shows effective settings
pub fn run(args: ConfigArgs, config: &IdGenConfig, explicit: Option<&Path>) -> anyhow::Result<()> {
    let home = idgen_home();
    let config_path: PathBuf = explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);
    let logs = default_logs_dir();

    let created = if args.init && !config_path.exists() {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        config.save(&config_path)?;
        true
    } else {
        false
    };

    if args.json {
        let body = serde_json::json!({
            "home": home.to_string_lossy(),
            "config_file": {
                "path": config_path.to_string_lossy(),
                "exists": config_path.exists(),
                "created": created,
            },
            "logs": {
                "path": logs.to_string_lossy(),
                "exists": logs.exists(),
            },
            "settings": config,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
        return Ok(());
    }

    println!("IDGEN CONFIGURATION");
    println!("===================");
    println!();
    println!("Home:     {}", home.display());
    println!(
        "Config:   {} ({})",
        config_path.display(),
        match (created, config_path.exists()) {
            (true, _) => "created",
            (false, true) => "exists",
            (false, false) => "not found, using defaults",
        }
    );
    println!("Logs:     {}", logs.display());
    println!();
    println!("hash_algorithm     = {}", config.hash_algorithm);
    println!("salt_enabled       = {}", config.salt_enabled);
    println!(
        "default_salt       = {}",
        if config.default_salt.is_empty() { "(none)" } else { "(set)" }
    );
    println!("max_names_count    = {}", config.max_names_count);
    println!("max_file_size_mb   = {}", config.max_file_size_mb);
    println!("csv_delimiter      = {:?}", config.csv_delimiter);
    println!("sequential_prefix  = {}", config.sequential_prefix);
    println!("sequential_width   = {}", config.sequential_width);

    Ok(())
}
