use std::path::{Path, PathBuf};
use std::sync::Once;

static CREATE_DIR_WARNED: Once = Once::new();

/// Resolve the idgen home directory.
///
/// Priority:
/// 1) IDGEN_HOME
/// 2) HOME/USERPROFILE
/// 3) ./.idgen
pub fn idgen_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("IDGEN_HOME") {
        return PathBuf::from(override_path);
    }
    if let Ok(home) = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE")) {
        return PathBuf::from(home).join(".idgen");
    }
    PathBuf::from(".").join(".idgen")
}

fn ensure_home_dir(home: &Path) {
    if let Err(err) = std::fs::create_dir_all(home) {
        CREATE_DIR_WARNED.call_once(|| {
            eprintln!(
                "Warning: failed to create idgen home directory {}: {}. Set IDGEN_HOME to a writable location.",
                home.display(),
                err
            );
        });
    }
}

/// Default config file: ~/.idgen/config.toml (not created)
pub fn default_config_path() -> PathBuf {
    idgen_home().join("config.toml")
}

/// Default logs directory: ~/.idgen/logs
pub fn default_logs_dir() -> PathBuf {
    let home = idgen_home();
    ensure_home_dir(&home);
    home.join("logs")
}
