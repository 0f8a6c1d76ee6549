//! Canonical default values shared by the library crates and the CLI.

pub const DEFAULT_HASH_ALGORITHM: &str = "md5";
pub const DEFAULT_SALT_ENABLED: bool = false;
pub const DEFAULT_SALT: &str = "";
pub const DEFAULT_MAX_NAMES_COUNT: usize = 10_000;
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 50;
pub const DEFAULT_CSV_DELIMITER: char = ',';

pub const DEFAULT_SEQUENTIAL_PREFIX: &str = "ID";
pub const DEFAULT_SEQUENTIAL_WIDTH: usize = 3;

/// Upper bound on name-suffix rehash attempts before falling back to a random token.
pub const MAX_COLLISION_ATTEMPTS: u32 = 1000;

pub const NAME_COLUMN: &str = "Name";
pub const ID_COLUMN: &str = "ID";
pub const XLSX_SHEET_NAME: &str = "Subject Mapping";
pub const EXPORT_BASENAME: &str = "subject_id_mapping";

/// Tabular sources pick the first column matching these headers, in order.
pub const NAME_COLUMN_PRIORITY: &[&str] = &["name", "subject", "trial"];
