//! Content-hash identifiers.
//!
//! The digest is a pure function of `salt + lowercase(trim(name))` so that
//! repeated or differently-cased occurrences of a name always map to the
//! same identifier.

use idgen_protocol::{HashAlgorithm, IdGenConfig};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use tracing::warn;

/// Algorithm and salt for one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HashSettings {
    pub algorithm: HashAlgorithm,
    /// Prefixed to every hash input when present and non-empty
    pub salt: Option<String>,
}

impl HashSettings {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            salt: None,
        }
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        let salt = salt.into();
        self.salt = if salt.is_empty() { None } else { Some(salt) };
        self
    }

    pub fn from_config(config: &IdGenConfig) -> Self {
        let settings = Self::new(resolve_algorithm(&config.hash_algorithm));
        match config.effective_salt() {
            Some(salt) => settings.with_salt(salt),
            None => settings,
        }
    }

    pub fn salt_enabled(&self) -> bool {
        self.salt.as_deref().is_some_and(|s| !s.is_empty())
    }
}

/// Parse an algorithm name, falling back to MD5 for anything unknown.
pub fn resolve_algorithm(name: &str) -> HashAlgorithm {
    name.parse().unwrap_or_else(|err| {
        warn!("{}; falling back to md5", err);
        HashAlgorithm::Md5
    })
}

/// Canonical form used as the owner key for a name: trimmed and lowercased.
pub fn canonical_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Exact bytes fed to the digest for `name`.
pub fn hash_input(name: &str, settings: &HashSettings) -> String {
    let canonical = canonical_key(name);
    match settings.salt.as_deref() {
        Some(salt) if !salt.is_empty() => format!("{}{}", salt, canonical),
        _ => canonical,
    }
}

/// Lowercase hex digest of raw bytes.
pub fn digest_hex(algorithm: HashAlgorithm, bytes: &[u8]) -> String {
    match algorithm {
        HashAlgorithm::Md5 => format!("{:x}", md5::compute(bytes)),
        HashAlgorithm::Sha1 => format!("{:x}", Sha1::digest(bytes)),
        HashAlgorithm::Sha256 => format!("{:x}", Sha256::digest(bytes)),
        HashAlgorithm::Blake3 => blake3::hash(bytes).to_hex().to_string(),
    }
}

/// Content hash for a single name.
pub fn content_hash(name: &str, settings: &HashSettings) -> String {
    digest_hex(settings.algorithm, hash_input(name, settings).as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_md5_digest() {
        let settings = HashSettings::default();
        assert_eq!(content_hash("Ann", &settings), "7e0d7f8a5d96c24ffcc840f31bce72b2");
        assert_eq!(content_hash("  JOHN DOE", &settings), "320b8e6bef45211f0f57b618925f4193");
        assert_eq!(digest_hex(HashAlgorithm::Md5, b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_known_digests_for_empty_input() {
        assert_eq!(
            digest_hex(HashAlgorithm::Sha1, b""),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            digest_hex(HashAlgorithm::Sha256, b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            digest_hex(HashAlgorithm::Blake3, b""),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_case_and_whitespace_insensitive() {
        let settings = HashSettings::new(HashAlgorithm::Sha256);
        assert_eq!(
            content_hash("  John Doe ", &settings),
            content_hash("john doe", &settings)
        );
        assert_ne!(content_hash("John Doe", &settings), content_hash("Jane Doe", &settings));
    }

    #[test]
    fn test_digest_lengths_match_algorithm() {
        for algorithm in HashAlgorithm::ALL {
            let id = content_hash("Ann", &HashSettings::new(algorithm));
            assert_eq!(id.len(), algorithm.hex_len(), "{}", algorithm);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_salt_changes_digest() {
        let plain = HashSettings::default();
        let salted = HashSettings::default().with_salt("pepper");
        assert_eq!(hash_input("Ann", &salted), "pepperann");
        assert_ne!(content_hash("Ann", &plain), content_hash("Ann", &salted));
        assert_eq!(
            content_hash("Ann", &salted),
            digest_hex(HashAlgorithm::Md5, b"pepperann")
        );
    }

    #[test]
    fn test_empty_salt_is_ignored() {
        let settings = HashSettings::default().with_salt("");
        assert!(!settings.salt_enabled());
        assert_eq!(hash_input("Ann", &settings), "ann");
    }

    #[test]
    fn test_settings_from_config() {
        let config = IdGenConfig {
            hash_algorithm: "SHA1".to_string(),
            salt_enabled: true,
            default_salt: "s".to_string(),
            ..IdGenConfig::default()
        };
        let settings = HashSettings::from_config(&config);
        assert_eq!(settings.algorithm, HashAlgorithm::Sha1);
        assert_eq!(settings.salt.as_deref(), Some("s"));
    }

    #[test]
    fn test_unknown_algorithm_falls_back_to_md5() {
        assert_eq!(resolve_algorithm("whirlpool"), HashAlgorithm::Md5);
        assert_eq!(resolve_algorithm("sha256"), HashAlgorithm::Sha256);
    }
}
