use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{DocsealError, DocsealResult};

/// Top-level configuration (loaded from docseal.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsealConfig {
    pub kdf: KdfConfig,
    pub upload: UploadConfig,
}

/// Session key derivation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB)
    pub argon2_mem_cost_kib: u32,
    /// Argon2id time cost (iterations, default: 3)
    pub argon2_time_cost: u32,
    /// Argon2id parallelism (default: 4)
    pub argon2_parallelism: u32,
    /// Base64 16-byte salt. When unset, every session gets a fresh random
    /// salt that is forgotten at logout.
    pub salt: Option<String>,
}

/// Upload validation policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Maximum plaintext file size in MiB (default: 10)
    pub max_size_mb: u64,
    /// Accepted types: `"image/*"`, `"application/pdf"` or `".pdf"`
    pub accepted_types: Vec<String>,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            argon2_mem_cost_kib: 65536,
            argon2_time_cost: 3,
            argon2_parallelism: 4,
            salt: None,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_size_mb: 10,
            accepted_types: vec!["image/*".into(), ".pdf".into()],
        }
    }
}

impl UploadConfig {
    /// Size limit in bytes.
    pub fn max_size_bytes(&self) -> u64 {
        self.max_size_mb.saturating_mul(1024 * 1024)
    }
}

impl DocsealConfig {
    /// Load configuration from a TOML file, falling back to defaults when
    /// the file does not exist.
    pub fn load(path: &Path) -> DocsealResult<Self> {
        if !path.exists() {
            tracing::warn!(
                "config file not found: {}  (using defaults)",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> DocsealResult<Self> {
        toml::from_str(content).map_err(|e| DocsealError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
[kdf]
argon2_mem_cost_kib = 131072
argon2_time_cost = 4
argon2_parallelism = 2
salt = "AAECAwQFBgcICQoLDA0ODw=="

[upload]
max_size_mb = 25
accepted_types = ["image/png", ".pdf", "application/*"]
"#;

        let config = DocsealConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.kdf.argon2_mem_cost_kib, 131072);
        assert_eq!(config.kdf.argon2_time_cost, 4);
        assert_eq!(config.kdf.argon2_parallelism, 2);
        assert_eq!(config.kdf.salt.as_deref(), Some("AAECAwQFBgcICQoLDA0ODw=="));
        assert_eq!(config.upload.max_size_mb, 25);
        assert_eq!(config.upload.accepted_types.len(), 3);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DocsealConfig::from_toml_str("").unwrap();
        assert_eq!(config.kdf.argon2_mem_cost_kib, 65536);
        assert_eq!(config.kdf.argon2_time_cost, 3);
        assert_eq!(config.kdf.argon2_parallelism, 4);
        assert!(config.kdf.salt.is_none());
        assert_eq!(config.upload.max_size_mb, 10);
        assert_eq!(config.upload.accepted_types, vec!["image/*", ".pdf"]);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = DocsealConfig::from_toml_str("[upload]\nmax_size_mb = 2\n").unwrap();
        assert_eq!(config.upload.max_size_mb, 2);
        assert_eq!(config.upload.accepted_types, vec!["image/*", ".pdf"]);
        assert_eq!(config.kdf.argon2_time_cost, 3);
    }

    #[test]
    fn test_max_size_bytes() {
        let upload = UploadConfig::default();
        assert_eq!(upload.max_size_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = DocsealConfig::from_toml_str("[upload\nmax_size_mb = 2");
        assert!(matches!(result, Err(DocsealError::Config(_))));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = DocsealConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert_eq!(config.upload.max_size_mb, 10);
    }

    #[test]
    fn test_load_from_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("docseal.toml");
        std::fs::write(&path, "[kdf]\nargon2_time_cost = 5\n").unwrap();

        let config = DocsealConfig::load(&path).unwrap();
        assert_eq!(config.kdf.argon2_time_cost, 5);
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("broken.toml");
        std::fs::write(&path, "kdf = 3 = 4").unwrap();

        let err = DocsealConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
