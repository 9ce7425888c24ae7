//! Portal configuration
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//!
//! ```toml
//! debounce_ms = 500
//!
//! [stages]
//! "1742632656" = "collecting"
//!
//! [[vocabulary.categories]]
//! key = "w_2s"
//! label = "W-2s"
//! section = "personal"
//! ```

use portal_checklist::{StageMap, Vocabulary};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default auto-save debounce delay
pub const DEFAULT_DEBOUNCE_MS: u64 = 800;

/// Environment variable overriding [`PortalConfig::debounce_ms`]
pub const DEBOUNCE_ENV: &str = "PORTAL_DEBOUNCE_MS";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// File is not valid TOML for this schema
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Config path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },
}

/// Portal settings injected into the editor, auto-saver and CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Quiet period after the last edit before auto-saving
    pub debounce_ms: u64,
    /// Known categories
    pub vocabulary: Vocabulary,
    /// CRM pipeline stage mapping
    pub stages: StageMap,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            vocabulary: Vocabulary::standard(),
            stages: StageMap::standard(),
        }
    }
}

impl PortalConfig {
    /// Load from a TOML file and apply environment overrides
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - `ConfigError::Parse` if it is not valid configuration
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse TOML text without touching the environment
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply `PORTAL_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = lookup(DEBOUNCE_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.debounce_ms = ms,
                Err(err) => {
                    tracing::warn!("invalid {DEBOUNCE_ENV} {raw:?}, ignoring: {err}");
                }
            }
        }
    }

    /// Builder: set debounce delay
    #[inline]
    #[must_use]
    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.debounce_ms = ms;
        self
    }

    /// Debounce delay as a duration
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_checklist::TaxStage;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn empty_file_gives_defaults() {
        let config = PortalConfig::from_toml_str("").unwrap();
        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.debounce(), Duration::from_millis(800));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
debounce_ms = 250

[stages]
"42" = "submitted"

[[vocabulary.categories]]
key = "crypto"
label = "Crypto Statements"
section = "personal"
"#
        )
        .unwrap();

        let config = PortalConfig::load(file.path()).unwrap();
        assert_eq!(config.stages.normalize("42"), TaxStage::Submitted);
        assert_eq!(config.stages.len(), 1);
        assert_eq!(config.vocabulary.label_for("crypto"), Some("Crypto Statements"));
        assert!(!config.vocabulary.contains("w_2s"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = PortalConfig::load(&dir.path().join("portal.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "debounce_ms = \"soon\"").unwrap();
        let err = PortalConfig::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn env_override_applies() {
        let mut config = PortalConfig::default();
        config.apply_overrides_from(|name| (name == DEBOUNCE_ENV).then(|| " 1200 ".to_string()));
        assert_eq!(config.debounce_ms, 1200);
    }

    #[test]
    fn invalid_env_override_is_ignored() {
        let mut config = PortalConfig::default().with_debounce_ms(300);
        config.apply_overrides_from(|_| Some("fast".to_string()));
        assert_eq!(config.debounce_ms, 300);
    }
}
