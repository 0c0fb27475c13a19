//! Catalogue configuration module.
//!
//! Handles loading and validating `catalog.toml`. All options have stock
//! defaults, so the file is optional; when present it only needs to list the
//! values being overridden. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! compiled_dir = "for-web"              # Crawl root; listing pages land here
//! ledger_path = "data/assets.tsv"       # Tab-separated ledger file
//! reserved_dir = "_listing-page-assets" # Excluded from the crawl entirely
//! skip_extensions = ["js", "css", "html"] # Listed in folders, kept out of the ledger
//! page_title = "Documentation Diagram Library"
//! date_lookup_timeout_secs = 10         # Bound on each git created-date lookup
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Catalogue configuration loaded from `catalog.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// Compiled asset directory: the crawl root. Listing pages are written
    /// here, which is why preview paths strip this prefix.
    pub compiled_dir: String,
    /// Path to the tab-separated ledger file.
    pub ledger_path: String,
    /// Directory name reserved for page assets; never crawled or listed.
    pub reserved_dir: String,
    /// Extensions (lowercase) excluded from ledger metadata. Files with
    /// these extensions still register their folder in the crawl listing.
    pub skip_extensions: Vec<String>,
    /// Heading used on every generated page.
    pub page_title: String,
    /// Upper bound, in seconds, on each external created-date lookup.
    pub date_lookup_timeout_secs: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            compiled_dir: "for-web".to_string(),
            ledger_path: "data/assets.tsv".to_string(),
            reserved_dir: "_listing-page-assets".to_string(),
            skip_extensions: vec!["js".to_string(), "css".to_string(), "html".to_string()],
            page_title: "Documentation Diagram Library".to_string(),
            date_lookup_timeout_secs: 10,
        }
    }
}

impl CatalogConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiled_dir.is_empty() {
            return Err(ConfigError::Validation("compiled_dir must not be empty".into()));
        }
        if self.ledger_path.is_empty() {
            return Err(ConfigError::Validation("ledger_path must not be empty".into()));
        }
        if self.reserved_dir.is_empty() {
            return Err(ConfigError::Validation("reserved_dir must not be empty".into()));
        }
        if self.date_lookup_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "date_lookup_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Extensions to skip, lowercased once so the crawl compares cheaply.
    pub fn skip_extensions_lower(&self) -> Vec<String> {
        self.skip_extensions.iter().map(|e| e.to_lowercase()).collect()
    }
}

/// Load configuration from `path`, falling back to stock defaults when the
/// file does not exist. A present-but-invalid file is an error.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        CatalogConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// A documented stock `catalog.toml`, printed by the `gen-config` command.
pub fn stock_config_toml() -> String {
    let defaults = CatalogConfig::default();
    format!(
        r#"# diagram-ledger configuration
# All options are optional - the values below are the stock defaults.

# Compiled asset directory. The crawl starts here and the generated
# listing pages are written into it.
compiled_dir = "{compiled}"

# Tab-separated ledger file. Must exist with a header row before the
# first run; curator-edited cells in it always survive rebuilds.
ledger_path = "{ledger}"

# Directory name holding page stylesheets/scripts. Never crawled.
reserved_dir = "{reserved}"

# Files with these extensions are listed per-folder but never enter the
# ledger or the tables.
skip_extensions = [{skips}]

# Heading shown on every generated page.
page_title = "{title}"

# Each per-file git created-date lookup is killed after this many seconds.
date_lookup_timeout_secs = {timeout}
"#,
        compiled = defaults.compiled_dir,
        ledger = defaults.ledger_path,
        reserved = defaults.reserved_dir,
        skips = defaults
            .skip_extensions
            .iter()
            .map(|e| format!("\"{e}\""))
            .collect::<Vec<_>>()
            .join(", "),
        title = defaults.page_title,
        timeout = defaults.date_lookup_timeout_secs,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_when_file_absent() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("catalog.toml")).unwrap();
        assert_eq!(config.compiled_dir, "for-web");
        assert_eq!(config.skip_extensions, vec!["js", "css", "html"]);
    }

    #[test]
    fn partial_override() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, "page_title = \"Diagrams\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.page_title, "Diagrams");
        assert_eq!(config.ledger_path, "data/assets.tsv");
    }

    #[test]
    fn unknown_key_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, "page_titel = \"typo\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn zero_timeout_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("catalog.toml");
        fs::write(&path, "date_lookup_timeout_secs = 0\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn stock_config_round_trips() {
        let config: CatalogConfig = toml::from_str(&stock_config_toml()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.reserved_dir, "_listing-page-assets");
    }

    #[test]
    fn skip_extensions_lowercased() {
        let config = CatalogConfig {
            skip_extensions: vec!["JS".into(), "Css".into()],
            ..CatalogConfig::default()
        };
        assert_eq!(config.skip_extensions_lower(), vec!["js", "css"]);
    }
}
