//! Configuration for polyglot.
//!
//! Loads config from:
//! 1. Global: ~/.config/polyglot/config.toml
//! 2. Per-project: .polyglot/config.toml (overrides global)
//!
//! Example config.toml:
//! ```toml
//! [output]
//! metadata = "sidecar"   # "inline" (default) or "sidecar"
//! overwrite = false      # refuse to replace an existing output file
//!
//! [input]
//! metadata_file = ".meta.json"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Suffix appended to a source or output path to name its sidecar file.
pub const DEFAULT_METADATA_SUFFIX: &str = ".meta.json";

/// Where type metadata goes when the target cannot spell it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataOutput {
    /// `__META__` comments in the generated code.
    #[default]
    Inline,
    /// A JSON record list next to the output file.
    Sidecar,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub metadata: Option<MetadataOutput>,
    /// Replace an existing output file. Default: true
    pub overwrite: Option<bool>,
}

impl OutputConfig {
    pub fn metadata(&self) -> MetadataOutput {
        self.metadata.unwrap_or_default()
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite.unwrap_or(true)
    }
}

/// `[input]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Sidecar suffix looked up next to the input file.
    pub metadata_file: Option<String>,
}

impl InputConfig {
    pub fn metadata_file(&self) -> &str {
        self.metadata_file
            .as_deref()
            .unwrap_or(DEFAULT_METADATA_SUFFIX)
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PolyglotConfig {
    pub output: OutputConfig,
    pub input: InputConfig,
}

impl PolyglotConfig {
    /// Load configuration for a project.
    ///
    /// Loads global config from ~/.config/polyglot/config.toml,
    /// then merges with per-project config from .polyglot/config.toml.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global) = Self::global_config_path().and_then(|p| Self::load_file(&p)) {
            config = config.merge(global);
        }

        let project_path = root.join(".polyglot").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("polyglot").join("config.toml"))
    }

    /// Load config from a file path. A missing or invalid file is skipped.
    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!("ignoring {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one. Keys set in `other` win.
    fn merge(self, other: Self) -> Self {
        Self {
            output: OutputConfig {
                metadata: other.output.metadata.or(self.output.metadata),
                overwrite: other.output.overwrite.or(self.output.overwrite),
            },
            input: InputConfig {
                metadata_file: other.input.metadata_file.or(self.input.metadata_file),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_project_config(dir: &Path, body: &str) {
        let config_dir = dir.join(".polyglot");
        std::fs::create_dir_all(&config_dir).unwrap();
        let mut file = std::fs::File::create(config_dir.join("config.toml")).unwrap();
        writeln!(file, "{body}").unwrap();
    }

    #[test]
    fn test_default_config() {
        let config = PolyglotConfig::default();
        assert_eq!(config.output.metadata(), MetadataOutput::Inline);
        assert!(config.output.overwrite());
        assert_eq!(config.input.metadata_file(), ".meta.json");
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_project_config(
            dir.path(),
            r#"
[output]
metadata = "sidecar"
"#,
        );

        let config = PolyglotConfig::load(dir.path());
        assert_eq!(config.output.metadata(), MetadataOutput::Sidecar);
        assert!(config.output.overwrite()); // default
    }

    #[test]
    fn test_invalid_config_is_ignored() {
        let dir = TempDir::new().unwrap();
        write_project_config(dir.path(), "[output]\nmetadata = \"sometimes\"");

        let config = PolyglotConfig::load(dir.path());
        assert_eq!(config.output.metadata(), MetadataOutput::Inline);
    }

    #[test]
    fn test_merge_keeps_unset_keys() {
        let global: PolyglotConfig = toml::from_str(
            r#"
[output]
overwrite = false
[input]
metadata_file = ".types.json"
"#,
        )
        .unwrap();
        let project: PolyglotConfig = toml::from_str("[output]\nmetadata = \"sidecar\"").unwrap();

        let merged = PolyglotConfig::default().merge(global).merge(project);
        assert_eq!(merged.output.metadata(), MetadataOutput::Sidecar);
        assert!(!merged.output.overwrite());
        assert_eq!(merged.input.metadata_file(), ".types.json");
    }
}
