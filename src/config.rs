//! Rule set configuration.
//!
//! Rules are loaded from a TOML file, or from a JSON settings file using the
//! `{"rules": [...]}` layout. Both carry the same records: a category `name`
//! and its list of `extensions`.
//!
//! # Configuration File Format
//!
//! ```toml
//! recursive = false
//! dry_run = false
//!
//! [[rules]]
//! name = "Images"
//! extensions = [".jpg", ".jpeg", ".png"]
//!
//! [[rules]]
//! name = "Documents"
//! extensions = [".pdf", ".txt"]
//! ```

use crate::rules::{Rule, RuleSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors that can occur while loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML or JSON syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration defines no rules.
    #[error("Configuration defines no rules")]
    NoRules,
    /// A rule has an empty name.
    #[error("Rule #{0} has an empty name")]
    EmptyRuleName(usize),
    /// A rule name cannot be used as a single folder name.
    #[error("Rule name '{0}' must be a single folder name")]
    InvalidRuleName(String),
    /// Two rules share a name.
    #[error("Rule name '{0}' is used more than once")]
    DuplicateRuleName(String),
    /// A rule lists an empty extension.
    #[error("Rule '{0}' contains an empty extension")]
    EmptyExtension(String),
    /// Serializing the rule set failed.
    #[error("Could not serialize configuration: {0}")]
    Serialize(String),
}

/// Output format for exporting rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

/// Rules plus default run options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Organize subdirectories by default.
    #[serde(default)]
    pub recursive: bool,
    /// Only simulate by default.
    #[serde(default)]
    pub dry_run: bool,
    /// Ordered extension rules.
    #[serde(default = "default_rules")]
    pub rules: RuleSet,
}

/// The built-in rule set used when no configuration file is found.
pub fn default_rules() -> RuleSet {
    RuleSet::new(vec![
        Rule::new("Images", [".jpg", ".jpeg", ".png", ".gif", ".bmp"]),
        Rule::new("Documents", [".pdf", ".doc", ".docx", ".txt", ".rtf"]),
        Rule::new("Videos", [".mp4", ".avi", ".mov", ".wmv"]),
        Rule::new("Audio", [".mp3", ".wav", ".flac", ".m4a"]),
    ])
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            dry_run: false,
            rules: default_rules(),
        }
    }
}

impl RulesConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.ruletidy.toml` in the current directory
    /// 3. Look for `~/.config/ruletidy/config.toml` in home directory
    /// 4. Fall back to the built-in rules
    ///
    /// # Errors
    ///
    /// Returns an error if a file is found but cannot be read, parsed or
    /// validated, or if `config_path` is given and does not exist.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".ruletidy.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("ruletidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        debug!("No configuration file found, using built-in rules");
        Ok(Self::default())
    }

    /// Load and validate configuration from a specific file.
    ///
    /// Files ending in `.json` are parsed as JSON, everything else as TOML.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        debug!(path = %path.display(), "Loading configuration");
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content, ConfigFormat::for_path(path))?;
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration text without validating it.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
            }
            ConfigFormat::Json => serde_json::from_str(content)
                .map_err(|e| ConfigError::ConfigInvalid(e.to_string())),
        }
    }

    /// Checks that the rules are usable as category folders.
    ///
    /// # Errors
    ///
    /// Rejects an empty rule set, empty or duplicate names, names that are
    /// not a single path component, and empty extensions.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }

        let mut seen = HashSet::new();
        for (index, rule) in self.rules.iter().enumerate() {
            let name = rule.name();
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyRuleName(index));
            }
            let mut components = Path::new(name).components();
            if !matches!(
                (components.next(), components.next()),
                (Some(Component::Normal(_)), None)
            ) {
                return Err(ConfigError::InvalidRuleName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateRuleName(name.to_string()));
            }
            if rule.extensions().any(|ext| ext == ".") {
                return Err(ConfigError::EmptyExtension(name.to_string()));
            }
        }
        Ok(())
    }

    /// Serializes the configuration in the requested format.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        match format {
            ConfigFormat::Toml => {
                toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
            }
            ConfigFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| ConfigError::Serialize(e.to_string())),
        }
    }
}

impl ConfigFormat {
    /// Picks the format from a file extension, defaulting to TOML.
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Toml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = RulesConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.rules.len(), 4);
        assert!(!config.recursive);
    }

    #[test]
    fn test_parse_toml_rules() {
        let content = r#"
            recursive = true

            [[rules]]
            name = "Images"
            extensions = [".JPG", "png"]

            [[rules]]
            name = "Docs"
            extensions = [".pdf"]
        "#;
        let config = RulesConfig::parse(content, ConfigFormat::Toml).unwrap();

        assert!(config.recursive);
        assert!(!config.dry_run);
        let names: Vec<_> = config.rules.iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Images", "Docs"]);
        assert!(config.rules.iter().next().unwrap().contains(".jpg"));
    }

    #[test]
    fn test_parse_json_settings() {
        let content = r#"{"rules": [{"name": "Music", "extensions": [".mp3", ".flac"]}]}"#;
        let config = RulesConfig::parse(content, ConfigFormat::Json).unwrap();

        assert_eq!(config.rules.len(), 1);
        assert_eq!(config.rules.iter().next().unwrap().name(), "Music");
    }

    #[test]
    fn test_missing_rules_key_uses_defaults() {
        let config = RulesConfig::parse("dry_run = true", ConfigFormat::Toml).unwrap();
        assert!(config.dry_run);
        assert_eq!(config.rules, default_rules());
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = RulesConfig::parse("[[rules]\nname = ", ConfigFormat::Toml);
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_validate_rejects_empty_rules() {
        let config = RulesConfig::parse("rules = []", ConfigFormat::Toml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::NoRules)));
    }

    #[test]
    fn test_validate_rejects_duplicate_names() {
        let config = RulesConfig {
            rules: RuleSet::new(vec![
                Rule::new("Images", [".jpg"]),
                Rule::new("Images", [".png"]),
            ]),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DuplicateRuleName(name)) if name == "Images"
        ));
    }

    #[test]
    fn test_validate_rejects_bad_names() {
        for bad in ["", "  ", "a/b", "..", "."] {
            let config = RulesConfig {
                rules: RuleSet::new(vec![Rule::new(bad, [".jpg"])]),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "'{}' should be rejected", bad);
        }
    }

    #[test]
    fn test_validate_rejects_empty_extension() {
        let config = RulesConfig {
            rules: RuleSet::new(vec![Rule::new("Images", [".jpg", ""])]),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyExtension(_))
        ));
    }

    #[test]
    fn test_load_explicit_missing_file() {
        let result = RulesConfig::load(Some(Path::new("/non/existent/rules.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_load_json_file_by_extension() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"rules": [{"name": "Images", "extensions": [".jpg"]}]}"#,
        )
        .expect("Failed to write config");

        let config = RulesConfig::load(Some(&path)).expect("Failed to load config");
        assert_eq!(config.rules.len(), 1);
    }

    #[test]
    fn test_render_round_trips_through_toml() {
        let config = RulesConfig::default();
        let rendered = config.render(ConfigFormat::Toml).unwrap();
        let parsed = RulesConfig::parse(&rendered, ConfigFormat::Toml).unwrap();
        assert_eq!(parsed, config);
    }
}
