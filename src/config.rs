// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pipeline configuration.
//!
//! Paths and heuristics live here instead of being baked into the code.
//! A config file (YAML or JSON) is optional; every field has a default and
//! the CLI overrides individual fields after loading.

use crate::i18n::Lang;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "termcheck.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding one sub-directory per language code.
    pub locales_root: PathBuf,
    pub glossary_path: PathBuf,
    /// Directory receiving reports and the consolidated spreadsheet.
    pub output_path: PathBuf,
    pub catalog_file_name: String,
    pub base_language: Lang,
    pub languages: Vec<Lang>,
    /// Treat an absent language file as an empty catalog instead of skipping it.
    pub create_missing_languages: bool,
    pub checker: CheckerSettings,
    pub markers: ReviewMarkers,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            locales_root: PathBuf::from("locales"),
            glossary_path: PathBuf::from("glossary.json"),
            output_path: PathBuf::from("reports"),
            catalog_file_name: "translation.json".to_string(),
            base_language: Lang::Es,
            languages: Lang::all().to_vec(),
            create_missing_languages: false,
            checker: CheckerSettings::default(),
            markers: ReviewMarkers::default(),
        }
    }
}

/// Tunable heuristics of the consistency checker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerSettings {
    /// Values longer than `base * max_length_ratio` are suspicious (exclusive).
    pub max_length_ratio: f64,
    /// Values shorter than `base * min_length_ratio` are suspicious (exclusive).
    pub min_length_ratio: f64,
    pub placeholder_delimiters: Vec<Delimiters>,
    /// Suffixes allowed after a whole-word term match (`clients` for `client`).
    pub plural_suffixes: Vec<String>,
    /// Flag values whose placeholder names differ from the base value's.
    pub compare_placeholders_with_base: bool,
}

impl Default for CheckerSettings {
    fn default() -> Self {
        Self {
            max_length_ratio: 2.0,
            min_length_ratio: 0.5,
            placeholder_delimiters: vec![Delimiters::default()],
            plural_suffixes: vec!["s".to_string(), "es".to_string()],
            compare_placeholders_with_base: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Sentinel strings the corrector writes for cells it will not fix itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewMarkers {
    /// Replaces a missing value.
    pub missing: String,
    /// Prefixed to a value with an unresolved placeholder.
    pub placeholder: String,
    /// Prefixed to a value with a suspicious length.
    pub length: String,
}

impl Default for ReviewMarkers {
    fn default() -> Self {
        Self {
            missing: "[PENDING AUTO-TRANSLATION]".to_string(),
            placeholder: "[REVIEW PLACEHOLDER] ".to_string(),
            length: "[REVIEW LENGTH] ".to_string(),
        }
    }
}

impl ReviewMarkers {
    /// True when the value already carries one of the markers.
    pub fn is_marked(&self, value: &str) -> bool {
        value == self.missing
            || (!self.placeholder.is_empty() && value.starts_with(&self.placeholder))
            || (!self.length.is_empty() && value.starts_with(&self.length))
    }

    /// `value` without its leading run of review tags.
    pub fn strip_tags<'v>(&self, value: &'v str) -> &'v str {
        let tags = [self.placeholder.as_str(), self.length.as_str()];
        let mut rest = value;
        while let Some(tag) = tags
            .iter()
            .find(|tag| !tag.is_empty() && rest.starts_with(*tag))
        {
            rest = &rest[tag.len()..];
        }
        rest
    }
}

impl PipelineConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists,
    /// or fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            _ => serde_yaml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checker = &self.checker;
        if !(checker.min_length_ratio > 0.0 && checker.min_length_ratio < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "min_length_ratio must be in (0, 1), got {}",
                checker.min_length_ratio
            )));
        }
        if checker.max_length_ratio <= 1.0 {
            return Err(ConfigError::Invalid(format!(
                "max_length_ratio must be greater than 1, got {}",
                checker.max_length_ratio
            )));
        }
        for pair in &checker.placeholder_delimiters {
            if pair.open.is_empty() || pair.close.is_empty() {
                return Err(ConfigError::Invalid(
                    "placeholder delimiters must not be empty".to_string(),
                ));
            }
        }
        if !self.languages.contains(&self.base_language) {
            return Err(ConfigError::Invalid(format!(
                "base language '{}' is not among the configured languages",
                self.base_language
            )));
        }
        if self.catalog_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "catalog_file_name must not be empty".to_string(),
            ));
        }
        if self.markers.missing.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "the missing-translation marker must not be blank".to_string(),
            ));
        }
        Ok(())
    }

    /// Configured languages in column order, base included.
    pub fn language_set(&self) -> Vec<Lang> {
        let mut languages = self.languages.clone();
        languages.push(self.base_language);
        languages.sort();
        languages.dedup();
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        config.validate().unwrap();
        assert_eq!(config.language_set().len(), 9);
        assert_eq!(config.base_language, Lang::Es);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("termcheck.yaml");
        fs::write(
            &path,
            "locales_root: app/locales\nbase_language: en\nchecker:\n  max_length_ratio: 3.0\n",
        )
        .unwrap();

        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.locales_root, PathBuf::from("app/locales"));
        assert_eq!(config.base_language, Lang::En);
        assert_eq!(config.checker.max_length_ratio, 3.0);
        assert_eq!(config.checker.min_length_ratio, 0.5);
        assert_eq!(config.catalog_file_name, "translation.json");
    }

    #[test]
    fn test_json_config_is_accepted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"languages": ["es", "en"], "output_path": "out"}"#).unwrap();
        let config = PipelineConfig::load(Some(&path)).unwrap();
        assert_eq!(config.language_set(), vec![Lang::En, Lang::Es]);
        assert_eq!(config.output_path, PathBuf::from("out"));
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let mut config = PipelineConfig::default();
        config.checker.max_length_ratio = 0.8;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_base_outside_language_set() {
        let config = PipelineConfig {
            languages: vec![Lang::En, Lang::De],
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let err = PipelineConfig::load(Some(Path::new("/nonexistent/termcheck.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_markers_detect_tagged_values() {
        let markers = ReviewMarkers::default();
        assert!(markers.is_marked("[PENDING AUTO-TRANSLATION]"));
        assert!(markers.is_marked("[REVIEW LENGTH] Some text"));
        assert!(!markers.is_marked("Some text"));
    }

    #[test]
    fn test_strip_tags_removes_leading_run_only() {
        let markers = ReviewMarkers::default();
        assert_eq!(
            markers.strip_tags("[REVIEW LENGTH] [REVIEW PLACEHOLDER] Hola {{[nombre]}}"),
            "Hola {{[nombre]}}"
        );
        assert_eq!(markers.strip_tags("Hola [REVIEW LENGTH] "), "Hola [REVIEW LENGTH] ");
        assert_eq!(markers.strip_tags("[PENDING AUTO-TRANSLATION]"), "[PENDING AUTO-TRANSLATION]");
    }
}
