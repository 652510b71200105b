// SPDX-License-Identifier: PMPL-1.0-or-later

//! Glossary model: canonical terms and their standard translations.
//!
//! The glossary is authored once and treated as ground truth by the checker
//! and the corrector. Nothing in the pipeline adds terms to it; disagreement
//! with the catalogs is reported, never learned.

pub mod render;

use crate::i18n::Lang;
use crate::store::{self, StoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use render::render_markdown;

const SEED_GLOSSARY: &str = include_str!("../../data/master_glossary.json");

#[derive(Debug, Error)]
pub enum GlossaryError {
    #[error("glossary file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("glossary term not found: '{0}'")]
    NotFound(String),

    #[error("glossary term '{term}' has no standard form for '{lang}'")]
    TranslationNotFound { term: String, lang: Lang },

    #[error("duplicate glossary term '{0}' (identifiers are case-insensitive)")]
    DuplicateTerm(String),

    #[error("glossary term identifiers must not be empty")]
    EmptyTerm,

    #[error("malformed glossary {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    #[error("writing glossary: {0}")]
    Write(#[from] StoreError),

    #[error("glossary i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One canonical concept with its standard surface form per language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryTerm {
    #[serde(skip)]
    pub id: String,
    pub category: String,
    #[serde(default)]
    pub context: String,
    pub translations: BTreeMap<Lang, String>,
    #[serde(default)]
    pub notes: String,
}

impl GlossaryTerm {
    pub fn standard_form(&self, lang: Lang) -> Option<&str> {
        self.translations.get(&lang).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glossary {
    /// Keyed by the lowercased identifier.
    terms: BTreeMap<String, GlossaryTerm>,
}

impl Glossary {
    /// Build a glossary, enforcing non-empty, case-insensitively unique ids.
    pub fn from_terms<I>(terms: I) -> Result<Self, GlossaryError>
    where
        I: IntoIterator<Item = (String, GlossaryTerm)>,
    {
        let mut glossary = Self::default();
        for (id, mut term) in terms {
            let id = id.trim().to_string();
            if id.is_empty() {
                return Err(GlossaryError::EmptyTerm);
            }
            let normalized = id.to_lowercase();
            if glossary.terms.contains_key(&normalized) {
                return Err(GlossaryError::DuplicateTerm(id));
            }
            term.id = id;
            glossary.terms.insert(normalized, term);
        }
        Ok(glossary)
    }

    /// Parse a JSON glossary document. `origin` is only used in errors.
    pub fn from_json(content: &str, origin: &Path) -> Result<Self, GlossaryError> {
        let raw: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(content).map_err(|e| GlossaryError::MalformedDocument {
                path: origin.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_raw_entries(raw.into_iter().map(|(id, value)| {
            serde_json::from_value::<GlossaryTerm>(value)
                .map(|term| (id.clone(), term))
                .map_err(|e| (id, e.to_string()))
        }), origin)
    }

    /// Parse a YAML glossary document.
    pub fn from_yaml(content: &str, origin: &Path) -> Result<Self, GlossaryError> {
        let raw: Vec<(String, serde_yaml::Value)> =
            serde_yaml::from_str::<serde_yaml::Mapping>(content)
                .map_err(|e| GlossaryError::MalformedDocument {
                    path: origin.to_path_buf(),
                    message: e.to_string(),
                })?
                .into_iter()
                .map(|(key, value)| {
                    let id = match key {
                        serde_yaml::Value::String(text) => text,
                        other => serde_yaml::to_string(&other)
                            .map(|text| text.trim().to_string())
                            .unwrap_or_default(),
                    };
                    (id, value)
                })
                .collect();
        Self::from_raw_entries(raw.into_iter().map(|(id, value)| {
            serde_yaml::from_value::<GlossaryTerm>(value)
                .map(|term| (id.clone(), term))
                .map_err(|e| (id, e.to_string()))
        }), origin)
    }

    fn from_raw_entries<I>(entries: I, origin: &Path) -> Result<Self, GlossaryError>
    where
        I: Iterator<Item = Result<(String, GlossaryTerm), (String, String)>>,
    {
        let mut terms = Vec::new();
        for entry in entries {
            let (id, term) = entry.map_err(|(id, message)| GlossaryError::MalformedDocument {
                path: origin.to_path_buf(),
                message: format!("term '{}': {}", id, message),
            })?;
            terms.push((id, term));
        }
        Self::from_terms(terms)
    }

    /// Load a glossary file; `.yaml`/`.yml` are parsed as YAML, anything
    /// else as JSON.
    pub fn load(path: &Path) -> Result<Self, GlossaryError> {
        if !path.exists() {
            return Err(GlossaryError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| GlossaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml(&content, path),
            _ => Self::from_json(&content, path),
        }
    }

    /// The master glossary shipped with the tool.
    pub fn seed() -> Result<Self, GlossaryError> {
        Self::from_json(SEED_GLOSSARY, Path::new("<embedded master glossary>"))
    }

    /// Serialize back to the on-disk JSON shape.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let document: BTreeMap<&str, &GlossaryTerm> = self
            .terms
            .values()
            .map(|term| (term.id.as_str(), term))
            .collect();
        serde_json::to_string_pretty(&document)
    }

    pub fn save(&self, path: &Path) -> Result<(), GlossaryError> {
        let json = self.to_json().map_err(|e| GlossaryError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })?;
        store::write_atomic(path, format!("{}\n", json).as_bytes())?;
        Ok(())
    }

    /// Case-insensitive lookup by identifier.
    pub fn lookup(&self, term: &str) -> Result<&GlossaryTerm, GlossaryError> {
        self.terms
            .get(&term.trim().to_lowercase())
            .ok_or_else(|| GlossaryError::NotFound(term.to_string()))
    }

    /// Standard surface form of `term` in `lang`. An empty stored form is
    /// returned as-is; only a missing entry is `TranslationNotFound`.
    pub fn standard_form(&self, term: &str, lang: Lang) -> Result<&str, GlossaryError> {
        let entry = self.lookup(term)?;
        entry
            .standard_form(lang)
            .ok_or_else(|| GlossaryError::TranslationNotFound {
                term: entry.id.clone(),
                lang,
            })
    }

    /// Languages among `languages` for which `term` has no standard form.
    pub fn missing_languages(&self, term: &str, languages: &[Lang]) -> Result<Vec<Lang>, GlossaryError> {
        let entry = self.lookup(term)?;
        Ok(languages
            .iter()
            .copied()
            .filter(|lang| !entry.translations.contains_key(lang))
            .collect())
    }

    /// Terms in identifier order.
    pub fn terms(&self) -> impl Iterator<Item = &GlossaryTerm> {
        self.terms.values()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}
