// SPDX-License-Identifier: PMPL-1.0-or-later

//! Persistent storage for catalogs
//!
//! Layout: `<root>/<language code>/<file name>`, each file a nested JSON
//! translation tree. Writes go through a temporary file in the target
//! directory followed by a rename, so a crash never leaves a truncated
//! catalog behind.

pub mod spreadsheet;

use crate::catalog::{self, Catalog, CatalogError};
use crate::i18n::Lang;
use crate::table::ConsolidatedTable;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use spreadsheet::{load_consolidated_file, save_consolidated_file, KEY_HEADER};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("catalog not found: {0}")]
    NotFound(PathBuf),

    #[error("malformed catalog {path}: {message}")]
    MalformedDocument { path: PathBuf, message: String },

    #[error("failed to replace {path}: {message}")]
    PartialWriteFailure { path: PathBuf, message: String },

    #[error("catalog i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalog for {lang}: {source}")]
    Catalog {
        lang: Lang,
        #[source]
        source: CatalogError,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A language that could not be loaded into the consolidated table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    pub language: Lang,
    pub reason: String,
    /// The catalog file did not exist (as opposed to being unreadable).
    #[serde(default)]
    pub missing: bool,
}

/// Result of [`CatalogStore::load_consolidated`].
#[derive(Debug, Clone)]
pub struct ConsolidatedLoad {
    pub table: ConsolidatedTable,
    pub catalogs: BTreeMap<Lang, Catalog>,
    pub failures: Vec<LoadFailure>,
    /// Keys present in a language but absent from the base catalog.
    pub orphans: BTreeMap<Lang, usize>,
}

#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: PathBuf,
    file_name: String,
}

impl CatalogStore {
    pub fn new(root: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_name: file_name.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, lang: Lang) -> PathBuf {
        self.root.join(lang.code()).join(&self.file_name)
    }

    /// Read and flatten one language's catalog.
    pub fn load(&self, lang: Lang) -> Result<Catalog, StoreError> {
        let path = self.path_for(lang);
        if !path.is_file() {
            return Err(StoreError::NotFound(path));
        }
        let bytes = fs::read(&path).map_err(|e| StoreError::io(&path, e))?;
        let content = decode_text(&bytes).ok_or_else(|| StoreError::MalformedDocument {
            path: path.clone(),
            message: "neither UTF-8 nor Windows-1252 text".to_string(),
        })?;
        let nested: serde_json::Value =
            serde_json::from_str(&content).map_err(|e| StoreError::MalformedDocument {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let catalog = catalog::flatten(&nested).map_err(|e| StoreError::MalformedDocument {
            path: path.clone(),
            message: e.to_string(),
        })?;
        debug!(language = %lang, keys = catalog.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// Write one catalog in nested form, replacing the previous file
    /// atomically.
    pub fn save(&self, lang: Lang, catalog: &Catalog) -> Result<PathBuf, StoreError> {
        let nested =
            catalog::unflatten(catalog).map_err(|source| StoreError::Catalog { lang, source })?;
        let mut payload = serde_json::to_string_pretty(&nested).map_err(|e| {
            StoreError::MalformedDocument {
                path: self.path_for(lang),
                message: e.to_string(),
            }
        })?;
        payload.push('\n');

        let path = self.path_for(lang);
        write_atomic(&path, payload.as_bytes())?;
        info!(language = %lang, keys = catalog.len(), path = %path.display(), "catalog saved");
        Ok(path)
    }

    /// Load every language and build the consolidated table, one worker per
    /// language. The base language must load; other failures are recorded
    /// and the language is left out of the table.
    pub fn load_consolidated(
        &self,
        base: Lang,
        languages: &[Lang],
        create_missing: bool,
    ) -> Result<ConsolidatedLoad, StoreError> {
        let mut wanted: Vec<Lang> = languages.to_vec();
        wanted.push(base);
        wanted.sort();
        wanted.dedup();

        let results: Vec<(Lang, Result<Catalog, StoreError>)> = wanted
            .par_iter()
            .map(|lang| (*lang, self.load(*lang)))
            .collect();

        let mut catalogs = BTreeMap::new();
        let mut failures = Vec::new();
        for (lang, result) in results {
            match result {
                Ok(catalog) => {
                    catalogs.insert(lang, catalog);
                }
                Err(err) if lang == base => return Err(err),
                Err(StoreError::NotFound(path)) if create_missing => {
                    debug!(language = %lang, path = %path.display(), "starting empty catalog");
                    catalogs.insert(lang, Catalog::new());
                }
                Err(err) => {
                    warn!(language = %lang, error = %err, "skipping language");
                    failures.push(LoadFailure {
                        language: lang,
                        missing: matches!(err, StoreError::NotFound(_)),
                        reason: err.to_string(),
                    });
                }
            }
        }

        let table = ConsolidatedTable::from_catalogs(base, &catalogs);
        let orphans = catalogs
            .iter()
            .filter(|(lang, _)| **lang != base)
            .map(|(lang, catalog)| {
                let count = catalog.keys().filter(|key| !table.contains_key(key)).count();
                (*lang, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect();

        Ok(ConsolidatedLoad {
            table,
            catalogs,
            failures,
            orphans,
        })
    }

    /// Persist several catalogs, one worker per language. Each catalog is
    /// saved atomically; a failure in one language does not stop the others.
    pub fn save_all(
        &self,
        catalogs: &BTreeMap<Lang, Catalog>,
    ) -> Vec<(Lang, Result<PathBuf, StoreError>)> {
        let pending: Vec<(&Lang, &Catalog)> = catalogs.iter().collect();
        pending
            .par_iter()
            .map(|(lang, catalog)| (**lang, self.save(**lang, catalog)))
            .collect()
    }

    /// Language directories under the root that hold a catalog file.
    pub fn discover(&self) -> Vec<Lang> {
        Lang::all()
            .iter()
            .copied()
            .filter(|lang| self.path_for(*lang).is_file())
            .collect()
    }
}

/// blake3 digest of a catalog's flattened content, independent of how the
/// file was formatted on disk.
pub fn fingerprint(catalog: &Catalog) -> String {
    let mut hasher = blake3::Hasher::new();
    for (key, value) in catalog.iter() {
        hasher.update(key.as_bytes());
        hasher.update(&[0]);
        hasher.update(value.as_bytes());
        hasher.update(&[0xff]);
    }
    hasher.finalize().to_hex().to_string()
}

/// Write `bytes` to `path` via a sibling temporary file and a rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

    let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
    temp.write_all(bytes)
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| StoreError::io(temp.path(), e))?;
    temp.persist(path)
        .map_err(|e| StoreError::PartialWriteFailure {
            path: path.to_path_buf(),
            message: e.error.to_string(),
        })?;
    Ok(())
}

/// Decode file contents: UTF-8 (BOM stripped) first, Windows-1252 fallback.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Some(text.to_string()),
        Err(_) => {
            let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
            if had_errors {
                None
            } else {
                Some(cow.into_owned())
            }
        }
    }
}
