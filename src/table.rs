// SPDX-License-Identifier: PMPL-1.0-or-later

//! Consolidated cross-language view of the catalogs.
//!
//! One row per translation key of the base language, one column per
//! language. The table is derived from the per-language catalogs and is
//! what the checker scans and the corrector rewrites.

use crate::catalog::Catalog;
use crate::i18n::Lang;
use std::collections::BTreeMap;

pub type Row = BTreeMap<Lang, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsolidatedTable {
    base: Lang,
    languages: Vec<Lang>,
    rows: BTreeMap<String, Row>,
}

impl ConsolidatedTable {
    /// Empty table. `languages` is normalised to column order and always
    /// contains `base`.
    pub fn new(base: Lang, languages: &[Lang]) -> Self {
        let mut columns: Vec<Lang> = languages.to_vec();
        columns.push(base);
        columns.sort();
        columns.dedup();
        Self {
            base,
            languages: columns,
            rows: BTreeMap::new(),
        }
    }

    /// Build the table from loaded catalogs. Rows are the base catalog's
    /// keys; keys that only exist in other languages are dropped.
    pub fn from_catalogs(base: Lang, catalogs: &BTreeMap<Lang, Catalog>) -> Self {
        let languages: Vec<Lang> = catalogs.keys().copied().collect();
        let mut table = Self::new(base, &languages);
        let Some(base_catalog) = catalogs.get(&base) else {
            return table;
        };
        for (key, value) in base_catalog.iter() {
            let mut row = Row::new();
            row.insert(base, value.to_string());
            for (lang, catalog) in catalogs {
                if *lang == base {
                    continue;
                }
                if let Some(text) = catalog.get(key) {
                    row.insert(*lang, text.to_string());
                }
            }
            table.rows.insert(key.to_string(), row);
        }
        table
    }

    pub fn base(&self) -> Lang {
        self.base
    }

    pub fn languages(&self) -> &[Lang] {
        &self.languages
    }

    /// Languages other than the base, in column order.
    pub fn targets(&self) -> impl Iterator<Item = Lang> + '_ {
        let base = self.base;
        self.languages.iter().copied().filter(move |lang| *lang != base)
    }

    pub fn has_language(&self, lang: Lang) -> bool {
        self.languages.contains(&lang)
    }

    pub fn add_language(&mut self, lang: Lang) {
        if !self.has_language(lang) {
            self.languages.push(lang);
            self.languages.sort();
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.rows.iter().map(|(key, row)| (key.as_str(), row))
    }

    pub fn row(&self, key: &str) -> Option<&Row> {
        self.rows.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    pub fn cell(&self, key: &str, lang: Lang) -> Option<&str> {
        self.rows
            .get(key)
            .and_then(|row| row.get(&lang))
            .map(String::as_str)
    }

    pub fn insert_row(&mut self, key: impl Into<String>) -> &mut Row {
        self.rows.entry(key.into()).or_default()
    }

    /// Overwrite one cell. Returns `false` when the row or the language
    /// column does not exist.
    pub fn set(&mut self, key: &str, lang: Lang, value: impl Into<String>) -> bool {
        if !self.has_language(lang) {
            return false;
        }
        match self.rows.get_mut(key) {
            Some(row) => {
                row.insert(lang, value.into());
                true
            }
            None => false,
        }
    }
}
