// SPDX-License-Identifier: PMPL-1.0-or-later

//! Cell-level diff between two consolidated tables.

use crate::i18n::Lang;
use crate::store;
use crate::table::ConsolidatedTable;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::Path;

/// One changed cell. `None` means the cell is absent on that side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRow {
    pub key: String,
    pub language: Lang,
    pub before: Option<String>,
    pub after: Option<String>,
}

type Keys<'a> = Peekable<Box<dyn Iterator<Item = &'a str> + 'a>>;

/// Lazy iterator over the changed cells of two tables, in key order and
/// then language column order. Keys and languages are the union of both
/// tables.
pub struct Diff<'a> {
    before: &'a ConsolidatedTable,
    after: &'a ConsolidatedTable,
    languages: Vec<Lang>,
    left: Keys<'a>,
    right: Keys<'a>,
    current: Option<&'a str>,
    column: usize,
}

/// Start a diff. Calling it again on the same snapshots yields the same
/// sequence.
pub fn diff<'a>(before: &'a ConsolidatedTable, after: &'a ConsolidatedTable) -> Diff<'a> {
    let mut languages: Vec<Lang> = before
        .languages()
        .iter()
        .chain(after.languages())
        .copied()
        .collect();
    languages.sort();
    languages.dedup();

    let left: Box<dyn Iterator<Item = &'a str> + 'a> = Box::new(before.keys());
    let right: Box<dyn Iterator<Item = &'a str> + 'a> = Box::new(after.keys());
    Diff {
        before,
        after,
        languages,
        left: left.peekable(),
        right: right.peekable(),
        current: None,
        column: 0,
    }
}

impl<'a> Diff<'a> {
    fn next_key(&mut self) -> Option<&'a str> {
        let left = self.left.peek().copied();
        let right = self.right.peek().copied();
        match (left, right) {
            (Some(l), Some(r)) => match l.cmp(r) {
                Ordering::Less => self.left.next(),
                Ordering::Greater => self.right.next(),
                Ordering::Equal => {
                    self.right.next();
                    self.left.next()
                }
            },
            (Some(_), None) => self.left.next(),
            (None, Some(_)) => self.right.next(),
            (None, None) => None,
        }
    }
}

impl<'a> Iterator for Diff<'a> {
    type Item = ChangeRow;

    fn next(&mut self) -> Option<ChangeRow> {
        loop {
            let key = match self.current {
                Some(key) => key,
                None => {
                    let key = self.next_key()?;
                    self.current = Some(key);
                    self.column = 0;
                    key
                }
            };

            while self.column < self.languages.len() {
                let lang = self.languages[self.column];
                self.column += 1;
                let before = self.before.cell(key, lang);
                let after = self.after.cell(key, lang);
                if before != after {
                    return Some(ChangeRow {
                        key: key.to_string(),
                        language: lang,
                        before: before.map(str::to_string),
                        after: after.map(str::to_string),
                    });
                }
            }
            self.current = None;
        }
    }
}

/// Load a consolidated CSV for `diff BEFORE AFTER`.
pub fn load_table(path: &Path, base: Lang) -> Result<ConsolidatedTable> {
    store::load_consolidated_file(path, base)
        .with_context(|| format!("reading consolidated table {}", path.display()))
}
