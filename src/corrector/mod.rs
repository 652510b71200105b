// SPDX-License-Identifier: PMPL-1.0-or-later

//! Corrector
//!
//! Applies a checker report to a copy of the consolidated table. Only term
//! mismatches are actually fixed, using the glossary's standard form; every
//! other issue is tagged for human review with a [`ReviewMarkers`] sentinel.

use crate::config::ReviewMarkers;
use crate::i18n::Lang;
use crate::table::ConsolidatedTable;
use crate::types::{Issue, IssueCounts, IssueKind};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A term issue skipped because its cell had already been rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conflict {
    pub key: String,
    pub language: Lang,
    pub term: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionSummary {
    pub applied: IssueCounts,
    /// Issues that needed no change (tag already present, row gone...).
    pub unchanged: usize,
    pub conflicts: Vec<Conflict>,
}

pub struct Corrector<'a> {
    markers: &'a ReviewMarkers,
}

impl<'a> Corrector<'a> {
    pub fn new(markers: &'a ReviewMarkers) -> Self {
        Self { markers }
    }

    /// Return a corrected copy of `table`; `table` itself is left untouched
    /// so it can serve as the "before" snapshot of the change report.
    pub fn correct(
        &self,
        table: &ConsolidatedTable,
        issues: &[Issue],
    ) -> (ConsolidatedTable, CorrectionSummary) {
        let mut corrected = table.clone();
        let mut summary = CorrectionSummary::default();
        let mut rewritten: HashSet<(String, Lang)> = HashSet::new();

        for issue in issues {
            if !corrected.contains_key(&issue.key) || !corrected.has_language(issue.language) {
                summary.unchanged += 1;
                continue;
            }
            let current = corrected
                .cell(&issue.key, issue.language)
                .map(str::to_string);

            if issue.kind.is_review_tag() && self.is_stale(issue, current.as_deref()) {
                debug!(
                    key = %issue.key,
                    language = %issue.language,
                    kind = %issue.kind,
                    "cell changed since the check; tag left for the next run"
                );
                summary.unchanged += 1;
                continue;
            }

            let replacement = match issue.kind {
                IssueKind::TermInconsistency => {
                    let cell = (issue.key.clone(), issue.language);
                    if rewritten.contains(&cell) {
                        warn!(
                            key = %issue.key,
                            language = %issue.language,
                            "cell already rewritten by another term; skipping"
                        );
                        summary.conflicts.push(Conflict {
                            key: issue.key.clone(),
                            language: issue.language,
                            term: issue.term.clone(),
                        });
                        continue;
                    }
                    match (&issue.suggested, &current) {
                        (Some(standard), Some(original)) => {
                            rewritten.insert(cell);
                            Some(match_capitalization(original, standard))
                        }
                        (Some(standard), None) => {
                            rewritten.insert(cell);
                            Some(standard.clone())
                        }
                        (None, _) => None,
                    }
                }
                IssueKind::MissingTranslation => Some(self.markers.missing.clone()),
                IssueKind::UnresolvedPlaceholder => current
                    .as_deref()
                    .map(|value| self.tag(&self.markers.placeholder, value)),
                IssueKind::SuspiciousLength => current
                    .as_deref()
                    .map(|value| self.tag(&self.markers.length, value)),
            };

            match replacement {
                Some(value) if current.as_deref() != Some(value.as_str()) => {
                    corrected.set(&issue.key, issue.language, value);
                    summary.applied.add(issue.kind);
                }
                _ => summary.unchanged += 1,
            }
        }

        (corrected, summary)
    }

    /// The issue was raised against a value the cell no longer holds, once
    /// review tags added in this pass are set aside.
    fn is_stale(&self, issue: &Issue, current: Option<&str>) -> bool {
        match (issue.observed.as_deref(), current) {
            (Some(observed), Some(current)) => self.markers.strip_tags(current) != observed,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Prefix `value` with `marker` unless the leading run of review tags
    /// already contains it.
    fn tag(&self, marker: &str, value: &str) -> String {
        let tags = [self.markers.placeholder.as_str(), self.markers.length.as_str()];
        let mut rest = value;
        loop {
            if rest.starts_with(marker) {
                return value.to_string();
            }
            match tags
                .iter()
                .find(|tag| !tag.is_empty() && rest.starts_with(*tag))
            {
                Some(tag) => rest = &rest[tag.len()..],
                None => break,
            }
        }
        format!("{}{}", marker, value)
    }
}

/// Uppercase the replacement's first character when the original started
/// with an uppercase character; otherwise keep the glossary casing.
pub fn match_capitalization(original: &str, replacement: &str) -> String {
    let starts_upper = original
        .chars()
        .next()
        .map(char::is_uppercase)
        .unwrap_or(false);
    if !starts_upper {
        return replacement.to_string();
    }
    let mut chars = replacement.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Convenience wrapper around [`Corrector::correct`].
pub fn correct(
    table: &ConsolidatedTable,
    issues: &[Issue],
    markers: &ReviewMarkers,
) -> (ConsolidatedTable, CorrectionSummary) {
    Corrector::new(markers).correct(table, issues)
}
