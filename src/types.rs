// SPDX-License-Identifier: PMPL-1.0-or-later

//! Core type definitions for termcheck

use crate::i18n::Lang;
use serde::{Deserialize, Serialize};

/// Kinds of problems the checker reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IssueKind {
    MissingTranslation,
    TermInconsistency,
    UnresolvedPlaceholder,
    SuspiciousLength,
}

impl IssueKind {
    pub fn all() -> &'static [IssueKind] {
        &[
            IssueKind::MissingTranslation,
            IssueKind::TermInconsistency,
            IssueKind::UnresolvedPlaceholder,
            IssueKind::SuspiciousLength,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::MissingTranslation => "missing",
            IssueKind::TermInconsistency => "term",
            IssueKind::UnresolvedPlaceholder => "placeholder",
            IssueKind::SuspiciousLength => "length",
        }
    }

    /// Issues the corrector answers with a review tag rather than a fix.
    pub fn is_review_tag(&self) -> bool {
        matches!(
            self,
            IssueKind::UnresolvedPlaceholder | IssueKind::SuspiciousLength
        )
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::MissingTranslation => write!(f, "MISSING"),
            IssueKind::TermInconsistency => write!(f, "TERM"),
            IssueKind::UnresolvedPlaceholder => write!(f, "PLACEHOLDER"),
            IssueKind::SuspiciousLength => write!(f, "LENGTH"),
        }
    }
}

/// One problem found in one cell of the consolidated table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub key: String,
    pub language: Lang,
    pub kind: IssueKind,
    /// Cell value at check time; `None` when the cell is absent.
    pub observed: Option<String>,
    /// Replacement the glossary prescribes, when there is one.
    pub suggested: Option<String>,
    /// Glossary term behind a `TermInconsistency`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub term: Option<String>,
    /// Free-form explanation (length ratio, offending token...).
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub detail: Option<String>,
}

impl Issue {
    pub fn new(key: &str, language: Lang, kind: IssueKind, observed: Option<&str>) -> Self {
        Self {
            key: key.to_string(),
            language,
            kind,
            observed: observed.map(str::to_string),
            suggested: None,
            term: None,
            detail: None,
        }
    }

    pub fn with_suggestion(mut self, suggested: impl Into<String>) -> Self {
        self.suggested = Some(suggested.into());
        self
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Issue totals per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCounts {
    pub missing: usize,
    pub term: usize,
    pub placeholder: usize,
    pub length: usize,
}

impl IssueCounts {
    pub fn tally(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            counts.add(issue.kind);
        }
        counts
    }

    pub fn add(&mut self, kind: IssueKind) {
        match kind {
            IssueKind::MissingTranslation => self.missing += 1,
            IssueKind::TermInconsistency => self.term += 1,
            IssueKind::UnresolvedPlaceholder => self.placeholder += 1,
            IssueKind::SuspiciousLength => self.length += 1,
        }
    }

    pub fn get(&self, kind: IssueKind) -> usize {
        match kind {
            IssueKind::MissingTranslation => self.missing,
            IssueKind::TermInconsistency => self.term,
            IssueKind::UnresolvedPlaceholder => self.placeholder,
            IssueKind::SuspiciousLength => self.length,
        }
    }

    pub fn total(&self) -> usize {
        self.missing + self.term + self.placeholder + self.length
    }
}
