// SPDX-License-Identifier: PMPL-1.0-or-later

//! Run reports and change logs

pub mod diff;
pub mod formatter;
pub mod output;

use crate::checker::TermForms;
use crate::corrector::CorrectionSummary;
use crate::i18n::Lang;
use crate::store::LoadFailure;
use crate::types::{Issue, IssueCounts};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub use diff::{diff, ChangeRow, Diff};
pub use formatter::ReportFormatter;
pub use output::ReportOutputFormat;

/// blake3 digests of one language's catalog before and after a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub language: Lang,
    pub before: String,
    pub after: String,
}

impl Fingerprint {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub created_at: String,
    pub base_language: Lang,
    pub languages: Vec<Lang>,
    pub rows: usize,
    #[serde(default)]
    pub load_failures: Vec<LoadFailure>,
    #[serde(default)]
    pub orphan_keys: BTreeMap<Lang, usize>,
    pub issue_counts: IssueCounts,
    pub issues: Vec<Issue>,
    /// Terms translated more than one way within a language.
    #[serde(default)]
    pub inconsistent_forms: Vec<TermForms>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub corrections: Option<CorrectionSummary>,
    #[serde(default)]
    pub changes: Vec<ChangeRow>,
    #[serde(default)]
    pub fingerprints: Vec<Fingerprint>,
}

impl RunReport {
    pub fn new(base_language: Lang, languages: Vec<Lang>, rows: usize) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            base_language,
            languages,
            rows,
            load_failures: Vec::new(),
            orphan_keys: BTreeMap::new(),
            issue_counts: IssueCounts::default(),
            issues: Vec::new(),
            inconsistent_forms: Vec::new(),
            corrections: None,
            changes: Vec::new(),
            fingerprints: Vec::new(),
        }
    }

    pub fn with_issues(mut self, issues: Vec<Issue>) -> Self {
        self.issue_counts = IssueCounts::tally(&issues);
        self.issues = issues;
        self
    }
}

/// Write `report` to `directory` once per format, as
/// `termcheck-<timestamp>.<ext>`.
pub fn persist_report(
    report: &RunReport,
    directory: &Path,
    formats: &[ReportOutputFormat],
) -> Result<Vec<PathBuf>> {
    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    fs::create_dir_all(directory)
        .with_context(|| format!("creating report directory {}", directory.display()))?;

    let mut stored = Vec::new();
    for format in formats {
        let path = directory.join(format!("termcheck-{}.{}", timestamp, format.extension()));
        save_report(report, &path, *format)?;
        stored.push(path);
    }
    Ok(stored)
}

/// Serialize `report` in `format` and write it to `path`.
pub fn save_report(report: &RunReport, path: &Path, format: ReportOutputFormat) -> Result<()> {
    let content = format.serialize(report)?;
    fs::write(path, content).with_context(|| format!("writing report {}", path.display()))?;
    info!(path = %path.display(), format = format.extension(), "report written");
    Ok(())
}

/// Print report to console
pub fn print_report(report: &RunReport) {
    ReportFormatter::new().print(report);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IssueKind;
    use tempfile::TempDir;

    fn sample() -> RunReport {
        let mut report = RunReport::new(Lang::Es, vec![Lang::En, Lang::Es], 2).with_issues(vec![
            Issue::new("save", Lang::En, IssueKind::MissingTranslation, None),
        ]);
        report.changes.push(ChangeRow {
            key: "save".to_string(),
            language: Lang::En,
            before: None,
            after: Some("[PENDING AUTO-TRANSLATION]".to_string()),
        });
        report
    }

    #[test]
    fn test_with_issues_tallies_counts() {
        let report = sample();
        assert_eq!(report.issue_counts.missing, 1);
        assert_eq!(report.issue_counts.total(), 1);
    }

    #[test]
    fn test_persist_writes_one_file_per_format() {
        let dir = TempDir::new().unwrap();
        let paths = persist_report(
            &sample(),
            &dir.path().join("reports"),
            &[ReportOutputFormat::Json, ReportOutputFormat::Markdown],
        )
        .unwrap();
        assert_eq!(paths.len(), 2);
        for path in &paths {
            assert!(path.is_file());
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("termcheck-"));
        }
        let json = fs::read_to_string(&paths[0]).unwrap();
        let parsed: RunReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.changes, sample().changes);
    }
}
