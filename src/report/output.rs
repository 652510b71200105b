// SPDX-License-Identifier: PMPL-1.0-or-later

//! Serialization helpers for printed/exported reports

use crate::report::diff::ChangeRow;
use crate::report::RunReport;
use crate::types::IssueKind;
use anyhow::Result;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportOutputFormat {
    Json,
    Yaml,
    Markdown,
}

impl ReportOutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "json" => Some(ReportOutputFormat::Json),
            "yaml" | "yml" => Some(ReportOutputFormat::Yaml),
            "markdown" | "md" => Some(ReportOutputFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportOutputFormat::Json => "json",
            ReportOutputFormat::Yaml => "yaml",
            ReportOutputFormat::Markdown => "md",
        }
    }

    pub fn serialize(&self, report: &RunReport) -> Result<String> {
        match self {
            ReportOutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportOutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            ReportOutputFormat::Markdown => Ok(format_report_as_markdown(report)),
        }
    }
}

/// Escape a value for a Markdown table cell.
pub fn markdown_cell(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('|', "\\|")
        .replace('\r', "")
        .replace('\n', "<br>")
}

fn cell_or_dash(value: Option<&str>) -> String {
    match value {
        Some(text) => markdown_cell(text),
        None => "_(absent)_".to_string(),
    }
}

/// Change log table: one row per changed cell.
pub fn format_changes_as_markdown(changes: &[ChangeRow]) -> String {
    let mut lines = Vec::new();
    lines.push("| Key | Language | Before | After |".to_string());
    lines.push("|-----|----------|--------|-------|".to_string());
    for change in changes {
        lines.push(format!(
            "| `{}` | {} | {} | {} |",
            change.key,
            change.language.display_name(),
            cell_or_dash(change.before.as_deref()),
            cell_or_dash(change.after.as_deref())
        ));
    }
    lines.join("\n")
}

fn format_report_as_markdown(report: &RunReport) -> String {
    let mut lines = Vec::new();
    lines.push("# Terminology Report".to_string());
    lines.push(String::new());
    lines.push(format!("- Generated: {}", report.created_at));
    lines.push(format!(
        "- Base language: {}",
        report.base_language.display_name()
    ));
    let languages: Vec<&str> = report.languages.iter().map(|l| l.code()).collect();
    lines.push(format!("- Languages: {}", languages.join(", ")));
    lines.push(format!("- Keys: {}", report.rows));
    lines.push(String::new());

    if !report.load_failures.is_empty() {
        lines.push("## Skipped languages".to_string());
        lines.push(String::new());
        for failure in &report.load_failures {
            lines.push(format!(
                "- {}: {}",
                failure.language.display_name(),
                failure.reason
            ));
        }
        lines.push(String::new());
    }

    lines.push("## Issues".to_string());
    lines.push(String::new());
    lines.push("| Kind | Count |".to_string());
    lines.push("|------|-------|".to_string());
    for kind in IssueKind::all() {
        lines.push(format!("| {} | {} |", kind, report.issue_counts.get(*kind)));
    }
    lines.push(format!("| Total | {} |", report.issue_counts.total()));
    lines.push(String::new());

    if !report.issues.is_empty() {
        lines.push("| Key | Language | Kind | Observed | Suggested |".to_string());
        lines.push("|-----|----------|------|----------|-----------|".to_string());
        for issue in &report.issues {
            lines.push(format!(
                "| `{}` | {} | {} | {} | {} |",
                issue.key,
                issue.language.code(),
                issue.kind,
                cell_or_dash(issue.observed.as_deref()),
                issue
                    .suggested
                    .as_deref()
                    .map(markdown_cell)
                    .unwrap_or_default()
            ));
        }
        lines.push(String::new());
    }

    if !report.inconsistent_forms.is_empty() {
        lines.push("## Term variants".to_string());
        lines.push(String::new());
        for forms in &report.inconsistent_forms {
            let seen: Vec<String> = forms.forms.iter().map(|form| format!("`{}`", form)).collect();
            lines.push(format!(
                "- `{}` ({}): standard `{}`, seen {}",
                forms.term,
                forms.language.code(),
                forms.standard,
                seen.join(", ")
            ));
        }
        lines.push(String::new());
    }

    if let Some(summary) = &report.corrections {
        lines.push("## Corrections".to_string());
        lines.push(String::new());
        for kind in IssueKind::all() {
            lines.push(format!("- {}: {}", kind, summary.applied.get(*kind)));
        }
        lines.push(format!("- Unchanged: {}", summary.unchanged));
        if !summary.conflicts.is_empty() {
            lines.push(format!("- Conflicts: {}", summary.conflicts.len()));
            for conflict in &summary.conflicts {
                lines.push(format!(
                    "  - `{}` ({}): {}",
                    conflict.key,
                    conflict.language.code(),
                    conflict.term.as_deref().unwrap_or("?")
                ));
            }
        }
        lines.push(String::new());
    }

    if !report.changes.is_empty() {
        lines.push("## Change log".to_string());
        lines.push(String::new());
        lines.push(format_changes_as_markdown(&report.changes));
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Lang;

    #[test]
    fn test_parse_accepts_aliases() {
        assert_eq!(ReportOutputFormat::parse("YML"), Some(ReportOutputFormat::Yaml));
        assert_eq!(ReportOutputFormat::parse("md"), Some(ReportOutputFormat::Markdown));
        assert_eq!(ReportOutputFormat::parse("sarif"), None);
        assert_eq!(ReportOutputFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_markdown_change_log_escapes_cells() {
        let rows = vec![ChangeRow {
            key: "a".to_string(),
            language: Lang::En,
            before: Some("x | y".to_string()),
            after: None,
        }];
        let text = format_changes_as_markdown(&rows);
        assert!(text.contains("| `a` | Inglés | x \\| y | _(absent)_ |"));
    }

    #[test]
    fn test_markdown_report_lists_counts() {
        let report = RunReport::new(Lang::Es, vec![Lang::Es], 0);
        let text = ReportOutputFormat::Markdown.serialize(&report).unwrap();
        assert!(text.starts_with("# Terminology Report"));
        assert!(text.contains("| Total | 0 |"));
        assert!(!text.contains("## Change log"));
    }
}
