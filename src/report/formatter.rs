// SPDX-License-Identifier: PMPL-1.0-or-later

//! Console formatting for run reports

use crate::report::diff::ChangeRow;
use crate::report::RunReport;
use crate::types::{Issue, IssueKind};
use colored::*;

/// Longest value printed in a console cell before truncation.
const CELL_WIDTH: usize = 48;

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn print(&self, report: &RunReport) {
        println!("\n{}", "=== TERMCHECK REPORT ===".bold().cyan());
        println!();

        self.print_overview(report);
        println!();

        self.print_issues(report);
        println!();

        if let Some(summary) = &report.corrections {
            println!("{}", "CORRECTIONS".bold().yellow());
            for kind in IssueKind::all() {
                let applied = summary.applied.get(*kind);
                if applied > 0 {
                    println!("  {:<12} {}", kind.to_string(), applied.to_string().green());
                }
            }
            println!("  {:<12} {}", "UNCHANGED", summary.unchanged);
            for conflict in &summary.conflicts {
                println!(
                    "  {} {} ({}) already rewritten, skipped term {}",
                    "conflict:".yellow(),
                    conflict.key,
                    conflict.language,
                    conflict.term.as_deref().unwrap_or("?")
                );
            }
            println!();
        }

        if !report.changes.is_empty() {
            self.print_changes(&report.changes);
        }
    }

    fn print_overview(&self, report: &RunReport) {
        println!("{}", "CATALOGS".bold().yellow());
        println!(
            "  Base language: {} ({})",
            report.base_language.display_name(),
            report.base_language
        );
        let codes: Vec<&str> = report.languages.iter().map(|l| l.code()).collect();
        println!("  Languages: {}", codes.join(", "));
        println!("  Keys: {}", report.rows);

        for failure in &report.load_failures {
            println!(
                "  {} {}: {}",
                "skipped".red(),
                failure.language,
                failure.reason.dimmed()
            );
        }
        for (lang, count) in &report.orphan_keys {
            println!(
                "  {} {} key(s) in {} not present in the base catalog",
                "orphans".yellow(),
                count,
                lang
            );
        }
        for fingerprint in report.fingerprints.iter().filter(|f| f.changed()) {
            println!(
                "  {} {} {} -> {}",
                "rewritten".green(),
                fingerprint.language,
                short_hash(&fingerprint.before).dimmed(),
                short_hash(&fingerprint.after).dimmed()
            );
        }
    }

    fn print_issues(&self, report: &RunReport) {
        println!("{}", "ISSUES".bold().yellow());
        let total = report.issue_counts.total();
        if total == 0 {
            println!("  {}", "No issues found".green());
            return;
        }
        for kind in IssueKind::all() {
            let count = report.issue_counts.get(*kind);
            if count > 0 {
                println!("  {:<12} {}", kind.to_string(), count.to_string().bold());
            }
        }
        println!("  {:<12} {}", "TOTAL", total.to_string().red().bold());
        println!();
        for forms in &report.inconsistent_forms {
            println!(
                "  {} {} ({}): {} (standard: {})",
                "forms".yellow(),
                forms.term.bold(),
                forms.language,
                forms.forms.join(" / "),
                forms.standard.green()
            );
        }
        if !report.inconsistent_forms.is_empty() {
            println!();
        }
        for issue in &report.issues {
            self.print_issue(issue);
        }
    }

    fn print_issue(&self, issue: &Issue) {
        let tag = match issue.kind {
            IssueKind::MissingTranslation => issue.kind.to_string().red(),
            IssueKind::TermInconsistency => issue.kind.to_string().yellow(),
            IssueKind::UnresolvedPlaceholder => issue.kind.to_string().magenta(),
            IssueKind::SuspiciousLength => issue.kind.to_string().blue(),
        };
        let mut line = format!("  [{}] {} ({})", tag, issue.key.bold(), issue.language);
        if let Some(observed) = &issue.observed {
            line.push_str(&format!(" {}", truncate(observed).dimmed()));
        }
        if let Some(suggested) = &issue.suggested {
            line.push_str(&format!(" -> {}", suggested.green()));
        }
        if let Some(detail) = &issue.detail {
            line.push_str(&format!(" ({})", detail));
        }
        println!("{}", line);
    }

    pub fn print_changes(&self, changes: &[ChangeRow]) {
        println!("{}", "CHANGE LOG".bold().yellow());
        if changes.is_empty() {
            println!("  {}", "No changes".green());
            return;
        }
        let key_width = changes
            .iter()
            .map(|c| c.key.chars().count())
            .max()
            .unwrap_or(3)
            .max(3);
        println!(
            "  {:<key_width$}  {:<4}  {:<cell_width$}  {}",
            "KEY".bold(),
            "LANG".bold(),
            "BEFORE".bold(),
            "AFTER".bold(),
            key_width = key_width,
            cell_width = CELL_WIDTH
        );
        for change in changes {
            let before = change.before.as_deref().map(truncate).unwrap_or_else(|| "-".into());
            let after = change.after.as_deref().map(truncate).unwrap_or_else(|| "-".into());
            println!(
                "  {:<key_width$}  {:<4}  {:<cell_width$}  {}",
                change.key,
                change.language.code(),
                before.red(),
                after.green(),
                key_width = key_width,
                cell_width = CELL_WIDTH
            );
        }
        println!("  {} change(s)", changes.len());
    }
}

impl Default for ReportFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= CELL_WIDTH {
        return value.to_string();
    }
    let mut cut: String = value.chars().take(CELL_WIDTH - 3).collect();
    cut.push_str("...");
    cut
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}
