// SPDX-License-Identifier: PMPL-1.0-or-later

//! Pipeline: load catalogs, check, correct, save, report.
//!
//! Each entry point loads the locale directory afresh, so runs over the
//! same directory should be serialized by the caller.

use crate::catalog::Catalog;
use crate::checker::{CheckReport, Checker, TermForms};
use crate::config::PipelineConfig;
use crate::corrector::Corrector;
use crate::glossary::Glossary;
use crate::i18n::Lang;
use crate::report::{self, diff, Fingerprint, ReportOutputFormat, RunReport};
use crate::store::{self, CatalogStore, ConsolidatedLoad};
use crate::table::ConsolidatedTable;
use crate::types::IssueKind;
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File name of the consolidated review spreadsheet in the output directory.
pub const CONSOLIDATED_FILE: &str = "consolidated.csv";

/// Options for [`Pipeline::fix`] and [`Pipeline::import`].
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Compute everything but leave catalogs and outputs untouched.
    pub dry_run: bool,
    /// Run report formats written to the output directory.
    pub formats: Vec<ReportOutputFormat>,
}

/// Outcome of a run that may write files.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report: RunReport,
    pub table: ConsolidatedTable,
    /// Catalogs, spreadsheets and reports written by the run.
    pub written: Vec<PathBuf>,
}

pub struct Pipeline {
    config: PipelineConfig,
    store: CatalogStore,
    glossary: Glossary,
}

impl Pipeline {
    /// Build a pipeline, loading the glossary named by the configuration.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let glossary = Glossary::load(&config.glossary_path)
            .with_context(|| format!("loading glossary {}", config.glossary_path.display()))?;
        Ok(Self::with_glossary(config, glossary))
    }

    pub fn with_glossary(config: PipelineConfig, glossary: Glossary) -> Self {
        let store = CatalogStore::new(&config.locales_root, config.catalog_file_name.clone());
        Self {
            config,
            store,
            glossary,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn glossary(&self) -> &Glossary {
        &self.glossary
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Load all configured languages into a consolidated table.
    pub fn load(&self) -> Result<ConsolidatedLoad> {
        let load = self
            .store
            .load_consolidated(
                self.config.base_language,
                &self.config.language_set(),
                self.config.create_missing_languages,
            )
            .with_context(|| {
                format!(
                    "loading base catalog from {}",
                    self.store.path_for(self.config.base_language).display()
                )
            })?;
        debug!(
            rows = load.table.len(),
            languages = load.table.languages().len(),
            failures = load.failures.len(),
            "catalogs loaded"
        );
        Ok(load)
    }

    fn checker(&self) -> Result<Checker<'_>> {
        Checker::new(&self.glossary, &self.config.checker, &self.config.markers)
            .context("compiling glossary match patterns")
    }

    fn base_report(&self, load: &ConsolidatedLoad) -> RunReport {
        let mut report = RunReport::new(
            load.table.base(),
            load.table.languages().to_vec(),
            load.table.len(),
        );
        report.load_failures = load.failures.clone();
        report.orphan_keys = load.orphans.clone();
        report
    }

    /// Scan the catalogs and report issues without changing anything.
    pub fn check(&self) -> Result<RunReport> {
        let load = self.load()?;
        let check = self.checker()?.check(&load.table);
        info!(issues = check.issues.len(), "check finished");

        let forms = flagged_forms(&check);
        let mut report = self.base_report(&load).with_issues(check.issues);
        report.inconsistent_forms = forms;
        Ok(report)
    }

    /// Check, correct, and (unless dry-run) save the corrected catalogs,
    /// the consolidated spreadsheet and the run report.
    pub fn fix(&self, options: &WriteOptions) -> Result<RunOutcome> {
        let load = self.load()?;
        let check = self.checker()?.check(&load.table);
        let (corrected, summary) =
            Corrector::new(&self.config.markers).correct(&load.table, &check.issues);
        info!(
            issues = check.issues.len(),
            applied = summary.applied.total(),
            conflicts = summary.conflicts.len(),
            "correction finished"
        );

        let forms = flagged_forms(&check);
        let mut report = self.base_report(&load).with_issues(check.issues);
        report.inconsistent_forms = forms;
        report.corrections = Some(summary);
        report.changes = diff(&load.table, &corrected).collect();

        self.finish(load, corrected, report, options, true)
    }

    /// Apply a reviewed consolidated spreadsheet to the catalogs.
    pub fn import(&self, path: &Path, options: &WriteOptions) -> Result<RunOutcome> {
        let load = self.load()?;
        let imported = report::diff::load_table(path, self.config.base_language)?;
        let merged = merge_imported(&load.table, &imported);

        let mut report = self.base_report(&load);
        report.changes = diff(&load.table, &merged).collect();
        info!(
            path = %path.display(),
            changes = report.changes.len(),
            "reviewed spreadsheet imported"
        );

        self.finish(load, merged, report, options, false)
    }

    /// Write the consolidated spreadsheet. Defaults to
    /// `<output>/consolidated.csv`.
    pub fn export(&self, path: Option<&Path>) -> Result<PathBuf> {
        let load = self.load()?;
        for failure in &load.failures {
            warn!(language = %failure.language, reason = %failure.reason, "language not exported");
        }
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.output_path.join(CONSOLIDATED_FILE));
        store::save_consolidated_file(&load.table, &path)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    fn finish(
        &self,
        load: ConsolidatedLoad,
        updated: ConsolidatedTable,
        mut report: RunReport,
        options: &WriteOptions,
        write_spreadsheet: bool,
    ) -> Result<RunOutcome> {
        let unreadable: Vec<Lang> = load
            .failures
            .iter()
            .filter(|failure| !failure.missing)
            .map(|failure| failure.language)
            .collect();

        let mut pending = BTreeMap::new();
        for lang in updated.languages() {
            if unreadable.contains(lang) {
                warn!(language = %lang, "catalog could not be read; leaving it untouched");
                continue;
            }
            let original = load.catalogs.get(lang);
            let merged = overlay(original, &updated, *lang);
            let fingerprint = Fingerprint {
                language: *lang,
                before: original.map(store::fingerprint).unwrap_or_default(),
                after: store::fingerprint(&merged),
            };
            if fingerprint.changed() && !(original.is_none() && merged.is_empty()) {
                pending.insert(*lang, merged);
            }
            report.fingerprints.push(fingerprint);
        }

        let mut written = Vec::new();
        if options.dry_run {
            info!(catalogs = pending.len(), "dry run; nothing written");
            return Ok(RunOutcome {
                report,
                table: updated,
                written,
            });
        }

        let mut failed = Vec::new();
        for (lang, result) in self.store.save_all(&pending) {
            match result {
                Ok(path) => written.push(path),
                Err(err) => {
                    warn!(language = %lang, error = %err, "catalog not saved");
                    failed.push(format!("{}: {}", lang, err));
                }
            }
        }
        if !failed.is_empty() {
            bail!("failed to save {} catalog(s): {}", failed.len(), failed.join("; "));
        }

        if write_spreadsheet {
            let path = self.config.output_path.join(CONSOLIDATED_FILE);
            store::save_consolidated_file(&updated, &path)
                .with_context(|| format!("writing {}", path.display()))?;
            written.push(path);
        }
        if !options.formats.is_empty() {
            written.extend(report::persist_report(
                &report,
                &self.config.output_path,
                &options.formats,
            )?);
        }

        Ok(RunOutcome {
            report,
            table: updated,
            written,
        })
    }
}

/// Surface-form sets that produced at least one term issue.
fn flagged_forms(check: &CheckReport) -> Vec<TermForms> {
    check
        .term_forms
        .iter()
        .filter(|forms| {
            check.of_kind(IssueKind::TermInconsistency).any(|issue| {
                issue.language == forms.language && issue.term.as_deref() == Some(forms.term.as_str())
            })
        })
        .cloned()
        .collect()
}

/// Project one column of `table` onto the language's original catalog.
/// Keys the base catalog lacks are kept as they were; keys in the table
/// take the table's value, or are removed when the cell is empty.
fn overlay(original: Option<&Catalog>, table: &ConsolidatedTable, lang: Lang) -> Catalog {
    let mut catalog = original.cloned().unwrap_or_default();
    for (key, row) in table.rows() {
        match row.get(&lang) {
            Some(value) => {
                catalog.insert(key, value.as_str());
            }
            None => {
                catalog.remove(key);
            }
        }
    }
    catalog
}

/// Reviewed spreadsheet over the current table. Languages the spreadsheet
/// does not carry keep their current cells for the spreadsheet's keys.
fn merge_imported(current: &ConsolidatedTable, imported: &ConsolidatedTable) -> ConsolidatedTable {
    let mut merged = imported.clone();
    for lang in current.languages() {
        if imported.has_language(*lang) {
            continue;
        }
        merged.add_language(*lang);
        for key in imported.keys() {
            if let Some(value) = current.cell(key, *lang) {
                merged.set(key, *lang, value);
            }
        }
    }
    merged
}
