// SPDX-License-Identifier: PMPL-1.0-or-later

//! Consistency checker
//!
//! Cross-references the consolidated table against the glossary and turns
//! every data problem into an [`Issue`]. Nothing here fails on bad data;
//! the only error is an invalid matching pattern built from configuration.

pub mod rules;

use crate::config::{CheckerSettings, ReviewMarkers};
use crate::glossary::Glossary;
use crate::i18n::Lang;
use crate::table::{ConsolidatedTable, Row};
use crate::types::{Issue, IssueCounts, IssueKind};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

pub use rules::{length_ratio, word_pattern, PlaceholderScanner, TermMatcher};

/// Distinct surface forms observed for one term in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermForms {
    pub term: String,
    pub language: Lang,
    pub standard: String,
    pub forms: Vec<String>,
}

impl TermForms {
    pub fn is_inconsistent(&self) -> bool {
        self.forms.len() > 1
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub issues: Vec<Issue>,
    pub term_forms: Vec<TermForms>,
}

impl CheckReport {
    pub fn counts(&self) -> IssueCounts {
        IssueCounts::tally(&self.issues)
    }

    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }
}

pub struct Checker<'a> {
    matchers: Vec<TermMatcher<'a>>,
    placeholders: PlaceholderScanner,
    settings: &'a CheckerSettings,
    markers: &'a ReviewMarkers,
}

impl<'a> Checker<'a> {
    pub fn new(
        glossary: &'a Glossary,
        settings: &'a CheckerSettings,
        markers: &'a ReviewMarkers,
    ) -> Result<Self, regex::Error> {
        let matchers = glossary
            .terms()
            .map(|term| TermMatcher::new(term, &settings.plural_suffixes))
            .collect::<Result<Vec<_>, _>>()?;
        let placeholders = PlaceholderScanner::new(&settings.placeholder_delimiters)?;
        Ok(Self {
            matchers,
            placeholders,
            settings,
            markers,
        })
    }

    /// Run every scan over the table. Issues come back ordered by key,
    /// language column and kind.
    pub fn check(&self, table: &ConsolidatedTable) -> CheckReport {
        let mut issues = Vec::new();
        let term_forms = self.scan_terms(table, &mut issues);
        self.scan_cells(table, &mut issues);

        issues.sort_by(|a, b| {
            (a.key.as_str(), a.language, a.kind).cmp(&(b.key.as_str(), b.language, b.kind))
        });
        debug!(issues = issues.len(), "consistency check finished");

        CheckReport { issues, term_forms }
    }

    fn scan_terms(&self, table: &ConsolidatedTable, issues: &mut Vec<Issue>) -> Vec<TermForms> {
        let base = table.base();
        let scopes: Vec<Vec<(&str, &Row)>> = self
            .matchers
            .iter()
            .map(|matcher| {
                table
                    .rows()
                    .filter(|(key, row)| {
                        let base_value =
                            row.get(&base).map(|value| self.markers.strip_tags(value));
                        matcher.in_scope(key, base, base_value)
                    })
                    .collect()
            })
            .collect();

        // Each cell belongs to the first in-scope term, in identifier order,
        // that has a standard form for its language. Only the owner flags it.
        let mut owners: HashMap<(&str, Lang), usize> = HashMap::new();
        for (index, (matcher, scoped)) in self.matchers.iter().zip(&scopes).enumerate() {
            for (key, _) in scoped {
                for lang in table.languages() {
                    if matcher.standard_form(*lang).is_some() {
                        owners.entry((*key, *lang)).or_insert(index);
                    }
                }
            }
        }

        let mut term_forms = Vec::new();
        for (index, (matcher, scoped)) in self.matchers.iter().zip(&scopes).enumerate() {
            if scoped.is_empty() {
                continue;
            }
            let term = matcher.term();
            debug!(term = %term.id, entries = scoped.len(), "term in scope");

            for lang in table.languages().iter().copied() {
                let Some(standard) = matcher.standard_form(lang) else {
                    continue;
                };
                let mut forms: BTreeSet<&str> = BTreeSet::new();
                let mut members = Vec::new();
                for (key, row) in scoped {
                    let Some(value) = row.get(&lang) else {
                        continue;
                    };
                    if value.trim().is_empty() || self.markers.is_marked(value) {
                        continue;
                    }
                    forms.insert(value.as_str());
                    members.push((*key, value.as_str()));
                }
                if forms.is_empty() {
                    continue;
                }

                let surface = TermForms {
                    term: term.id.clone(),
                    language: lang,
                    standard: standard.to_string(),
                    forms: forms.iter().map(|form| form.to_string()).collect(),
                };

                if surface.is_inconsistent() {
                    for (key, value) in members {
                        if owners.get(&(key, lang)) != Some(&index) {
                            continue;
                        }
                        if matcher.conforms(lang, value).unwrap_or(true) {
                            continue;
                        }
                        issues.push(
                            Issue::new(key, lang, IssueKind::TermInconsistency, Some(value))
                                .with_suggestion(standard)
                                .with_term(term.id.clone())
                                .with_detail(format!(
                                    "{} surface forms for '{}'",
                                    surface.forms.len(),
                                    term.id
                                )),
                        );
                    }
                }
                term_forms.push(surface);
            }
        }

        term_forms
    }

    fn scan_cells(&self, table: &ConsolidatedTable, issues: &mut Vec<Issue>) {
        let base = table.base();
        for (key, row) in table.rows() {
            let base_value = row.get(&base).map(String::as_str);

            if let Some(value) = base_value.filter(|value| !self.markers.is_marked(value)) {
                if let Some(token) = self.placeholders.unresolved_token(value) {
                    issues.push(
                        Issue::new(key, base, IssueKind::UnresolvedPlaceholder, Some(value))
                            .with_detail(format!("nested marker in token '{}'", token)),
                    );
                }
            }
            // Targets are compared with the base text, not with its review tags.
            let base_value = base_value.map(|value| self.markers.strip_tags(value));

            for lang in table.targets() {
                let value = match row.get(&lang) {
                    Some(value) if !value.trim().is_empty() => value.as_str(),
                    other => {
                        issues.push(Issue::new(
                            key,
                            lang,
                            IssueKind::MissingTranslation,
                            other.map(String::as_str),
                        ));
                        continue;
                    }
                };
                if self.markers.is_marked(value) {
                    continue;
                }
                if let Some(issue) = self.check_placeholders(key, lang, value, base_value) {
                    issues.push(issue);
                }
                if let Some(issue) = self.check_length(key, lang, value, base_value) {
                    issues.push(issue);
                }
            }
        }
    }

    fn check_placeholders(
        &self,
        key: &str,
        lang: Lang,
        value: &str,
        base_value: Option<&str>,
    ) -> Option<Issue> {
        if let Some(token) = self.placeholders.unresolved_token(value) {
            return Some(
                Issue::new(key, lang, IssueKind::UnresolvedPlaceholder, Some(value))
                    .with_detail(format!("nested marker in token '{}'", token)),
            );
        }
        if !self.settings.compare_placeholders_with_base {
            return None;
        }
        let base_value = base_value?;
        let expected = self.placeholders.names(base_value);
        let found = self.placeholders.names(value);
        if expected == found {
            return None;
        }
        Some(
            Issue::new(key, lang, IssueKind::UnresolvedPlaceholder, Some(value)).with_detail(
                format!(
                    "placeholders [{}] differ from base [{}]",
                    join_names(&found),
                    join_names(&expected)
                ),
            ),
        )
    }

    fn check_length(
        &self,
        key: &str,
        lang: Lang,
        value: &str,
        base_value: Option<&str>,
    ) -> Option<Issue> {
        let ratio = length_ratio(base_value?, value)?;
        if ratio > self.settings.max_length_ratio || ratio < self.settings.min_length_ratio {
            Some(
                Issue::new(key, lang, IssueKind::SuspiciousLength, Some(value))
                    .with_detail(format!("length ratio {:.2}", ratio)),
            )
        } else {
            None
        }
    }
}

fn join_names(names: &BTreeSet<String>) -> String {
    names.iter().cloned().collect::<Vec<_>>().join(", ")
}

/// Convenience wrapper: build a [`Checker`] and run it once.
pub fn check(
    table: &ConsolidatedTable,
    glossary: &Glossary,
    settings: &CheckerSettings,
    markers: &ReviewMarkers,
) -> Result<CheckReport, regex::Error> {
    Ok(Checker::new(glossary, settings, markers)?.check(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn glossary(doc: &str) -> Glossary {
        Glossary::from_json(doc, Path::new("test.json")).unwrap()
    }

    fn invoice_glossary() -> Glossary {
        glossary(
            r#"{"invoice": {"category": "Billing", "translations": {"es": "factura", "en": "invoice"}}}"#,
        )
    }

    fn table(rows: &[(&str, &[(Lang, &str)])]) -> ConsolidatedTable {
        let mut table = ConsolidatedTable::new(Lang::Es, &[Lang::En]);
        for (key, cells) in rows {
            let row = table.insert_row(*key);
            for (lang, value) in *cells {
                row.insert(*lang, value.to_string());
            }
        }
        table
    }

    fn run(table: &ConsolidatedTable, glossary: &Glossary) -> CheckReport {
        check(
            table,
            glossary,
            &CheckerSettings::default(),
            &ReviewMarkers::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_flags_only_the_non_standard_surface_form() {
        let table = table(&[
            ("billing.title", &[(Lang::Es, "factura"), (Lang::En, "bill")]),
            ("invoice.title", &[(Lang::Es, "factura"), (Lang::En, "invoice")]),
        ]);
        let report = run(&table, &invoice_glossary());

        let terms: Vec<_> = report.of_kind(IssueKind::TermInconsistency).collect();
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].key, "billing.title");
        assert_eq!(terms[0].language, Lang::En);
        assert_eq!(terms[0].observed.as_deref(), Some("bill"));
        assert_eq!(terms[0].suggested.as_deref(), Some("invoice"));
        assert_eq!(terms[0].term.as_deref(), Some("invoice"));

        let en_forms = report
            .term_forms
            .iter()
            .find(|f| f.language == Lang::En)
            .unwrap();
        assert_eq!(en_forms.forms, vec!["bill".to_string(), "invoice".to_string()]);
    }

    #[test]
    fn test_single_surface_form_is_not_inconsistent() {
        let table = table(&[
            ("billing.title", &[(Lang::Es, "factura"), (Lang::En, "bill")]),
            ("invoice.title", &[(Lang::Es, "factura"), (Lang::En, "bill")]),
        ]);
        let report = run(&table, &invoice_glossary());
        assert_eq!(report.of_kind(IssueKind::TermInconsistency).count(), 0);
    }

    #[test]
    fn test_out_of_scope_entries_are_ignored() {
        let table = table(&[
            ("invoiceline.total", &[(Lang::Es, "Total de línea"), (Lang::En, "Line sum")]),
            ("invoice.total", &[(Lang::Es, "Total"), (Lang::En, "Invoice total")]),
        ]);
        let report = run(&table, &invoice_glossary());
        assert_eq!(report.of_kind(IssueKind::TermInconsistency).count(), 0);
        assert!(report
            .term_forms
            .iter()
            .all(|forms| forms.forms.iter().all(|f| f != "Line sum")));
    }

    #[test]
    fn test_missing_and_blank_cells_are_reported() {
        let mut table = table(&[
            ("a", &[(Lang::Es, "Guardar")]),
            ("b", &[(Lang::Es, "Cerrar"), (Lang::En, "   ")]),
        ]);
        table.add_language(Lang::Fr);
        let report = run(&table, &Glossary::default());
        let missing: Vec<_> = report
            .of_kind(IssueKind::MissingTranslation)
            .map(|i| (i.key.as_str(), i.language))
            .collect();
        assert_eq!(
            missing,
            vec![("a", Lang::En), ("a", Lang::Fr), ("b", Lang::En), ("b", Lang::Fr)]
        );
    }

    #[test]
    fn test_length_threshold_is_exclusive() {
        let base = "x".repeat(20);
        let long = "y".repeat(41);
        let boundary = "y".repeat(40);
        let half = "y".repeat(10);
        let short = "y".repeat(9);
        let table = table(&[
            ("long", &[(Lang::Es, base.as_str()), (Lang::En, long.as_str())]),
            ("boundary", &[(Lang::Es, base.as_str()), (Lang::En, boundary.as_str())]),
            ("half", &[(Lang::Es, base.as_str()), (Lang::En, half.as_str())]),
            ("short", &[(Lang::Es, base.as_str()), (Lang::En, short.as_str())]),
        ]);
        let report = run(&table, &Glossary::default());
        let flagged: Vec<_> = report
            .of_kind(IssueKind::SuspiciousLength)
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(flagged, vec!["long", "short"]);
    }

    #[test]
    fn test_length_thresholds_are_tunable() {
        let table = table(&[("k", &[(Lang::Es, "abcd"), (Lang::En, "abcdefghij")])]);
        let settings = CheckerSettings {
            max_length_ratio: 3.0,
            ..CheckerSettings::default()
        };
        let report = check(&table, &Glossary::default(), &settings, &ReviewMarkers::default()).unwrap();
        assert_eq!(report.of_kind(IssueKind::SuspiciousLength).count(), 0);
    }

    #[test]
    fn test_nested_and_renamed_placeholders_are_unresolved() {
        let table = table(&[
            ("greet", &[(Lang::Es, "Hola {{name}}"), (Lang::En, "Hi {{ {{name}} }}")]),
            ("remind", &[(Lang::Es, "Cita {{date}}"), (Lang::En, "Visit {{fecha}}")]),
            ("ok", &[(Lang::Es, "Pago {{amount}}"), (Lang::En, "Paid {{ amount }}")]),
        ]);
        let report = run(&table, &Glossary::default());
        let keys: Vec<_> = report
            .of_kind(IssueKind::UnresolvedPlaceholder)
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(keys, vec!["greet", "remind"]);
    }

    #[test]
    fn test_placeholder_name_comparison_can_be_disabled() {
        let table = table(&[("remind", &[(Lang::Es, "Cita {{date}}"), (Lang::En, "Visit {{fecha}}")])]);
        let settings = CheckerSettings {
            compare_placeholders_with_base: false,
            ..CheckerSettings::default()
        };
        let report = check(&table, &Glossary::default(), &settings, &ReviewMarkers::default()).unwrap();
        assert_eq!(report.of_kind(IssueKind::UnresolvedPlaceholder).count(), 0);
    }

    #[test]
    fn test_marked_cells_are_not_reflagged() {
        let markers = ReviewMarkers::default();
        let long_tagged = format!("{}{}", markers.length, "y".repeat(60));
        let table = table(&[
            ("a", &[(Lang::Es, "Guardar"), (Lang::En, markers.missing.as_str())]),
            ("b", &[(Lang::Es, "Cerrar"), (Lang::En, long_tagged.as_str())]),
        ]);
        let report = run(&table, &Glossary::default());
        assert!(report.issues.is_empty(), "unexpected issues: {:?}", report.issues);
    }

    #[test]
    fn test_issues_are_sorted() {
        let table = table(&[
            ("z", &[(Lang::Es, "Zeta")]),
            ("a", &[(Lang::Es, "Alfa")]),
        ]);
        let report = run(&table, &Glossary::default());
        let keys: Vec<_> = report.issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "z"]);
    }
}
