// SPDX-License-Identifier: PMPL-1.0-or-later

//! End-to-end runs of the check / fix / export / import pipeline over
//! temporary locale trees.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use termcheck::config::PipelineConfig;
use termcheck::i18n::Lang;
use termcheck::pipeline::{Pipeline, WriteOptions, CONSOLIDATED_FILE};
use termcheck::report::{self, ReportOutputFormat};
use termcheck::store::{self, CatalogStore};
use termcheck::types::IssueKind;

const GLOSSARY: &str = r#"{
  "cliente": {
    "category": "Clients",
    "context": "Person or business that books the service",
    "translations": {"es": "cliente", "en": "client"},
    "notes": ""
  }
}"#;

fn write_catalog(root: &Path, code: &str, body: &str) {
    let dir = root.join("locales").join(code);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("translation.json"), body).unwrap();
}

fn read_catalog(root: &Path, code: &str) -> serde_json::Value {
    let text = fs::read_to_string(root.join("locales").join(code).join("translation.json")).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn setup(dir: &Path) -> PipelineConfig {
    write_catalog(
        dir,
        "es",
        r#"{"clients": {"list": {"title": "Clientes"}, "detail": {"title": "Cliente"}},
            "settings": {"save": "Guardar"}}"#,
    );
    write_catalog(
        dir,
        "en",
        r#"{"clients": {"list": {"title": "customers"}, "detail": {"title": "client"}}}"#,
    );
    fs::write(dir.join("glossary.json"), GLOSSARY).unwrap();
    PipelineConfig {
        locales_root: dir.join("locales"),
        glossary_path: dir.join("glossary.json"),
        output_path: dir.join("reports"),
        languages: vec![Lang::Es, Lang::En],
        ..PipelineConfig::default()
    }
}

fn write_options() -> WriteOptions {
    WriteOptions {
        dry_run: false,
        formats: vec![ReportOutputFormat::Markdown],
    }
}

#[test]
fn test_check_reports_client_inconsistency() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(setup(dir.path())).unwrap();

    let run = pipeline.check().unwrap();
    let terms: Vec<_> = run
        .issues
        .iter()
        .filter(|issue| issue.kind == IssueKind::TermInconsistency)
        .collect();
    assert_eq!(terms.len(), 1);
    assert_eq!(terms[0].key, "clients.list.title");
    assert_eq!(terms[0].language, Lang::En);
    assert_eq!(terms[0].observed.as_deref(), Some("customers"));
    assert_eq!(terms[0].suggested.as_deref(), Some("client"));

    assert_eq!(run.issue_counts.missing, 1);
    assert_eq!(run.inconsistent_forms.len(), 1);
    assert_eq!(run.inconsistent_forms[0].term, "cliente");

    // check never writes
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_fix_rewrites_catalogs_and_logs_changes() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    let sentinel = config.markers.missing.clone();
    let pipeline = Pipeline::new(config).unwrap();

    let outcome = pipeline.fix(&write_options()).unwrap();
    let changes = &outcome.report.changes;
    let client_rows: Vec<_> = changes
        .iter()
        .filter(|c| c.key == "clients.list.title" && c.language == Lang::En)
        .collect();
    assert_eq!(client_rows.len(), 1);
    assert_eq!(client_rows[0].before.as_deref(), Some("customers"));
    assert_eq!(client_rows[0].after.as_deref(), Some("client"));

    let missing_row = changes
        .iter()
        .find(|c| c.key == "settings.save" && c.language == Lang::En)
        .expect("missing cell should appear in the change log");
    assert_eq!(missing_row.before, None);
    assert_eq!(missing_row.after.as_deref(), Some(sentinel.as_str()));

    let en = read_catalog(dir.path(), "en");
    assert_eq!(en["clients"]["list"]["title"], "client");
    assert_eq!(en["clients"]["detail"]["title"], "client");
    assert_eq!(en["settings"]["save"], sentinel.as_str());

    // base catalog is unchanged and not rewritten
    let es_fingerprint = outcome
        .report
        .fingerprints
        .iter()
        .find(|f| f.language == Lang::Es)
        .unwrap();
    assert!(!es_fingerprint.changed());
    let en_fingerprint = outcome
        .report
        .fingerprints
        .iter()
        .find(|f| f.language == Lang::En)
        .unwrap();
    assert!(en_fingerprint.changed());

    let csv = dir.path().join("reports").join(CONSOLIDATED_FILE);
    assert!(outcome.written.contains(&csv));
    let table = store::load_consolidated_file(&csv, Lang::Es).unwrap();
    assert_eq!(table, outcome.table);

    let markdown: Vec<_> = outcome
        .written
        .iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("md"))
        .collect();
    assert_eq!(markdown.len(), 1);
    let log = fs::read_to_string(markdown[0]).unwrap();
    assert!(log.contains("## Change log"));
    assert!(log.contains("`clients.list.title`"));
}

#[test]
fn test_fix_twice_changes_nothing_more() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(setup(dir.path())).unwrap();

    pipeline.fix(&write_options()).unwrap();
    let second = pipeline.fix(&write_options()).unwrap();
    assert_eq!(second.report.issue_counts.total(), 0);
    assert!(second.report.changes.is_empty());
    assert!(second.report.fingerprints.iter().all(|f| !f.changed()));
}

#[test]
fn test_fix_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(setup(dir.path())).unwrap();
    let before = fs::read(dir.path().join("locales/en/translation.json")).unwrap();

    let outcome = pipeline
        .fix(&WriteOptions {
            dry_run: true,
            formats: vec![ReportOutputFormat::Json],
        })
        .unwrap();
    assert_eq!(outcome.report.changes.len(), 2);
    assert!(outcome.written.is_empty());
    assert_eq!(
        fs::read(dir.path().join("locales/en/translation.json")).unwrap(),
        before
    );
    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_unreadable_language_is_skipped_and_left_alone() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    write_catalog(dir.path(), "de", "{ not json");
    config.languages.push(Lang::De);
    let pipeline = Pipeline::new(config).unwrap();

    let outcome = pipeline.fix(&write_options()).unwrap();
    assert_eq!(outcome.report.load_failures.len(), 1);
    assert_eq!(outcome.report.load_failures[0].language, Lang::De);
    assert!(!outcome.report.load_failures[0].missing);
    assert!(!outcome.table.has_language(Lang::De));
    assert_eq!(
        fs::read_to_string(dir.path().join("locales/de/translation.json")).unwrap(),
        "{ not json"
    );
}

#[test]
fn test_missing_language_can_be_created() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.languages.push(Lang::Fr);
    config.create_missing_languages = true;
    let sentinel = config.markers.missing.clone();
    let pipeline = Pipeline::new(config).unwrap();

    let outcome = pipeline.fix(&write_options()).unwrap();
    assert!(outcome.report.load_failures.is_empty());
    let fr = read_catalog(dir.path(), "fr");
    assert_eq!(fr["settings"]["save"], sentinel.as_str());
    assert_eq!(fr["clients"]["list"]["title"], sentinel.as_str());
}

#[test]
fn test_missing_language_is_reported_by_default() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.languages.push(Lang::Sv);
    let pipeline = Pipeline::new(config).unwrap();

    let run = pipeline.check().unwrap();
    assert_eq!(run.load_failures.len(), 1);
    assert!(run.load_failures[0].missing);
    assert!(!run.languages.contains(&Lang::Sv));
}

#[test]
fn test_export_then_import_reviewed_spreadsheet() {
    let dir = TempDir::new().unwrap();
    let config = setup(dir.path());
    write_catalog(
        dir.path(),
        "en",
        r#"{"clients": {"list": {"title": "customers"}, "detail": {"title": "client"}},
            "legacy": {"banner": "Old banner"}}"#,
    );
    let pipeline = Pipeline::new(config).unwrap();

    let exported = pipeline.export(None).unwrap();
    assert_eq!(exported, dir.path().join("reports").join(CONSOLIDATED_FILE));
    let text = fs::read_to_string(&exported).unwrap();
    assert!(text.starts_with("Clave,Inglés,Español"));

    let reviewed = dir.path().join("reviewed.csv");
    fs::write(&reviewed, text.replace("customers", "Client list")).unwrap();

    let preview = pipeline
        .import(&reviewed, &WriteOptions { dry_run: true, formats: Vec::new() })
        .unwrap();
    assert_eq!(preview.report.changes.len(), 1);
    assert_eq!(read_catalog(dir.path(), "en")["clients"]["list"]["title"], "customers");

    let applied = pipeline
        .import(&reviewed, &WriteOptions::default())
        .unwrap();
    assert_eq!(applied.report.changes.len(), 1);
    let en = read_catalog(dir.path(), "en");
    assert_eq!(en["clients"]["list"]["title"], "Client list");
    // keys the base catalog lacks survive a rewrite
    assert_eq!(en["legacy"]["banner"], "Old banner");
}

#[test]
fn test_diff_of_exported_spreadsheets() {
    let dir = TempDir::new().unwrap();
    let pipeline = Pipeline::new(setup(dir.path())).unwrap();
    let before = pipeline
        .export(Some(dir.path().join("before.csv").as_path())).unwrap();
    let outcome = pipeline.fix(&write_options()).unwrap();
    let after = dir.path().join("reports").join(CONSOLIDATED_FILE);

    let before_table = report::diff::load_table(&before, Lang::Es).unwrap();
    let after_table = report::diff::load_table(&after, Lang::Es).unwrap();
    let changes: Vec<_> = report::diff(&before_table, &after_table).collect();
    assert_eq!(changes, outcome.report.changes);
}

#[test]
fn test_missing_glossary_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut config = setup(dir.path());
    config.glossary_path = dir.path().join("nope.json");
    let err = Pipeline::new(config).err().expect("glossary should be required");
    assert!(format!("{:#}", err).contains("nope.json"));
}

#[test]
fn test_store_round_trip_keeps_nesting() {
    let dir = TempDir::new().unwrap();
    setup(dir.path());
    let store = CatalogStore::new(dir.path().join("locales"), "translation.json");
    let catalog = store.load(Lang::Es).unwrap();
    store.save(Lang::Es, &catalog).unwrap();
    let es = read_catalog(dir.path(), "es");
    assert_eq!(es["clients"]["detail"]["title"], "Cliente");
    assert_eq!(es["settings"]["save"], "Guardar");
}
