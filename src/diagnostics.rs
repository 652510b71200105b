// SPDX-License-Identifier: PMPL-1.0-or-later

//! `termcheck doctor`: checks that the configured locale tree, glossary and
//! output directory are usable before a real run.

use crate::config::PipelineConfig;
use crate::glossary::Glossary;
use crate::store::{CatalogStore, StoreError};
use anyhow::{anyhow, Result};
use colored::*;
use std::path::Path;

pub fn run_self_diagnostics(config: &PipelineConfig, config_source: Option<&Path>) -> Result<()> {
    println!("termcheck self-diagnostics");

    let mut checks = vec![
        Diagnostic::ok("version", format!("termcheck {}", env!("CARGO_PKG_VERSION"))),
        Diagnostic::ok(
            "configuration",
            match config_source {
                Some(path) => format!("loaded from {}", path.display()),
                None => "built-in defaults".to_string(),
            },
        ),
    ];
    checks.extend(diagnose(config));

    println!();
    for entry in &checks {
        entry.print();
    }

    if checks.iter().any(|entry| entry.level == Level::Error) {
        Err(anyhow!("self-diagnostics reported issues"))
    } else {
        Ok(())
    }
}

fn diagnose(config: &PipelineConfig) -> Vec<Diagnostic> {
    let mut checks = Vec::new();
    checks.push(check_directory(
        "locales root",
        &config.locales_root,
        Level::Error,
    ));

    let store = CatalogStore::new(&config.locales_root, config.catalog_file_name.clone());
    for lang in config.language_set() {
        let label = format!("catalog {}", lang);
        let missing_level = if lang == config.base_language {
            Level::Error
        } else if config.create_missing_languages {
            Level::Ok
        } else {
            Level::Warn
        };
        checks.push(match store.load(lang) {
            Ok(catalog) => Diagnostic::ok(
                label,
                format!("{} ({} keys)", lang.english_name(), catalog.len()),
            ),
            Err(StoreError::NotFound(path)) => Diagnostic::new(
                label,
                missing_level,
                format!("{} missing", path.display()),
            ),
            Err(err) => {
                let level = if lang == config.base_language {
                    Level::Error
                } else {
                    Level::Warn
                };
                Diagnostic::new(label, level, err.to_string())
            }
        });
    }

    let configured = config.language_set();
    let unconfigured: Vec<&str> = store
        .discover()
        .into_iter()
        .filter(|lang| !configured.contains(lang))
        .map(|lang| lang.code())
        .collect();
    if !unconfigured.is_empty() {
        checks.push(Diagnostic::warning(
            "unconfigured catalogs",
            format!("{} present but not in `languages`", unconfigured.join(", ")),
        ));
    }

    checks.push(check_glossary(config));
    checks.push(check_directory(
        "output directory",
        &config.output_path,
        Level::Warn,
    ));
    checks
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Warn,
    Error,
}

struct Diagnostic {
    label: String,
    level: Level,
    detail: String,
}

impl Diagnostic {
    fn new(label: impl Into<String>, level: Level, detail: String) -> Self {
        Self {
            label: label.into(),
            level,
            detail,
        }
    }

    fn ok(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Ok, detail)
    }

    fn warning(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Warn, detail)
    }

    fn error(label: impl Into<String>, detail: String) -> Self {
        Self::new(label, Level::Error, detail)
    }

    fn print(&self) {
        println!("  [{}] {:22} {}", self.level.tag(), self.label, self.detail);
    }
}

impl Level {
    fn tag(&self) -> ColoredString {
        match self {
            Level::Ok => "OK".green(),
            Level::Warn => "WARN".yellow(),
            Level::Error => "ERR".red(),
        }
    }
}

fn check_directory(label: &'static str, path: &Path, missing_level: Level) -> Diagnostic {
    if path.is_dir() {
        Diagnostic::ok(label, format!("{} exists", path.display()))
    } else if path.exists() {
        Diagnostic::error(
            label,
            format!("{} exists but is not a directory", path.display()),
        )
    } else if missing_level == Level::Error {
        Diagnostic::error(label, format!("{} missing", path.display()))
    } else {
        Diagnostic::warning(
            label,
            format!("{} missing (created on first write)", path.display()),
        )
    }
}

fn check_glossary(config: &PipelineConfig) -> Diagnostic {
    let path = &config.glossary_path;
    let glossary = match Glossary::load(path) {
        Ok(glossary) => glossary,
        Err(err) => {
            return Diagnostic::error(
                "glossary",
                format!("{} (create one with `termcheck glossary init`)", err),
            )
        }
    };

    let languages = config.language_set();
    let incomplete: Vec<String> = glossary
        .terms()
        .filter_map(|term| {
            let missing: Vec<&str> = languages
                .iter()
                .filter(|lang| term.standard_form(**lang).is_none())
                .map(|lang| lang.code())
                .collect();
            if missing.is_empty() {
                None
            } else {
                Some(format!("{} [{}]", term.id, missing.join(",")))
            }
        })
        .collect();

    if incomplete.is_empty() {
        Diagnostic::ok(
            "glossary",
            format!("{} terms, full coverage", glossary.len()),
        )
    } else {
        Diagnostic::warning(
            "glossary",
            format!(
                "{} terms, {} incomplete: {}",
                glossary.len(),
                incomplete.len(),
                incomplete.join("; ")
            ),
        )
    }
}
