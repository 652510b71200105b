// SPDX-License-Identifier: PMPL-1.0-or-later

//! termcheck: terminology consistency checker and corrector for translation
//! catalogs
//!
//! Checks every language's catalog against a master glossary, fixes
//! non-standard terminology, and tags what needs a human reviewer.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use termcheck::config::{PipelineConfig, DEFAULT_CONFIG_FILE};
use termcheck::glossary::{self, Glossary};
use termcheck::i18n::Lang;
use termcheck::pipeline::{Pipeline, WriteOptions};
use termcheck::report::{self, output, ReportFormatter, ReportOutputFormat};
use termcheck::{diagnostics, logging};

#[derive(Parser)]
#[command(name = "termcheck")]
#[command(version)]
#[command(about = "Terminology consistency checker for translation catalogs")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (YAML or JSON); defaults to ./termcheck.yaml when present
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding one sub-directory per language
    #[arg(long, global = true, value_name = "DIR")]
    locales_root: Option<PathBuf>,

    /// Master glossary file
    #[arg(long, global = true, value_name = "FILE")]
    glossary: Option<PathBuf>,

    /// Output directory for reports and the consolidated spreadsheet
    #[arg(long, global = true, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Base (source) language code
    #[arg(long, global = true, value_name = "LANG")]
    base_language: Option<Lang>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check catalogs against the glossary without changing them
    Check {
        /// Print the report in this format instead of the console summary
        #[arg(short, long, value_enum)]
        format: Option<ReportOutputFormat>,

        /// Write the report to a file (format from --format or the extension)
        #[arg(short, long, value_name = "FILE")]
        report: Option<PathBuf>,

        /// Exit with an error when any issue is found
        #[arg(long)]
        fail_on_issues: bool,
    },

    /// Check, correct and save catalogs, then write the change log
    Fix {
        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Run report formats to write to the output directory
        #[arg(short, long, value_enum, value_delimiter = ',', default_value = "markdown")]
        format: Vec<ReportOutputFormat>,
    },

    /// Write the consolidated review spreadsheet (CSV)
    Export {
        /// Destination file (default: <output>/consolidated.csv)
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Apply a reviewed consolidated spreadsheet to the catalogs
    Import {
        /// Reviewed CSV file
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Show what would change without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the cells that differ between two consolidated spreadsheets
    Diff {
        #[arg(value_name = "BEFORE")]
        before: PathBuf,

        #[arg(value_name = "AFTER")]
        after: PathBuf,

        /// Print a Markdown change log instead of the console table
        #[arg(long)]
        markdown: bool,
    },

    /// Inspect or create the master glossary
    Glossary {
        #[command(subcommand)]
        action: GlossaryCommand,
    },

    /// Self-diagnostics for the configured locale tree and glossary
    Doctor,
}

#[derive(Subcommand)]
enum GlossaryCommand {
    /// Render the glossary as Markdown
    Show,

    /// Write the built-in master glossary to PATH
    Init {
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Report terms lacking a standard form for a configured language
    Validate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.quiet)?;

    let config_source = cli.config.clone().or_else(|| {
        let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
        default_path.is_file().then_some(default_path)
    });
    let config = resolve_config(&cli)?;

    match cli.command {
        Commands::Check {
            format,
            report: report_path,
            fail_on_issues,
        } => {
            let pipeline = Pipeline::new(config)?;
            let run = pipeline.check()?;

            match (format, &report_path) {
                (Some(format), None) => println!("{}", format.serialize(&run)?),
                _ => report::print_report(&run),
            }
            if let Some(path) = &report_path {
                let format = format
                    .or_else(|| {
                        path.extension()
                            .and_then(|ext| ext.to_str())
                            .and_then(ReportOutputFormat::parse)
                    })
                    .unwrap_or(ReportOutputFormat::Json);
                report::save_report(&run, path, format)?;
                println!("Report saved to: {}", path.display());
            }

            let total = run.issue_counts.total();
            if fail_on_issues && total > 0 {
                bail!("{} issue(s) found", total);
            }
        }

        Commands::Fix { dry_run, format } => {
            let pipeline = Pipeline::new(config)?;
            let outcome = pipeline.fix(&WriteOptions {
                dry_run,
                formats: format,
            })?;
            report::print_report(&outcome.report);
            if dry_run {
                println!("{}", "Dry run: no files written".yellow());
            }
            for path in &outcome.written {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Export { path } => {
            let pipeline = Pipeline::new(config)?;
            let written = pipeline.export(path.as_deref())?;
            println!("Consolidated table saved to: {}", written.display());
        }

        Commands::Import { path, dry_run } => {
            let pipeline = Pipeline::new(config)?;
            let outcome = pipeline.import(
                &path,
                &WriteOptions {
                    dry_run,
                    formats: Vec::new(),
                },
            )?;
            ReportFormatter::new().print_changes(&outcome.report.changes);
            if dry_run {
                println!("{}", "Dry run: no files written".yellow());
            }
            for path in &outcome.written {
                println!("Wrote {}", path.display());
            }
        }

        Commands::Diff {
            before,
            after,
            markdown,
        } => {
            let base = config.base_language;
            let before_table = report::diff::load_table(&before, base)?;
            let after_table = report::diff::load_table(&after, base)?;
            let changes: Vec<_> = report::diff(&before_table, &after_table).collect();
            if markdown {
                println!("{}", output::format_changes_as_markdown(&changes));
            } else {
                println!("Before: {}", before.display());
                println!("After:  {}", after.display());
                ReportFormatter::new().print_changes(&changes);
            }
        }

        Commands::Glossary { action } => run_glossary(action, &config)?,

        Commands::Doctor => diagnostics::run_self_diagnostics(&config, config_source.as_deref())?,
    }

    Ok(())
}

/// Configuration file (or defaults) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(root) = &cli.locales_root {
        config.locales_root = root.clone();
    }
    if let Some(path) = &cli.glossary {
        config.glossary_path = path.clone();
    }
    if let Some(path) = &cli.output {
        config.output_path = path.clone();
    }
    if let Some(lang) = cli.base_language {
        config.base_language = lang;
        if !config.languages.contains(&lang) {
            config.languages.push(lang);
        }
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn run_glossary(action: GlossaryCommand, config: &PipelineConfig) -> Result<()> {
    match action {
        GlossaryCommand::Show => {
            let glossary = load_glossary(&config.glossary_path)?;
            println!("{}", glossary::render_markdown(&glossary));
        }

        GlossaryCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let seed = Glossary::seed().context("parsing built-in glossary")?;
            seed.save(&path)?;
            println!("Wrote {} terms to {}", seed.len(), path.display());
        }

        GlossaryCommand::Validate => {
            let glossary = load_glossary(&config.glossary_path)?;
            let languages = config.language_set();
            let mut incomplete = 0;
            for term in glossary.terms() {
                let missing = glossary.missing_languages(&term.id, &languages)?;
                if missing.is_empty() {
                    continue;
                }
                incomplete += 1;
                let codes: Vec<&str> = missing.iter().map(|lang| lang.code()).collect();
                println!(
                    "  {} {} missing: {}",
                    "[WARN]".yellow(),
                    term.id.bold(),
                    codes.join(", ")
                );
            }
            if incomplete == 0 {
                println!(
                    "{} {} terms cover every configured language",
                    "[OK]".green(),
                    glossary.len()
                );
            } else {
                println!("{} of {} terms incomplete", incomplete, glossary.len());
            }
        }
    }
    Ok(())
}

fn load_glossary(path: &Path) -> Result<Glossary> {
    Glossary::load(path).with_context(|| format!("loading glossary {}", path.display()))
}
