// SPDX-License-Identifier: PMPL-1.0-or-later

//! termcheck: terminology consistency for translation catalogs.
//!
//! Loads one nested JSON catalog per language, lines them up in a
//! consolidated table keyed by translation key, and checks every cell
//! against a master glossary of canonical terms.
//!
//! PIPELINE STAGES:
//! 1. **Store**: reads and atomically writes catalogs and the consolidated
//!    review spreadsheet.
//! 2. **Checker**: reports inconsistent terminology, missing translations,
//!    broken interpolation placeholders and suspicious lengths.
//! 3. **Corrector**: applies glossary standard forms and tags everything
//!    else for human review.
//! 4. **Report**: diffs the table before and after correction and renders
//!    the change log.

pub mod catalog;
pub mod checker;
pub mod config;
pub mod corrector;
pub mod diagnostics;
pub mod glossary;
pub mod i18n;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod store;
pub mod table;
pub mod types;
