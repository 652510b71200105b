// SPDX-License-Identifier: PMPL-1.0-or-later

//! Languages handled by the catalogs.
//!
//! The set is closed: nine ISO 639-1 codes, each with the Spanish display
//! name used as the review spreadsheet's column header.

mod lang;

pub use lang::Lang;
