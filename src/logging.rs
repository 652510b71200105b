// SPDX-License-Identifier: PMPL-1.0-or-later

//! Diagnostic log output on stderr; human-facing summaries stay on stdout.

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

/// Log level for the given verbosity flags. `quiet` wins over `verbose`.
pub fn level(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

pub fn init(verbose: bool, quiet: bool) -> Result<()> {
    let _ = fmt()
        .with_max_level(level(verbose, quiet))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .try_init();
    Ok(())
}
