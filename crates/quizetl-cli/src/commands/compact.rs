//! The `quizetl compact` command.

use std::path::PathBuf;

use anyhow::Result;

use quizetl_core::config::load_config_from;
use quizetl_core::store::compact_raw;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let rows = compact_raw(&config.raw_csv)?;
    println!("Compacted {}: {rows} row(s)", config.raw_csv.display());

    Ok(())
}
