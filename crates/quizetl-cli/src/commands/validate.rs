//! The `quizetl validate` command.

use std::path::PathBuf;

use anyhow::Result;

use quizetl_core::config::load_config_from;
use quizetl_core::questions::{load_question_bank, validate_question_bank};

pub fn execute(config_path: Option<PathBuf>, questions: Option<PathBuf>) -> Result<()> {
    let questions = match questions {
        Some(path) => path,
        None => load_config_from(config_path.as_deref())?.questions,
    };

    let bank = load_question_bank(&questions)?;

    for block in bank.blocks() {
        println!("Block: {} ({} questions)", block.name, block.questions.len());
    }

    let warnings = validate_question_bank(&bank);
    for w in &warnings {
        let prefix = match &w.question_id {
            Some(id) => format!("  [{}/{id}]", w.block),
            None => format!("  [{}]", w.block),
        };
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Question bank valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
