//! The `quizetl results` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use quizetl_core::config::load_config_from;
use quizetl_core::model::CuratedTable;
use quizetl_core::statistics::{student_ranking, ResultsSummary};
use quizetl_core::store::read_curated;
use quizetl_report::{generate_html, generate_markdown, write_html_report};

pub fn execute(config_path: Option<PathBuf>, format: String, output: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let table = read_curated(&config.curated_csv)?;

    if format == "html" {
        if let Some(path) = &output {
            write_html_report(&table, path)?;
            eprintln!("Results written to: {}", path.display());
            return Ok(());
        }
    }

    let rendered = match format.as_str() {
        "text" => render_text(&table),
        "json" => {
            let json = serde_json::json!({
                "summary": ResultsSummary::from_table(&table),
                "ranking": student_ranking(&table),
                "rows": table.rows,
            });
            serde_json::to_string_pretty(&json)?
        }
        "markdown" | "md" => generate_markdown(&table),
        "html" => generate_html(&table),
        other => anyhow::bail!("unknown format: {other} (expected text, json, markdown or html)"),
    };

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Results written to: {}", path.display());
        }
        None => println!("{rendered}"),
    }

    Ok(())
}

fn render_text(table: &CuratedTable) -> String {
    if table.is_empty() {
        return "No curated data yet. Run `quizetl etl` first.".to_string();
    }

    let summary = ResultsSummary::from_table(table);
    let mut out = format!(
        "Respostas (consolidadas): {}\nAlunos: {}\nAcertos: {}\n% Acerto: {:.1}%\n\n",
        summary.respostas, summary.alunos, summary.acertos, summary.percentual_acerto
    );

    let mut ranking = Table::new();
    ranking.set_header(vec!["#", "Aluno", "Acertos", "Respondidas", "% Acerto"]);
    for (i, s) in student_ranking(table).iter().enumerate() {
        ranking.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&s.aluno),
            Cell::new(s.acertos),
            Cell::new(s.respondidas),
            Cell::new(format!("{:.1}%", s.percentual())),
        ]);
    }

    out.push_str(&ranking.to_string());
    out
}
