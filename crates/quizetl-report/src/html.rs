//! HTML results dashboard.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use quizetl_core::model::CuratedTable;
use quizetl_core::statistics::{student_ranking, ResultsSummary, StudentScore};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate the results page for a curated table.
pub fn generate_html(table: &CuratedTable) -> String {
    let summary = ResultsSummary::from_table(table);
    let ranking = student_ranking(table);

    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>quizetl — Resultados (Base Tratada)</title>\n");
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    html.push_str("<header>\n");
    html.push_str("<h1>Resultados (Base Tratada)</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Gerado em {}</p>\n",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    if table.is_empty() {
        html.push_str("<p class=\"empty\">Ainda não existe Base Tratada. Rode o ETL primeiro.</p>\n");
        html.push_str("</body>\n</html>");
        return html;
    }

    // Summary cards
    html.push_str("<section class=\"cards\">\n");
    for (label, value) in [
        ("Respostas (consolidadas)", summary.respostas.to_string()),
        ("Alunos", summary.alunos.to_string()),
        ("Acertos", summary.acertos.to_string()),
        ("% Acerto", format!("{:.1}%", summary.percentual_acerto)),
    ] {
        html.push_str(&format!(
            "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
            label,
            html_escape(&value)
        ));
    }
    html.push_str("</section>\n");

    html.push_str("<section>\n<h2>Acertos por aluno</h2>\n");
    html.push_str(&generate_bar_chart(&ranking));
    html.push_str("</section>\n");

    // Ranking
    html.push_str("<section>\n<h2>Ranking de alunos</h2>\n");
    html.push_str("<table class=\"ranking\">\n");
    html.push_str("<thead><tr><th>#</th><th>Aluno</th><th>Acertos</th><th>Respondidas</th><th>% Acerto</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (i, s) in ranking.iter().enumerate() {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}%</td></tr>\n",
            i + 1,
            html_escape(&s.aluno),
            s.acertos,
            s.respondidas,
            s.percentual()
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    // Curated rows
    html.push_str("<section>\n<h2>Base Tratada</h2>\n");
    html.push_str("<table class=\"rows\" id=\"rows\">\n<thead><tr>");
    for (i, header) in [
        "Turma", "Aluno", "Bloco", "Questão", "Pergunta", "Resposta", "Gabarito", "Acertou",
        "Timestamp",
    ]
    .iter()
    .enumerate()
    {
        html.push_str(&format!("<th onclick=\"sortTable({i})\">{header}</th>"));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for r in table {
        let class = if r.is_correct() { "pass" } else { "fail" };
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            class,
            html_escape(&r.turma),
            html_escape(&r.aluno),
            html_escape(&r.bloco),
            html_escape(&r.question_id),
            html_escape(&r.pergunta),
            html_escape(&r.resposta_aluno),
            html_escape(&r.gabarito),
            r.acertou,
            html_escape(&r.timestamp),
        ));
    }
    html.push_str("</tbody></table>\n</section>\n");

    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write the HTML dashboard to a file.
pub fn write_html_report(table: &CuratedTable, path: &Path) -> Result<()> {
    let html = generate_html(table);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of correct answers per student, in ranking order.
fn generate_bar_chart(ranking: &[StudentScore]) -> String {
    let bar_height = 24;
    let max_width = 400;
    let padding = 8;
    let label_width = 200;

    let top = ranking.iter().map(|s| s.acertos).max().unwrap_or(0).max(1);
    let total_height = ranking.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, s) in ranking.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (s.acertos.max(0) as f64 / top as f64 * max_width as f64) as usize;

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(&s.aluno)
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"#3b82f6\" rx=\"4\"/>\n",
            label_width, y, width, bar_height
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{}</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            s.acertos
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --card: #f2f4f7; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --card: #1f2937; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .empty { color: #6b7280; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem 1.5rem; min-width: 10rem; }
.card .label { font-size: 0.85rem; color: #6b7280; }
.card .value { font-size: 1.8rem; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('rows');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb) : vb.localeCompare(va);
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use quizetl_core::model::AnswerRecord;

    fn make_table() -> CuratedTable {
        let row = |aluno: &str, qid: &str, acertou: i64| AnswerRecord {
            timestamp: "2026-02-12T13:00:00Z".into(),
            turma: "Turma A".into(),
            aluno: aluno.into(),
            bloco: "Bloco 1".into(),
            question_id: qid.into(),
            pergunta: "O que é <ETL>?".into(),
            tipo: "multipla".into(),
            resposta_aluno: "A".into(),
            gabarito: "A".into(),
            acertou,
        };
        CuratedTable::new(vec![row("Ana", "q1", 1), row("Ana", "q2", 1), row("Bruno & Cia", "q1", 0)])
    }

    #[test]
    fn html_contains_summary_ranking_and_rows() {
        let html = generate_html(&make_table());

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Ranking de alunos"));
        assert!(html.contains("66.7%"));
        assert!(html.contains("<svg"));
        assert!(html.contains("Bruno &amp; Cia"));
        assert!(html.contains("O que é &lt;ETL&gt;?"));
        assert!(!html.contains("<ETL>"));
    }

    #[test]
    fn html_for_empty_table() {
        let html = generate_html(&CuratedTable::default());
        assert!(html.contains("Ainda não existe Base Tratada"));
        assert!(!html.contains("<svg"));
    }

    #[test]
    fn html_report_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("resultados.html");

        write_html_report(&make_table(), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Ana"));
    }
}
